// Arrow Schema Adapter
//
// Normalizes Arrow schemas into the kernel's column model. Arrow types
// without a Delta counterpart become `ColumnType::Unknown` carrying the
// Arrow type name, so the fallback stays observable.

use arrow_schema::{DataType, Field, Schema};

use crate::schema::{Column, ColumnType, TableSchema};

impl From<&DataType> for ColumnType {
    fn from(data_type: &DataType) -> Self {
        match data_type {
            DataType::Null => ColumnType::Null,
            DataType::Utf8 => ColumnType::String,
            DataType::Binary => ColumnType::Binary,
            DataType::Int8 => ColumnType::Int8,
            DataType::Int16 => ColumnType::Int16,
            DataType::Int32 => ColumnType::Int32,
            DataType::Int64 => ColumnType::Int64,
            DataType::Float32 => ColumnType::Float32,
            DataType::Float64 => ColumnType::Float64,
            DataType::Boolean => ColumnType::Bool,
            DataType::Date32 | DataType::Date64 => ColumnType::Date,
            DataType::Timestamp(_, _) => ColumnType::Timestamp,
            DataType::Decimal128(precision, scale) | DataType::Decimal256(precision, scale) => {
                ColumnType::Decimal {
                    precision: *precision,
                    scale: *scale,
                }
            }
            DataType::Struct(fields) => {
                ColumnType::Struct(fields.iter().map(|f| column(f)).collect())
            }
            DataType::List(element) => ColumnType::List(Box::new(element.data_type().into())),
            DataType::Map(entries, _) => map_entries(entries.data_type()),
            other => ColumnType::Unknown(other.to_string()),
        }
    }
}

// Arrow maps wrap a two-field struct of (key, value).
fn map_entries(entries: &DataType) -> ColumnType {
    match entries {
        DataType::Struct(fields) if fields.len() == 2 => ColumnType::Map {
            key: Box::new(fields[0].data_type().into()),
            value: Box::new(fields[1].data_type().into()),
        },
        other => ColumnType::Map {
            key: Box::new(ColumnType::Unknown(other.to_string())),
            value: Box::new(ColumnType::Unknown(other.to_string())),
        },
    }
}

fn column(field: &Field) -> Column {
    Column::new(field.name(), field.data_type().into(), field.is_nullable())
}

impl From<&Field> for Column {
    fn from(field: &Field) -> Self {
        column(field)
    }
}

impl From<&Schema> for TableSchema {
    fn from(schema: &Schema) -> Self {
        schema.fields().iter().map(|f| column(f)).collect()
    }
}
