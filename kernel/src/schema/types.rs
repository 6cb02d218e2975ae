// Column Types & Type Mapping
//
// Closed set of source column types and the total mapping from each
// type to the Delta Lake primitive type tag written into schema strings.

use serde::{Deserialize, Serialize};

use super::Column;

/// Delta type tag used for any type the mapper does not recognize.
pub const FALLBACK_TYPE_NAME: &str = "string";

/// Type of a source column.
///
/// Nested types carry their children so callers can inspect them, but the
/// Delta tag emitted for a nested column is only its outer kind
/// (`struct`, `array`, `map`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Null,
    String,
    Binary,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    Date,
    Timestamp,
    Decimal { precision: u8, scale: i8 },
    Struct(Vec<Column>),
    List(Box<ColumnType>),
    Map {
        key: Box<ColumnType>,
        value: Box<ColumnType>,
    },

    /// A type with no Delta mapping. Holds the original type name.
    ///
    /// NOTE:
    /// Unknown types are written as `"string"`. Use
    /// [`ColumnType::is_fallback`] to detect the downgrade.
    Unknown(String),
}

impl ColumnType {
    /// Delta Lake type tag for this column type.
    ///
    /// Total: unknown types map to [`FALLBACK_TYPE_NAME`].
    pub fn delta_type_name(&self) -> &'static str {
        match self {
            ColumnType::Null => "null",
            ColumnType::String => "string",
            ColumnType::Binary => "binary",
            ColumnType::Int8 => "byte",
            ColumnType::Int16 => "short",
            ColumnType::Int32 => "integer",
            ColumnType::Int64 => "long",
            ColumnType::Float32 => "float",
            ColumnType::Float64 => "double",
            ColumnType::Bool => "boolean",
            ColumnType::Date => "date",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Decimal { .. } => "decimal",
            ColumnType::Struct(_) => "struct",
            ColumnType::List(_) => "array",
            ColumnType::Map { .. } => "map",
            ColumnType::Unknown(_) => FALLBACK_TYPE_NAME,
        }
    }

    /// True when the mapper degrades this type to the fallback tag.
    pub fn is_fallback(&self) -> bool {
        matches!(self, ColumnType::Unknown(_))
    }
}
