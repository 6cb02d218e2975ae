// Schema Encoding
//
// Converts an ordered list of typed columns into the Delta Lake
// schema string embedded in a metadata action. Pure and deterministic:
// field order is preserved, nothing is reordered or deduplicated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod types;

pub use types::{ColumnType, FALLBACK_TYPE_NAME};

/// A single named, typed, nullable column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: ColumnType,

    #[serde(default)]
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

/// Ordered set of columns describing a table.
///
/// Column names are not checked for uniqueness here; that belongs to the
/// upstream schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSchema {
    columns: Vec<Column>,
}

impl TableSchema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up a column by name (first match wins).
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns whose type will be written as the fallback tag.
    pub fn fallback_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| c.data_type.is_fallback())
            .collect()
    }
}

impl FromIterator<Column> for TableSchema {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Errors produced while encoding a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to encode schema: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Root of a Delta schema string.
#[derive(Debug, Serialize)]
struct DeltaSchema<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    fields: Vec<DeltaField<'a>>,
}

#[derive(Debug, Serialize)]
struct DeltaField<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    nullable: bool,
    // Column metadata is never propagated.
    metadata: BTreeMap<String, String>,
}

/// Encode a table schema as a Delta Lake schema string.
///
/// Output shape:
/// `{"type":"struct","fields":[{"name":..,"type":..,"nullable":..,"metadata":{}}]}`
pub fn encode_schema(schema: &TableSchema) -> Result<String, SchemaError> {
    let fields = schema
        .columns()
        .iter()
        .map(|column| {
            if column.data_type.is_fallback() {
                warn!(
                    column = %column.name,
                    source_type = ?column.data_type,
                    fallback = FALLBACK_TYPE_NAME,
                    "unsupported column type downgraded"
                );
            }

            DeltaField {
                name: &column.name,
                kind: column.data_type.delta_type_name(),
                nullable: column.nullable,
                metadata: BTreeMap::new(),
            }
        })
        .collect();

    let root = DeltaSchema {
        kind: "struct",
        fields,
    };

    let encoded = serde_json::to_string(&root)?;
    debug!(fields = schema.len(), "encoded table schema");

    Ok(encoded)
}
