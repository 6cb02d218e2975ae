// Delta Log Actions
//
// Typed records for the three action kinds written by an append-only
// commit (metaData, protocol, add) and their constructors.
//
// Constructors are pure and permissive: they never validate cross-field
// consistency. See `invariants` for the checks applied by the pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod commit;
pub mod store;

pub use commit::{serialize_commit, Action, Commit, CommitError};
pub use store::{
    log_entry_path, next_version, InMemoryLogStore, LogStore, LogStoreError, DELTA_LOG_DIR,
};

/// Version of a Delta log entry.
pub type Version = u64;

/// Storage provider recorded in every metadata action.
pub const PARQUET_PROVIDER: &str = "parquet";

/// Fresh table identifier (UUID v4).
pub fn new_table_id() -> String {
    Uuid::new_v4().to_string()
}

/// Storage format of the table's data files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    pub provider: String,
    pub options: BTreeMap<String, String>,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            provider: PARQUET_PROVIDER.to_string(),
            options: BTreeMap::new(),
        }
    }
}

/// Table identity, schema and partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataAction {
    pub id: String,
    pub format: Format,
    pub schema_string: String,
    pub partition_columns: Vec<String>,

    /// Epoch milliseconds.
    pub created_time: i64,
    pub configuration: BTreeMap<String, String>,
}

/// Minimum reader/writer versions required to read the table.
///
/// Feature lists serialize as `null` unless explicitly set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolAction {
    pub min_reader_version: i32,
    pub min_writer_version: i32,
    pub reader_features: Option<Vec<String>>,
    pub writer_features: Option<Vec<String>>,
}

impl ProtocolAction {
    pub fn with_reader_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reader_features = Some(features.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_writer_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.writer_features = Some(features.into_iter().map(Into::into).collect());
        self
    }
}

/// A data file that became part of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAction {
    /// Path relative to the table root.
    pub path: String,
    pub partition_values: BTreeMap<String, String>,

    /// Size in bytes.
    pub size: i64,

    /// Epoch milliseconds.
    pub modification_time: i64,

    /// Always true for appends.
    pub data_change: bool,
    pub tags: BTreeMap<String, String>,
}

/// Description of a physical file that was just written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFile {
    pub path: String,

    #[serde(default)]
    pub partition_values: BTreeMap<String, String>,
    pub size: i64,
    pub modification_time: i64,
}

impl From<DataFile> for AddAction {
    fn from(file: DataFile) -> Self {
        build_add(
            file.path,
            file.partition_values,
            file.size,
            file.modification_time,
        )
    }
}

/// Build the metadata action for a parquet-backed table.
pub fn build_metadata<I, S>(
    id: impl Into<String>,
    schema_string: impl Into<String>,
    partition_columns: I,
    created_time: i64,
) -> MetadataAction
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    MetadataAction {
        id: id.into(),
        format: Format::default(),
        schema_string: schema_string.into(),
        partition_columns: partition_columns.into_iter().map(Into::into).collect(),
        created_time,
        configuration: BTreeMap::new(),
    }
}

/// Build a protocol action without reader/writer feature lists.
///
/// Versions are taken as-is, including non-positive values.
pub fn build_protocol(min_reader_version: i32, min_writer_version: i32) -> ProtocolAction {
    ProtocolAction {
        min_reader_version,
        min_writer_version,
        reader_features: None,
        writer_features: None,
    }
}

/// Build an add action for an appended file.
pub fn build_add<I, K, V>(
    path: impl Into<String>,
    partition_values: I,
    size: i64,
    modification_time: i64,
) -> AddAction
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    AddAction {
        path: path.into(),
        partition_values: partition_values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
        size,
        modification_time,
        data_change: true,
        tags: BTreeMap::new(),
    }
}
