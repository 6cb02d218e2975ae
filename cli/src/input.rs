// Input Files
//
// JSON documents accepted by the CLI. Optional fields are filled from
// the writer config or the current time.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Deserialize;

use delta_append_kernel::config::WriterConfig;
use delta_append_kernel::log::{new_table_id, DataFile};
use delta_append_kernel::notify::TransactionDestination;
use delta_append_kernel::pipeline::AppendRequest;
use delta_append_kernel::schema::TableSchema;

/// Append request file.
#[derive(Debug, Deserialize)]
pub struct RequestFile {
    pub table_id: Option<String>,
    pub schema: TableSchema,

    #[serde(default)]
    pub partition_columns: Vec<String>,
    pub created_time: Option<i64>,
    pub min_reader_version: Option<i32>,
    pub min_writer_version: Option<i32>,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
pub struct FileEntry {
    pub path: String,

    #[serde(default)]
    pub partition_values: BTreeMap<String, String>,
    pub size: i64,
    pub modification_time: Option<i64>,
}

impl RequestFile {
    /// Split into the schema and a fully populated request.
    pub fn resolve(self, config: &WriterConfig) -> (TableSchema, AppendRequest) {
        let now = Utc::now().timestamp_millis();

        let files = self
            .files
            .into_iter()
            .map(|f| DataFile {
                path: f.path,
                partition_values: f.partition_values,
                size: f.size,
                modification_time: f.modification_time.unwrap_or(now),
            })
            .collect();

        let request = AppendRequest {
            table_id: self.table_id.unwrap_or_else(new_table_id),
            partition_columns: self.partition_columns,
            created_time: self.created_time.unwrap_or(now),
            min_reader_version: self.min_reader_version.unwrap_or(config.min_reader_version),
            min_writer_version: self.min_writer_version.unwrap_or(config.min_writer_version),
            files,
        };

        (self.schema, request)
    }
}

/// Destination file. Endpoint and engine default from config.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationFile {
    pub storage_account_auth_type: String,
    pub storage_account_name: String,
    pub storage_container_name: String,
    pub table_relative_path: String,
    pub storage_account_dfs_endpoint: Option<String>,
    pub storage_account_tenant_id: String,
    pub engine_info: Option<String>,
}

impl DestinationFile {
    pub fn resolve(self, config: &WriterConfig) -> TransactionDestination {
        TransactionDestination {
            storage_account_auth_type: self.storage_account_auth_type,
            storage_account_name: self.storage_account_name,
            storage_container_name: self.storage_container_name,
            table_relative_path: self.table_relative_path,
            storage_account_dfs_endpoint: self
                .storage_account_dfs_endpoint
                .unwrap_or_else(|| config.dfs_endpoint.clone()),
            storage_account_tenant_id: self.storage_account_tenant_id,
            engine_info: self
                .engine_info
                .unwrap_or_else(|| config.engine_info.clone()),
        }
    }
}
