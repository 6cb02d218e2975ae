// Append Commit Pipeline
//
// Runs the full append path from raw inputs:
// schema → schema string → actions → (invariants) → commit text → envelope
//
// Every stage is pure. The first failing stage aborts the run and is
// identified in the returned error.

use std::fmt;

use tracing::{debug, instrument};

use crate::config::{ValidationMode, WriterConfig};
use crate::invariants::{CommitCandidate, InvariantEngine, InvariantViolation};
use crate::log::{
    build_metadata, build_protocol, serialize_commit, AddAction, CommitError, DataFile,
};
use crate::notify::{package_notification, NotifyError, TransactionDestination};
use crate::schema::{encode_schema, SchemaError, TableSchema};

/// Stage of the pipeline that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SchemaConversion,
    Validation,
    CommitEncoding,
    EnvelopeConstruction,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::SchemaConversion => "schema conversion",
            Stage::Validation => "validation",
            Stage::CommitEncoding => "commit encoding",
            Stage::EnvelopeConstruction => "envelope construction",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while running the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("schema conversion failed: {0}")]
    Schema(#[from] SchemaError),

    #[error("commit validation failed: {0}")]
    Validation(#[from] InvariantViolation),

    #[error("commit encoding failed: {0}")]
    Commit(#[from] CommitError),

    #[error("envelope construction failed: {0}")]
    Envelope(#[from] NotifyError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Schema(_) => Stage::SchemaConversion,
            PipelineError::Validation(_) => Stage::Validation,
            PipelineError::Commit(_) => Stage::CommitEncoding,
            PipelineError::Envelope(_) => Stage::EnvelopeConstruction,
        }
    }
}

/// Inputs of one append commit, apart from the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendRequest {
    /// Opaque table identifier, typically a UUID.
    pub table_id: String,
    pub partition_columns: Vec<String>,

    /// Epoch milliseconds.
    pub created_time: i64,
    pub min_reader_version: i32,
    pub min_writer_version: i32,

    /// Files added atomically, in log order.
    pub files: Vec<DataFile>,
}

impl AppendRequest {
    /// Request for a commit that adds exactly one file.
    pub fn single_file(
        table_id: impl Into<String>,
        partition_columns: Vec<String>,
        created_time: i64,
        min_reader_version: i32,
        min_writer_version: i32,
        file: DataFile,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            partition_columns,
            created_time,
            min_reader_version,
            min_writer_version,
            files: vec![file],
        }
    }
}

/// Append pipeline configured once and reused across calls.
#[derive(Debug)]
pub struct CommitPipeline {
    validation: ValidationMode,
    invariants: InvariantEngine,
}

impl Default for CommitPipeline {
    fn default() -> Self {
        Self::new(&WriterConfig::default_config())
    }
}

impl CommitPipeline {
    /// Pipeline enforcing the standard invariants per `config.validation`.
    pub fn new(config: &WriterConfig) -> Self {
        Self::with_invariants(config.validation, InvariantEngine::standard())
    }

    pub fn with_invariants(validation: ValidationMode, invariants: InvariantEngine) -> Self {
        Self {
            validation,
            invariants,
        }
    }

    /// Build the newline-delimited commit text for `request`.
    #[instrument(skip_all, fields(table_id = %request.table_id, files = request.files.len()))]
    pub fn commit_text(
        &self,
        schema: &TableSchema,
        request: &AppendRequest,
    ) -> Result<String, PipelineError> {
        // 1. Schema string
        let schema_string = encode_schema(schema)?;

        // 2. Actions
        let metadata = build_metadata(
            request.table_id.as_str(),
            schema_string,
            request.partition_columns.iter().map(String::as_str),
            request.created_time,
        );
        let protocol = build_protocol(request.min_reader_version, request.min_writer_version);
        let adds: Vec<AddAction> = request.files.iter().cloned().map(AddAction::from).collect();

        // 3. Invariants
        if self.validation == ValidationMode::Strict {
            self.invariants.evaluate(&CommitCandidate {
                schema,
                metadata: &metadata,
                protocol: &protocol,
                adds: &adds,
            })?;
        }

        // 4. Commit text
        let text = serialize_commit(&metadata, &protocol, &adds)?;
        debug!(bytes = text.len(), "built append commit");

        Ok(text)
    }

    /// Build the commit and package it as a transaction notification.
    #[instrument(skip_all, fields(table_id = %request.table_id))]
    pub fn notification(
        &self,
        schema: &TableSchema,
        request: &AppendRequest,
        destination: TransactionDestination,
    ) -> Result<String, PipelineError> {
        let commit_text = self.commit_text(schema, request)?;
        Ok(package_notification(&commit_text, destination)?)
    }
}

/// Commit text for `request` using the default (strict) pipeline.
pub fn generate_append_commit(
    schema: &TableSchema,
    request: &AppendRequest,
) -> Result<String, PipelineError> {
    CommitPipeline::default().commit_text(schema, request)
}

/// Notification envelope for `request` using the default (strict) pipeline.
pub fn generate_append_notification(
    schema: &TableSchema,
    request: &AppendRequest,
    destination: TransactionDestination,
) -> Result<String, PipelineError> {
    CommitPipeline::default().notification(schema, request, destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ColumnType};
    use std::collections::BTreeMap;

    fn schema() -> TableSchema {
        TableSchema::new(vec![
            Column::new("archer", ColumnType::String, false),
            Column::new("year", ColumnType::Int16, true),
        ])
    }

    fn request() -> AppendRequest {
        AppendRequest::single_file(
            "abc-123",
            vec!["year".into()],
            1_700_000_000_000,
            1,
            2,
            DataFile {
                path: "year=1992/part-0.parquet".into(),
                partition_values: BTreeMap::from([("year".into(), "1992".into())]),
                size: 100,
                modification_time: 1_700_000_000_000,
            },
        )
    }

    fn destination() -> TransactionDestination {
        TransactionDestination {
            storage_account_auth_type: "ManagedIdentityCredential".into(),
            storage_account_name: "acct".into(),
            storage_container_name: "onelake".into(),
            table_relative_path: "warehouse/archers".into(),
            storage_account_dfs_endpoint: "dfs.core.windows.net".into(),
            storage_account_tenant_id: "tenant".into(),
            engine_info: "DeltaLakeStandaloneDotnet/V1".into(),
        }
    }

    #[test]
    fn single_file_commit_has_three_lines() {
        let text = generate_append_commit(&schema(), &request()).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn strict_mode_reports_validation_stage() {
        let mut req = request();
        req.partition_columns = vec!["month".into()];

        let err = generate_append_commit(&schema(), &req).unwrap_err();
        assert_eq!(err.stage(), Stage::Validation);
        assert!(err.to_string().contains("partition-columns-in-schema"));
    }

    #[test]
    fn permissive_mode_writes_inconsistent_commit() {
        let mut req = request();
        req.partition_columns = vec!["month".into()];
        req.min_reader_version = 0;

        let config = WriterConfig {
            validation: ValidationMode::Permissive,
            ..WriterConfig::default_config()
        };
        let text = CommitPipeline::new(&config)
            .commit_text(&schema(), &req)
            .unwrap();

        assert!(text.contains(r#""partitionColumns":["month"]"#));
        assert!(text.contains(r#""minReaderVersion":0"#));
    }

    #[test]
    fn empty_file_list_reports_commit_stage_when_permissive() {
        let mut req = request();
        req.files.clear();

        let pipeline =
            CommitPipeline::with_invariants(ValidationMode::Permissive, InvariantEngine::new());
        let err = pipeline.commit_text(&schema(), &req).unwrap_err();
        assert_eq!(err.stage(), Stage::CommitEncoding);

        let err = generate_append_commit(&schema(), &req).unwrap_err();
        assert_eq!(err.stage(), Stage::Validation);
    }

    #[test]
    fn notification_wraps_commit_text() {
        let commit = generate_append_commit(&schema(), &request()).unwrap();
        let envelope =
            generate_append_notification(&schema(), &request(), destination()).unwrap();

        let parsed: crate::notify::TransactionNotification =
            serde_json::from_str(&envelope).unwrap();
        assert_eq!(parsed.commit_text().unwrap(), commit);
        assert_eq!(parsed.transaction_destination, destination());
    }

    #[test]
    fn stage_display_names() {
        assert_eq!(Stage::SchemaConversion.to_string(), "schema conversion");
        assert_eq!(Stage::EnvelopeConstruction.to_string(), "envelope construction");
    }
}
