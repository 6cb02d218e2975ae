// Transaction Notifications
//
// Wraps serialized commit text, base64-encoded, together with the
// storage destination the commit belongs to. The resulting envelope is
// handed to an external transport as an opaque JSON payload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod sink;

pub use sink::{
    InMemorySink, NotificationSink, SinkError, TransportMessage, CONTENT_TYPE_JSON,
    TRANSACTION_MESSAGE_TYPE,
};

/// Engine identifier expected by the downstream Delta writer service.
pub const DEFAULT_ENGINE_INFO: &str = "DeltaLakeStandaloneDotnet/V1";

/// Default ADLS Gen2 DFS endpoint suffix.
pub const DEFAULT_DFS_ENDPOINT: &str = "dfs.core.windows.net";

/// Where the receiving service should apply the commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDestination {
    /// Credential kind the receiver uses, e.g. `ManagedIdentityCredential`.
    pub storage_account_auth_type: String,
    pub storage_account_name: String,
    pub storage_container_name: String,

    /// Table root, relative to the container.
    pub table_relative_path: String,
    pub storage_account_dfs_endpoint: String,
    pub storage_account_tenant_id: String,
    pub engine_info: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to encode notification: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("command list is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("command list is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Envelope for one append-only commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionNotification {
    pub transaction_destination: TransactionDestination,

    /// Commit text, base64 (standard alphabet, padded).
    pub serialized_transaction_command_list_base64: String,
}

impl TransactionNotification {
    pub fn new(commit_text: &str, destination: TransactionDestination) -> Self {
        Self {
            transaction_destination: destination,
            serialized_transaction_command_list_base64: STANDARD.encode(commit_text),
        }
    }

    /// Decode the embedded commit text.
    pub fn commit_text(&self) -> Result<String, NotifyError> {
        let bytes = STANDARD.decode(&self.serialized_transaction_command_list_base64)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Compact JSON envelope text.
    pub fn to_json(&self) -> Result<String, NotifyError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Package commit text for `destination` and render the envelope.
pub fn package_notification(
    commit_text: &str,
    destination: TransactionDestination,
) -> Result<String, NotifyError> {
    let envelope = TransactionNotification::new(commit_text, destination).to_json()?;
    debug!(bytes = envelope.len(), "packaged transaction notification");
    Ok(envelope)
}
