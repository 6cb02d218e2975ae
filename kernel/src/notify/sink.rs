// Notification Transport Abstraction
//
// Describes the message handed to the external bus client. Delivery
// itself (credentials, batching, retries) is owned by the implementation.

use chrono::{DateTime, SecondsFormat, Utc};

use super::{NotifyError, TransactionNotification};

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Classification tag the receiving service routes on.
pub const TRANSACTION_MESSAGE_TYPE: &str = "DeltaLakeTransactionNotification";

/// Opaque payload plus the tags the transport attaches to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMessage {
    pub body: String,
    pub content_type: &'static str,
    pub message_type: &'static str,

    /// RFC 3339 UTC time the message was built, whole seconds.
    pub timestamp: String,
}

impl TransportMessage {
    /// Render a notification into a transport message.
    pub fn from_notification(notification: &TransactionNotification) -> Result<Self, NotifyError> {
        Ok(Self::from_envelope(notification.to_json()?))
    }

    /// Wrap already rendered envelope text, stamped with the current time.
    pub fn from_envelope(body: String) -> Self {
        Self::from_envelope_at(body, Utc::now())
    }

    pub fn from_envelope_at(body: String, at: DateTime<Utc>) -> Self {
        Self {
            body,
            content_type: CONTENT_TYPE_JSON,
            message_type: TRANSACTION_MESSAGE_TYPE,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("sink I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for transaction notifications.
///
/// Implementations are expected to deliver at least once.
pub trait NotificationSink: Send + Sync {
    fn deliver(&mut self, message: TransportMessage) -> Result<(), SinkError>;
}

/// Sink that keeps every delivered message in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    delivered: Vec<TransportMessage>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> &[TransportMessage] {
        &self.delivered
    }
}

impl NotificationSink for InMemorySink {
    fn deliver(&mut self, message: TransportMessage) -> Result<(), SinkError> {
        self.delivered.push(message);
        Ok(())
    }
}
