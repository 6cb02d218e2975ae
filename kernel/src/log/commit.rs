// Commit Serialization
//
// A commit is one metadata action, one protocol action and one or more
// add actions, always in that order. Each action is written as its own
// JSON object on its own line; lines are joined with `\n` and there is
// no trailing newline.

use serde::Serialize;
use tracing::debug;

use super::{AddAction, MetadataAction, ProtocolAction};

/// Errors produced while serializing a commit.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("commit must add at least one data file")]
    NoDataFiles,

    #[error("failed to encode {action} action: {source}")]
    Encoding {
        action: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// One line of the Delta log, wrapped in its action key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action<'a> {
    #[serde(rename = "metaData")]
    Metadata(&'a MetadataAction),

    #[serde(rename = "protocol")]
    Protocol(&'a ProtocolAction),

    #[serde(rename = "add")]
    Add(&'a AddAction),
}

impl Action<'_> {
    /// Key under which this action appears on the wire.
    pub fn key(&self) -> &'static str {
        match self {
            Action::Metadata(_) => "metaData",
            Action::Protocol(_) => "protocol",
            Action::Add(_) => "add",
        }
    }

    fn to_line(self) -> Result<String, CommitError> {
        serde_json::to_string(&self).map_err(|source| CommitError::Encoding {
            action: self.key(),
            source,
        })
    }
}

/// An append-only commit.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    metadata: MetadataAction,
    protocol: ProtocolAction,
    adds: Vec<AddAction>,
}

impl Commit {
    /// Assemble a commit. At least one add action is required.
    pub fn new(
        metadata: MetadataAction,
        protocol: ProtocolAction,
        adds: Vec<AddAction>,
    ) -> Result<Self, CommitError> {
        if adds.is_empty() {
            return Err(CommitError::NoDataFiles);
        }

        Ok(Self {
            metadata,
            protocol,
            adds,
        })
    }

    pub fn metadata(&self) -> &MetadataAction {
        &self.metadata
    }

    pub fn protocol(&self) -> &ProtocolAction {
        &self.protocol
    }

    pub fn adds(&self) -> &[AddAction] {
        &self.adds
    }

    /// Actions in log order: metadata, protocol, then every add.
    pub fn actions(&self) -> impl Iterator<Item = Action<'_>> {
        [
            Action::Metadata(&self.metadata),
            Action::Protocol(&self.protocol),
        ]
        .into_iter()
        .chain(self.adds.iter().map(Action::Add))
    }

    /// Render the newline-delimited log text.
    pub fn to_log_text(&self) -> Result<String, CommitError> {
        serialize_commit(&self.metadata, &self.protocol, &self.adds)
    }
}

/// Serialize actions into Delta log text.
///
/// Add actions keep the order supplied. Fails if `adds` is empty or an
/// action cannot be encoded; no partial text is ever returned.
pub fn serialize_commit(
    metadata: &MetadataAction,
    protocol: &ProtocolAction,
    adds: &[AddAction],
) -> Result<String, CommitError> {
    if adds.is_empty() {
        return Err(CommitError::NoDataFiles);
    }

    let actions = [Action::Metadata(metadata), Action::Protocol(protocol)]
        .into_iter()
        .chain(adds.iter().map(Action::Add));

    let lines = actions
        .map(Action::to_line)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(actions = lines.len(), "serialized commit");

    Ok(lines.join("\n"))
}
