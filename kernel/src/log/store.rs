// Delta Log Storage Abstraction
//
// Defines the contract of the external log store that persists commit
// text as numbered entries under `_delta_log/`. The kernel never writes
// to storage itself; it only describes the contract.

use std::collections::BTreeMap;

use super::Version;

/// Directory holding the Delta transaction log, relative to the table root.
pub const DELTA_LOG_DIR: &str = "_delta_log";

/// Path of the log entry for `version`, relative to the table root.
pub fn log_entry_path(version: Version) -> String {
    format!("{DELTA_LOG_DIR}/{version:020}.json")
}

#[derive(Debug, thiserror::Error)]
pub enum LogStoreError {
    #[error("version conflict: expected {expected}, got {actual}")]
    VersionConflict { expected: Version, actual: Version },

    #[error("log entry {path} already exists")]
    EntryExists { path: String },

    #[error("log version {latest} has no successor")]
    VersionOverflow { latest: Version },

    #[error("log store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage backend for the Delta log.
///
/// Properties required from implementations:
/// - Append-only
/// - Ordered
/// - No version gaps
///
/// Implementations MUST NOT overwrite an existing entry.
pub trait LogStore: Send + Sync {
    /// Append commit text as log entry `version`.
    ///
    /// Implementations must enforce:
    /// - version == latest_version + 1, or 0 for an empty log
    fn append(&mut self, version: Version, commit_text: &str) -> Result<(), LogStoreError>;

    /// Latest persisted version, `None` for an empty log.
    fn latest_version(&self) -> Result<Option<Version>, LogStoreError>;
}

/// Version the next append must use.
pub fn next_version(latest: Option<Version>) -> Result<Version, LogStoreError> {
    match latest {
        None => Ok(0),
        Some(v) => v
            .checked_add(1)
            .ok_or(LogStoreError::VersionOverflow { latest: v }),
    }
}

/// Log store kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryLogStore {
    entries: BTreeMap<Version, String>,
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit text stored at `version`.
    pub fn entry(&self, version: Version) -> Option<&str> {
        self.entries.get(&version).map(String::as_str)
    }
}

impl LogStore for InMemoryLogStore {
    fn append(&mut self, version: Version, commit_text: &str) -> Result<(), LogStoreError> {
        let expected = next_version(self.latest_version()?)?;
        if version != expected {
            return Err(LogStoreError::VersionConflict {
                expected,
                actual: version,
            });
        }

        self.entries.insert(version, commit_text.to_string());
        Ok(())
    }

    fn latest_version(&self) -> Result<Option<Version>, LogStoreError> {
        Ok(self.entries.keys().next_back().copied())
    }
}
