// Writer Configuration
//
// Defaults applied when building commits and notifications, loadable
// from JSON. Every field is optional in the file.

use serde::{Deserialize, Serialize};

use crate::notify::{DEFAULT_DFS_ENDPOINT, DEFAULT_ENGINE_INFO};

/// Whether commit invariants are enforced before serialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Reject commits that violate any standard invariant.
    #[default]
    Strict,

    /// Write whatever the caller supplied.
    Permissive,
}

/// Writer configuration loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub validation: ValidationMode,
    pub min_reader_version: i32,
    pub min_writer_version: i32,
    pub engine_info: String,
    pub dfs_endpoint: String,
}

impl WriterConfig {
    /// Built-in defaults (used if no config is provided).
    pub fn default_config() -> Self {
        Self {
            validation: ValidationMode::Strict,
            min_reader_version: 1,
            min_writer_version: 2,
            engine_info: DEFAULT_ENGINE_INFO.into(),
            dfs_endpoint: DEFAULT_DFS_ENDPOINT.into(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
