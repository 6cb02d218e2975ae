// Filesystem Log Store
//
// Writes commit text as `<table>/_delta_log/<version>.json`. Entries are
// created exclusively; an existing entry is never overwritten. An entry
// whose write fails is removed again, so a version is only visible once
// its full commit text is on disk.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use delta_append_kernel::log::{
    log_entry_path, next_version, LogStore, LogStoreError, Version, DELTA_LOG_DIR,
};

#[derive(Debug)]
pub struct FsLogStore {
    table_root: PathBuf,
}

impl FsLogStore {
    pub fn new(table_root: impl Into<PathBuf>) -> Self {
        Self {
            table_root: table_root.into(),
        }
    }
}

impl LogStore for FsLogStore {
    fn append(&mut self, version: Version, commit_text: &str) -> Result<(), LogStoreError> {
        let expected = next_version(self.latest_version()?)?;
        if version != expected {
            return Err(LogStoreError::VersionConflict {
                expected,
                actual: version,
            });
        }

        fs::create_dir_all(self.table_root.join(DELTA_LOG_DIR))?;

        let relative = log_entry_path(version);
        create_entry(&self.table_root.join(&relative), |file| {
            file.write_all(commit_text.as_bytes())?;
            file.sync_all()
        })
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => LogStoreError::EntryExists { path: relative },
            _ => e.into(),
        })
    }

    fn latest_version(&self) -> Result<Option<Version>, LogStoreError> {
        let dir = self.table_root.join(DELTA_LOG_DIR);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut latest = None;
        for entry in entries {
            let name = entry?.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            if let Ok(version) = stem.parse::<Version>() {
                latest = latest.max(Some(version));
            }
        }
        Ok(latest)
    }
}

/// Create `path` exclusively and fill it with `write`.
///
/// A failed write deletes the file before the error is returned.
fn create_entry<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;

    if let Err(e) = write(&mut file) {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %cleanup, "failed to remove partial log entry");
        }
        return Err(e);
    }
    Ok(())
}
