//! Durable page checkpoint
//!
//! The checkpoint is a single JSON object, `{"last_page": n}`, naming the
//! highest catalog page whose records have been extracted and queued for
//! persistence. It is replaced atomically (write to a sibling temp file,
//! fsync, rename) so a crash leaves either the old or the new value.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing the checkpoint
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checkpoint cannot move backwards: stored page {current}, requested {requested}")]
    Regression { current: u32, requested: u32 },
}

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// On-disk shape of the checkpoint file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct CheckpointFile {
    last_page: u32,
}

/// File-backed store for the last completed page
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Creates a store backed by the file at `path`; the file need not exist
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the checkpoint file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the last completed page
    ///
    /// Never fails: a missing file means nothing has been completed yet, and
    /// an unreadable or corrupt file is logged and treated the same way.
    pub fn read_last_page(&self) -> u32 {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No checkpoint at {}", self.path.display());
                return 0;
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to read checkpoint {}: {}; starting from page 1",
                    self.path.display(),
                    e
                );
                return 0;
            }
        };

        match serde_json::from_str::<CheckpointFile>(&content) {
            Ok(checkpoint) => checkpoint.last_page,
            Err(e) => {
                tracing::warn!(
                    "Ignoring corrupt checkpoint {}: {}; starting from page 1",
                    self.path.display(),
                    e
                );
                0
            }
        }
    }

    /// The page a run should fetch first
    pub fn next_page(&self) -> u32 {
        self.read_last_page().saturating_add(1)
    }

    /// Durably records `page` as the last completed page
    ///
    /// Refuses to move the checkpoint backwards.
    pub fn write_last_page(&self, page: u32) -> CheckpointResult<()> {
        let current = self.read_last_page();
        if page < current {
            return Err(CheckpointError::Regression {
                current,
                requested: page,
            });
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        {
            let mut file = File::create(&temp_path)?;
            serde_json::to_writer(&mut file, &CheckpointFile { last_page: page })?;
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!("Checkpoint updated: last_page = {}", page);
        Ok(())
    }

    /// Deletes the checkpoint so the next run starts from page 1
    pub fn reset(&self) -> CheckpointResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Removed checkpoint {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "checkpoint".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
