//! Snapshot sources.
//!
//! A source yields complete `ClusterInformation` values. The file source reads
//! a JSON document in the same shape templates see.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::topology::model::ClusterInformation;

/// Errors raised while reading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode snapshot {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything able to produce the current cluster snapshot.
pub trait SnapshotSource: Send + Sync {
    fn snapshot(&self) -> Result<ClusterInformation, SnapshotError>;
}

/// Reads snapshots from a JSON file on every call.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSource for FileSnapshotSource {
    fn snapshot(&self) -> Result<ClusterInformation, SnapshotError> {
        let content = fs::read_to_string(&self.path).map_err(|source| SnapshotError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SnapshotError::Decode {
            path: self.path.clone(),
            source,
        })
    }
}
