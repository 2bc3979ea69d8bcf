//! `--save-buckets` snapshot: the four state buckets as one JSON document.

use bpreport_state::StateBuckets;
use camino::Utf8PathBuf;
use std::fs;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot write snapshot {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot encode buckets: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination of a bucket snapshot.
///
/// The document maps `queued`, `active`, `requeued` and `done` to objects
/// keyed by job id, each holding the decoded record.
pub struct BucketStore {
    path: Utf8PathBuf,
}

impl BucketStore {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write `buckets`, replacing any earlier snapshot at this path.
    /// Missing parent directories are created.
    pub fn save(&self, buckets: &StateBuckets) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(buckets)?;
        let failed = |source: io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_str().is_empty()) {
            fs::create_dir_all(dir).map_err(failed)?;
        }
        fs::write(&self.path, json).map_err(failed)
    }
}
