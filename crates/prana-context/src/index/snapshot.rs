//! On-disk snapshot format for the vector index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::VectorEntry;
use prana_core::{Error, Result};

/// Borrowed view written by `persist`, so entries are not cloned under the read lock.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SnapshotRef<'entries> {
    /// Index dimension, `None` for an uninitialized index
    pub dimension: Option<usize>,
    /// All entries in insertion order
    pub vectors: &'entries [VectorEntry],
    /// Time the snapshot was written
    pub created_at: DateTime<Utc>,
    /// Number of entries
    pub count: usize,
}

/// Owned snapshot read back by `reload`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Snapshot {
    /// Index dimension
    pub dimension: Option<usize>,
    /// All entries in insertion order
    pub vectors: Vec<VectorEntry>,
    /// Time the snapshot was written
    pub created_at: DateTime<Utc>,
    /// Number of entries recorded at write time
    pub count: usize,
}

impl Snapshot {
    /// Check internal consistency of a decoded snapshot.
    ///
    /// # Errors
    /// Returns `Snapshot` if the count or any vector length disagrees with the header
    pub fn validate(&self) -> Result<()> {
        if self.count != self.vectors.len() {
            return Err(Error::Snapshot(format!(
                "header count {} does not match {} stored vectors",
                self.count,
                self.vectors.len()
            )));
        }
        match self.dimension {
            None if !self.vectors.is_empty() => Err(Error::Snapshot(
                "vectors present without a dimension".to_owned(),
            )),
            Some(dimension) => self
                .vectors
                .iter()
                .find(|entry| entry.embedding.len() != dimension)
                .map_or(Ok(()), |entry| {
                    Err(Error::Snapshot(format!(
                        "vector '{}' has length {}, expected {dimension}",
                        entry.id,
                        entry.embedding.len()
                    )))
                }),
            None => Ok(()),
        }
    }
}

/// Write the snapshot through a temporary sibling, replacing any previous file.
///
/// # Errors
/// Returns an error if the directory cannot be created or the file cannot be written
pub(super) fn write_snapshot(path: &Path, snapshot: &SnapshotRef<'_>) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let bytes = serde_json::to_vec(snapshot)?;
    let staging = staging_path(path);
    fs::write(&staging, &bytes)?;
    fs::rename(&staging, path)?;

    info!(
        "Saved vector index with {} vectors to {} ({} bytes)",
        snapshot.count,
        path.display(),
        bytes.len()
    );
    Ok(())
}

/// Read and validate a snapshot.
///
/// # Errors
/// Returns an error if the file is missing, unreadable, malformed or inconsistent
pub(super) fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let data = fs::read(path)?;
    let snapshot: Snapshot = serde_json::from_slice(&data)
        .map_err(|error| Error::Snapshot(format!("Failed to parse snapshot: {error}")))?;
    snapshot.validate()?;
    Ok(snapshot)
}

/// Temporary file written before the atomic rename.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
