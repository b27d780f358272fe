//! In-memory vector index with exact linear-scan search and JSON snapshots.
//!
//! The index is read-mostly shared state. Searches take a shared read lock;
//! `initialize`, `add`, `reload` and `swap_in` take the write lock, so a
//! rebuild never interleaves with a search. Full rebuilds should be staged
//! in a [`StagedIndex`] and swapped in so readers never see a half-built
//! index.
//!
//! Search is O(entries) per query. That is fine for a knowledge base of a
//! few thousand chunks; an approximate structure can replace it behind
//! [`SearchBackend`] without changing callers.

mod snapshot;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{info, warn};

use crate::embedding::{Embedding, cosine_similarity};
use prana_core::{Chunk, Error, IgnoreRwLock as _, Result};
use snapshot::{SnapshotRef, read_snapshot, write_snapshot};

/// Stored vector with its chunk metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorEntry {
    /// Chunk identifier
    pub id: String,
    /// Embedding vector
    pub embedding: Embedding,
    /// Chunk the vector was computed from
    pub metadata: Chunk,
}

/// A scored search match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Chunk identifier
    pub id: String,
    /// Cosine similarity to the query
    pub score: f32,
    /// Matched chunk
    pub metadata: Chunk,
}

/// Size and persistence summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    /// Number of stored vectors
    pub count: usize,
    /// Declared vector length
    pub dimension: Option<usize>,
    /// Whether a snapshot file is present
    pub snapshot_exists: bool,
}

/// Readiness probe for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatus {
    /// Populated in memory or loadable from a snapshot
    pub initialized: bool,
    /// Number of stored vectors
    pub count: usize,
    /// Declared vector length
    pub dimension: Option<usize>,
    /// Whether a snapshot file is present
    pub snapshot_exists: bool,
}

/// Similarity search over stored chunks.
pub trait SearchBackend: Send + Sync {
    /// Make sure there is something to search, loading persisted state if needed.
    ///
    /// # Errors
    /// Returns `IndexNotReady` if nothing is loaded and nothing can be loaded
    fn ensure_ready(&self) -> Result<()>;

    /// Return at most `top_k` hits scoring at least `threshold`, best first.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the query length differs from the index dimension
    fn search(&self, query: &[f32], top_k: usize, threshold: f32) -> Result<Vec<SearchHit>>;
}

/// Dimension plus entries, replaced wholesale on rebuild or reload.
#[derive(Debug, Default)]
struct IndexState {
    /// Declared vector length, `None` until initialized
    dimension: Option<usize>,
    /// Entries in insertion order
    entries: Vec<VectorEntry>,
}

impl IndexState {
    /// Append an entry after checking its length against the dimension.
    fn push(&mut self, id: String, embedding: Embedding, metadata: Chunk) -> Result<()> {
        let expected = self.dimension.ok_or_else(|| {
            Error::IndexNotReady(
                "index must be initialized with a dimension before adding".to_owned(),
            )
        })?;
        if embedding.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: embedding.len(),
            });
        }
        self.entries.push(VectorEntry {
            id,
            embedding,
            metadata,
        });
        Ok(())
    }
}

/// Entries built off to the side of the live index, swapped in at once.
#[derive(Debug)]
pub struct StagedIndex {
    /// Dimension and entries being assembled
    state: IndexState,
}

impl StagedIndex {
    /// Start staging entries of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            state: IndexState {
                dimension: Some(dimension),
                entries: Vec::default(),
            },
        }
    }

    /// Append one entry.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the embedding has the wrong length
    pub fn add(&mut self, id: String, embedding: Embedding, metadata: Chunk) -> Result<()> {
        self.state.push(id, embedding, metadata)
    }

    /// Append entries in order, stopping at the first failure.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` for the first mis-sized embedding
    pub fn add_batch(&mut self, entries: impl IntoIterator<Item = VectorEntry>) -> Result<()> {
        for entry in entries {
            self.state.push(entry.id, entry.embedding, entry.metadata)?;
        }
        Ok(())
    }

    /// Number of staged entries.
    pub fn len(&self) -> usize {
        self.state.entries.len()
    }

    /// Whether nothing has been staged.
    pub fn is_empty(&self) -> bool {
        self.state.entries.is_empty()
    }
}

/// The process's vector index.
#[derive(Debug)]
pub struct VectorIndex {
    /// Guarded dimension and entries
    state: RwLock<IndexState>,
    /// Snapshot file location
    snapshot_path: PathBuf,
}

impl VectorIndex {
    /// Create an uninitialized index persisting to `snapshot_path`.
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            state: RwLock::new(IndexState::default()),
            snapshot_path: snapshot_path.into(),
        }
    }

    /// Snapshot file location.
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Reset to an empty index of the given dimension.
    pub fn initialize(&self, dimension: usize) {
        let mut state = self.state.write_ignore_poison();
        *state = IndexState {
            dimension: Some(dimension),
            entries: Vec::default(),
        };
        info!("Vector index initialized with dimension {dimension}");
    }

    /// Append one entry. Identifiers are not deduplicated.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the embedding length differs from the
    /// dimension, or `IndexNotReady` if the index was never initialized
    pub fn add(&self, id: impl Into<String>, embedding: Embedding, metadata: Chunk) -> Result<()> {
        self.state
            .write_ignore_poison()
            .push(id.into(), embedding, metadata)
    }

    /// Append entries in order under a single write lock.
    ///
    /// Entries before the first failure stay in the index.
    ///
    /// # Errors
    /// Returns the first `add` failure
    pub fn add_batch(&self, entries: impl IntoIterator<Item = VectorEntry>) -> Result<()> {
        let mut state = self.state.write_ignore_poison();
        let mut added = 0_usize;
        for entry in entries {
            state.push(entry.id, entry.embedding, entry.metadata)?;
            added += 1;
        }
        info!(
            "Added {added} vectors to index (total: {})",
            state.entries.len()
        );
        Ok(())
    }

    /// Replace the live state with a staged build, returning the previous entry count.
    pub fn swap_in(&self, staged: StagedIndex) -> usize {
        let mut state = self.state.write_ignore_poison();
        let previous = state.entries.len();
        *state = staged.state;
        info!(
            "Swapped in rebuilt index: {} vectors (previously {previous})",
            state.entries.len()
        );
        previous
    }

    /// Exact search over every entry.
    ///
    /// Ties keep insertion order.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the query length differs from the index dimension
    pub fn search(&self, query: &[f32], top_k: usize, threshold: f32) -> Result<Vec<SearchHit>> {
        let state = self.state.read_ignore_poison();

        if let Some(dimension) = state.dimension
            && query.len() != dimension
        {
            return Err(Error::DimensionMismatch {
                expected: dimension,
                actual: query.len(),
            });
        }
        if state.entries.is_empty() || top_k == 0 {
            return Ok(Vec::default());
        }

        let mut scored = Vec::with_capacity(state.entries.len());
        for (position, entry) in state.entries.iter().enumerate() {
            let score = cosine_similarity(query, &entry.embedding)?;
            if score >= threshold {
                scored.push((position, score));
            }
        }

        scored.sort_by(|first, second| second.1.total_cmp(&first.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(position, score)| {
                let entry = &state.entries[position];
                SearchHit {
                    id: entry.id.clone(),
                    score,
                    metadata: entry.metadata.clone(),
                }
            })
            .collect())
    }

    /// First entry stored under `id`.
    pub fn get(&self, id: &str) -> Option<VectorEntry> {
        self.state
            .read_ignore_poison()
            .entries
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
    }

    /// Drop all entries, keeping the dimension.
    pub fn clear(&self) {
        self.state.write_ignore_poison().entries.clear();
        info!("Vector index cleared");
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.state.read_ignore_poison().entries.len()
    }

    /// Whether no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.state.read_ignore_poison().entries.is_empty()
    }

    /// Declared dimension, if initialized.
    pub fn dimension(&self) -> Option<usize> {
        self.state.read_ignore_poison().dimension
    }

    /// Whether a snapshot file exists.
    pub fn snapshot_exists(&self) -> bool {
        self.snapshot_path.is_file()
    }

    /// Write the full index to the snapshot location, replacing any previous snapshot.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the file cannot be written
    pub fn persist(&self) -> Result<PathBuf> {
        let state = self.state.read_ignore_poison();
        let snapshot = SnapshotRef {
            dimension: state.dimension,
            vectors: &state.entries,
            created_at: Utc::now(),
            count: state.entries.len(),
        };
        write_snapshot(&self.snapshot_path, &snapshot)?;
        Ok(self.snapshot_path.clone())
    }

    /// Replace the live state with the snapshot's contents.
    ///
    /// Returns `false` and leaves the index untouched when the snapshot is
    /// missing, unreadable or inconsistent.
    pub fn reload(&self) -> bool {
        if !self.snapshot_exists() {
            info!("No vector index snapshot at {}", self.snapshot_path.display());
            return false;
        }

        match read_snapshot(&self.snapshot_path) {
            Ok(snapshot) => {
                let count = snapshot.vectors.len();
                let mut state = self.state.write_ignore_poison();
                *state = IndexState {
                    dimension: snapshot.dimension,
                    entries: snapshot.vectors,
                };
                info!(
                    "Loaded vector index with {count} vectors (built {})",
                    snapshot.created_at.to_rfc3339()
                );
                true
            }
            Err(error) => {
                warn!(
                    "Ignoring unusable snapshot {}: {error}",
                    self.snapshot_path.display()
                );
                false
            }
        }
    }

    /// Size and persistence summary.
    pub fn stats(&self) -> IndexStats {
        let state = self.state.read_ignore_poison();
        IndexStats {
            count: state.entries.len(),
            dimension: state.dimension,
            snapshot_exists: self.snapshot_exists(),
        }
    }

    /// Readiness probe.
    pub fn status(&self) -> IndexStatus {
        let stats = self.stats();
        IndexStatus {
            initialized: stats.count > 0 || stats.snapshot_exists,
            count: stats.count,
            dimension: stats.dimension,
            snapshot_exists: stats.snapshot_exists,
        }
    }
}

impl SearchBackend for VectorIndex {
    fn ensure_ready(&self) -> Result<()> {
        if !self.is_empty() {
            return Ok(());
        }
        if self.reload() {
            if !self.is_empty() {
                return Ok(());
            }
            return Err(Error::IndexNotReady(format!(
                "snapshot at {} holds no vectors; run the build step (`prana build`) over a non-empty knowledge base",
                self.snapshot_path.display()
            )));
        }
        Err(Error::IndexNotReady(format!(
            "no vectors loaded and no usable snapshot at {}; run the build step (`prana build`)",
            self.snapshot_path.display()
        )))
    }

    fn search(&self, query: &[f32], top_k: usize, threshold: f32) -> Result<Vec<SearchHit>> {
        Self::search(self, query, top_k, threshold)
    }
}
