//! Offline build step: knowledge base to persisted vector index.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

use crate::chunking::{ChunkConfig, chunk_all};
use crate::embedding::{EmbeddingClient, EmbeddingProvider, ProgressCallback};
use crate::index::{StagedIndex, VectorEntry, VectorIndex};
use crate::knowledge::{category_counts, load_knowledge_base};
use prana_core::config::RagConfig;
use prana_core::{ArticleCategory, Error, Result};

/// Outcome of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    /// Articles read from the knowledge base, `None` when an existing snapshot was reused
    pub articles: Option<usize>,
    /// Articles per category
    pub categories: BTreeMap<ArticleCategory, usize>,
    /// Vectors in the index after the build
    pub chunks: usize,
    /// Vector length
    pub dimension: Option<usize>,
    /// Snapshot location
    pub snapshot: PathBuf,
    /// Whether the build was satisfied by reloading a snapshot
    pub reused_snapshot: bool,
}

/// Chunks, embeds and indexes the knowledge base.
pub struct IndexBuilder<P: EmbeddingProvider> {
    /// Embedding model wrapper
    client: EmbeddingClient<P>,
    /// Chunking parameters
    chunking: ChunkConfig,
    /// Knowledge-base document
    knowledge_base: PathBuf,
    /// Optional per-chunk progress reporter
    progress: Option<ProgressCallback>,
}

impl<P: EmbeddingProvider> IndexBuilder<P> {
    /// Create a builder reading `knowledge_base` with the given chunking.
    pub fn new(
        client: EmbeddingClient<P>,
        chunking: ChunkConfig,
        knowledge_base: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            chunking,
            knowledge_base: knowledge_base.into(),
            progress: None,
        }
    }

    /// Create a builder from the `[rag]` configuration section.
    pub fn from_config(client: EmbeddingClient<P>, config: &RagConfig) -> Self {
        Self::new(client, ChunkConfig::from(config), config.knowledge_base.clone())
    }

    /// Report embedding progress as `(completed, total)`.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Populate `index`, reusing a non-empty snapshot unless `force` is set.
    ///
    /// The new entries are staged and swapped in, so concurrent searches see
    /// either the old index or the complete new one.
    ///
    /// # Errors
    /// Returns an error if the knowledge base cannot be loaded, chunking is
    /// misconfigured, an embedding fails, or the snapshot cannot be written
    pub async fn build(&self, index: &VectorIndex, force: bool) -> Result<BuildReport> {
        self.chunking.validate()?;

        // An empty snapshot is rebuilt so `IndexNotReady` is always cleared by a build
        if !force && index.reload() && !index.is_empty() {
            info!("Using existing vector index");
            return Ok(BuildReport {
                articles: None,
                categories: BTreeMap::new(),
                chunks: index.len(),
                dimension: index.dimension(),
                snapshot: index.snapshot_path().to_path_buf(),
                reused_snapshot: true,
            });
        }

        info!("Building vector index from {}", self.knowledge_base.display());
        let articles = load_knowledge_base(&self.knowledge_base)?;
        let chunks = chunk_all(&articles, &self.chunking)?;

        self.client.provider().ensure_model_available().await?;
        let dimension = self.client.dimension().await?;

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.embedding_text()).collect();
        let embeddings = self
            .client
            .embed_batch(&texts, self.progress.as_ref())
            .await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::Other(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut staged = StagedIndex::new(dimension);
        staged.add_batch(
            chunks
                .into_iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| VectorEntry {
                    id: chunk.chunk_id.clone(),
                    embedding,
                    metadata: chunk,
                }),
        )?;
        let count = staged.len();
        index.swap_in(staged);
        let snapshot = index.persist()?;

        info!("Vector index built: {count} vectors of dimension {dimension}");
        Ok(BuildReport {
            articles: Some(articles.len()),
            categories: category_counts(&articles),
            chunks: count,
            dimension: Some(dimension),
            snapshot,
            reused_snapshot: false,
        })
    }
}
