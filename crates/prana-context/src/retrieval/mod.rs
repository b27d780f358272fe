//! Retrieval orchestration: query embedding, index search and citation formatting.

mod prompt;

pub use prompt::{build_context, build_prompt};

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::embedding::{EmbeddingClient, EmbeddingProvider};
use crate::index::{SearchBackend, SearchHit, VectorIndex};
use prana_core::{ArticleCategory, Chunk, Result};

/// A chunk returned for a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedChunk {
    /// Matched chunk and its metadata
    #[serde(flatten)]
    pub chunk: Chunk,
    /// Cosine similarity rounded to two decimals
    pub similarity_score: f32,
}

impl From<SearchHit> for RetrievedChunk {
    fn from(hit: SearchHit) -> Self {
        Self {
            chunk: hit.metadata,
            similarity_score: (hit.score * 100.0).round() / 100.0,
        }
    }
}

/// Citation shown to the user for one retrieved chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCitation {
    /// One-based position matching `[Source N: ...]` in the context block
    pub ordinal: usize,
    /// Article title
    pub title: String,
    /// Chunk identifier
    pub chunk_id: String,
    /// Article category
    pub category: ArticleCategory,
    /// Article provenance
    pub source: String,
    /// Similarity as a whole percentage
    pub relevance_percent: u8,
}

impl SourceCitation {
    fn new(ordinal: usize, retrieved: &RetrievedChunk) -> Self {
        let percent = (retrieved.similarity_score * 100.0).round().clamp(0.0, 100.0);
        Self {
            ordinal,
            title: retrieved.chunk.title.clone(),
            chunk_id: retrieved.chunk.chunk_id.clone(),
            category: retrieved.chunk.category,
            source: retrieved.chunk.source.clone(),
            relevance_percent: percent as u8,
        }
    }
}

/// Everything retrieved for one query.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Retrieval {
    /// Matches, best first
    pub chunks: Vec<RetrievedChunk>,
    /// Prompt-ready rendering of `chunks`
    pub context_block: String,
    /// Citations in the same order as `chunks`
    pub sources: Vec<SourceCitation>,
}

impl Retrieval {
    /// Whether nothing was retrieved.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Embeds queries and searches a shared index.
pub struct Retriever<P: EmbeddingProvider, S: SearchBackend = VectorIndex> {
    /// Query embedding
    client: EmbeddingClient<P>,
    /// Shared index
    backend: Arc<S>,
}

impl<P: EmbeddingProvider, S: SearchBackend> Retriever<P, S> {
    /// Create a retriever over a shared index.
    pub fn new(client: EmbeddingClient<P>, backend: Arc<S>) -> Self {
        Self { client, backend }
    }

    /// Shared index.
    pub fn backend(&self) -> &Arc<S> {
        &self.backend
    }

    /// Embedding client used for queries.
    pub fn client(&self) -> &EmbeddingClient<P> {
        &self.client
    }

    /// Make sure the index is populated, reloading its snapshot if needed.
    ///
    /// # Errors
    /// Returns `IndexNotReady` when nothing is loaded or loadable
    pub fn ensure_ready(&self) -> Result<()> {
        self.backend.ensure_ready()
    }

    /// Retrieve at most `top_k` chunks scoring at least `threshold`.
    ///
    /// # Errors
    /// Returns `IndexNotReady` before a build, embedding errors from the
    /// model, or `DimensionMismatch` if the model and index disagree
    pub async fn retrieve(&self, query: &str, top_k: usize, threshold: f32) -> Result<Retrieval> {
        self.ensure_ready()?;

        let query_embedding = self.client.embed(query).await?;
        let hits = self.backend.search(&query_embedding, top_k, threshold)?;
        debug!("Retrieved {} chunks for query", hits.len());

        let chunks: Vec<RetrievedChunk> = hits.into_iter().map(RetrievedChunk::from).collect();
        let context_block = build_context(&chunks);
        let sources = chunks
            .iter()
            .enumerate()
            .map(|(idx, retrieved)| SourceCitation::new(idx + 1, retrieved))
            .collect();

        Ok(Retrieval {
            chunks,
            context_block,
            sources,
        })
    }
}
