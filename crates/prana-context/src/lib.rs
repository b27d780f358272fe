//! Retrieval side of the assistant: chunking, embeddings, the vector index
//! and the orchestrator that turns a question into a grounded prompt.
//!
//! Build time runs knowledge base → [`chunking`] → [`embedding`] →
//! [`index`]; query time runs [`embedding`] → [`index`] → [`retrieval`].
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        clippy::float_cmp,
        reason = "Test allows"
    )
)]

mod builder;
pub mod chunking;
pub mod embedding;
pub mod index;
/// Knowledge-base loading and summaries.
pub mod knowledge;
pub mod retrieval;

pub use builder::{BuildReport, IndexBuilder};
pub use chunking::{ChunkConfig, chunk, chunk_all, chunk_article};
pub use embedding::{
    Embedding, EmbeddingClient, EmbeddingProvider, OllamaEmbeddingProvider, ProgressCallback,
    cosine_similarity,
};
pub use index::{
    IndexStats, IndexStatus, SearchBackend, SearchHit, StagedIndex, VectorEntry, VectorIndex,
};
pub use knowledge::{category_counts, load_knowledge_base};
pub use retrieval::{
    Retrieval, RetrievedChunk, Retriever, SourceCitation, build_context, build_prompt,
};
