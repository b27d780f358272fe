//! Embedding generation and vector similarity.

mod client;
mod ollama;

pub use client::{
    Embedding, EmbeddingClient, EmbeddingProvider, ProgressCallback, cosine_similarity,
};
pub use ollama::OllamaEmbeddingProvider;
