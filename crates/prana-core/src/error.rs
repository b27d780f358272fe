use core::result::Result as CoreResult;
use std::io::Error as IoError;

use reqwest::Error as ReqwestError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for prana operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur across the retrieval and safety pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// An HTTP request to a model service failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chunking parameters cannot produce a terminating split.
    #[error("Invalid chunk configuration: {0}")]
    InvalidChunkConfig(String),

    /// A vector did not have the length the index or comparison requires.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Length required by the index or the other operand.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// The external embedding model failed or returned malformed output.
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// No populated or loadable vector index exists.
    #[error("Vector index not ready: {0}")]
    IndexNotReady(String),

    /// A snapshot could not be read, parsed or written.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// The knowledge base could not be loaded.
    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    /// A network call to a model exceeded its deadline.
    #[error("{operation} timed out after {after_ms}ms")]
    Timeout {
        /// Name of the operation that timed out.
        operation: String,
        /// Deadline that was exceeded, in milliseconds.
        after_ms: u64,
    },

    /// The generation model failed to produce an answer.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// A general error not covered by other variants.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Determines whether this error may succeed if retried.
    ///
    /// Only failures crossing the network boundary to a model service qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Request(_)
                | Self::EmbeddingUnavailable(_)
                | Self::Timeout { .. }
                | Self::Generation(_)
        )
    }

    /// Determines whether retrieval may be skipped in favour of generation without context.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingUnavailable(_) | Self::Timeout { .. } | Self::IndexNotReady(_)
        )
    }
}
