//! Core types, configuration and error handling shared by the prana crates.
//!
//! Everything that crosses a crate boundary lives here: the knowledge-base
//! data model, the prompt pair handed to generation models, the error
//! taxonomy and the on-disk configuration.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        reason = "Test allows"
    )
)]

/// Configuration loading and defaults.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Synchronization helpers for poisoned locks.
pub mod sync;
/// Generation model boundary.
pub mod traits;
/// Knowledge-base and prompt data types.
pub mod types;

pub use config::PranaConfig;
pub use error::{Error, Result};
pub use sync::{IgnoreLock, IgnoreRwLock};
pub use traits::GenerationProvider;
pub use types::{Article, ArticleCategory, Chunk, Difficulty, Prompt};
