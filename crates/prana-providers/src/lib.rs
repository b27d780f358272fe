//! Provider adapters for external text-generation models.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        reason = "Test allows"
    )
)]

/// Mock provider for tests.
pub mod mock;
/// Ollama chat provider implementation.
pub mod ollama;
/// OpenAI-compatible chat completions provider.
pub mod openai;

use prana_core::config::{GenerationBackend, PranaConfig};
use prana_core::{GenerationProvider, Result};

pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatibleProvider;

/// Build the provider selected by the `[generation]` section.
///
/// # Errors
/// Returns an error if the OpenAI-compatible backend is selected without an API key
pub fn from_config(config: &PranaConfig) -> Result<Box<dyn GenerationProvider>> {
    Ok(match config.generation.backend {
        GenerationBackend::Ollama => Box::new(OllamaProvider::from_config(&config.ollama)),
        GenerationBackend::OpenaiCompatible => {
            Box::new(OpenAiCompatibleProvider::from_config(&config.generation)?)
        }
    })
}
