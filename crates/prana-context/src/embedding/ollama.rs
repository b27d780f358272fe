//! Ollama-backed embedding provider.

use super::client::{Embedding, EmbeddingProvider};
use ollama_rs::Ollama;
use ollama_rs::generation::embeddings::request::GenerateEmbeddingsRequest;
use prana_core::config::OllamaConfig;
use prana_core::{Error, Result};

/// Embedding provider talking to a local or remote Ollama server.
#[derive(Clone)]
pub struct OllamaEmbeddingProvider {
    /// Ollama client
    ollama: Ollama,
    /// Embedding model name
    model: String,
}

impl OllamaEmbeddingProvider {
    /// Create a provider for the given endpoint and model.
    pub fn new(host: &str, port: u16, model: impl Into<String>) -> Self {
        Self {
            ollama: Ollama::new(host.to_owned(), port),
            model: model.into(),
        }
    }

    /// Create a provider from the `[ollama]` configuration section.
    pub fn from_config(config: &OllamaConfig) -> Self {
        Self::new(&config.host, config.port, config.embedding_model.clone())
    }
}

impl EmbeddingProvider for OllamaEmbeddingProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn ensure_model_available(&self) -> Result<()> {
        let models = self.ollama.list_local_models().await.map_err(|error| {
            Error::EmbeddingUnavailable(format!(
                "Failed to connect to Ollama: {error}. Ensure Ollama is installed and running (`ollama serve`)"
            ))
        })?;

        if models.iter().any(|model| model.name.contains(&self.model)) {
            Ok(())
        } else {
            Err(Error::EmbeddingUnavailable(format!(
                "Embedding model '{}' not found. Run: ollama pull {}",
                self.model, self.model
            )))
        }
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let request = GenerateEmbeddingsRequest::new(self.model.clone(), text.to_owned().into());

        let response = self
            .ollama
            .generate_embeddings(request)
            .await
            .map_err(|error| {
                let error_str = format!("{error:?}");
                if error_str.contains("model") && error_str.contains("not found") {
                    Error::EmbeddingUnavailable(format!(
                        "Embedding model '{}' not found. Run: ollama pull {}",
                        self.model, self.model
                    ))
                } else {
                    Error::EmbeddingUnavailable(format!("Embedding generation failed: {error}"))
                }
            })?;

        // One input yields one vector
        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::EmbeddingUnavailable("No embeddings returned".to_owned()))
    }
}
