//! Embedding client: timeouts, batch embedding and cosine similarity.

use prana_core::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

/// A single embedding vector
pub type Embedding = Vec<f32>;

/// Progress callback for batch embedding: `(completed, total)`
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Text used to discover the model's vector length.
const DIMENSION_PROBE: &str = "test";

/// Default deadline for a single embedding call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for the external model that turns text into vectors
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier of the embedding model
    fn model_name(&self) -> &str;

    /// Ensure the embedding model is available
    ///
    /// # Errors
    /// Returns an error if the model is not available or cannot be loaded
    fn ensure_model_available(&self) -> impl Future<Output = Result<()>> + Send;

    /// Generate embedding for text
    ///
    /// # Errors
    /// Returns an error if embedding generation fails
    fn embed(&self, text: &str) -> impl Future<Output = Result<Embedding>> + Send;
}

/// Wraps an [`EmbeddingProvider`] with deadlines and output validation.
#[derive(Clone)]
pub struct EmbeddingClient<P: EmbeddingProvider> {
    /// Underlying model boundary
    provider: P,
    /// Deadline for each provider call
    timeout: Duration,
}

impl<P: EmbeddingProvider> EmbeddingClient<P> {
    /// Create a client with the default 30 second deadline.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-call deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Embed one text.
    ///
    /// # Errors
    /// Returns `Timeout` when the deadline passes, `EmbeddingUnavailable` when
    /// the model fails or returns an empty vector
    pub async fn embed(&self, text: &str) -> Result<Embedding> {
        let embedding = timeout(self.timeout, self.provider.embed(text))
            .await
            .map_err(|_| Error::Timeout {
                operation: format!("embedding with '{}'", self.provider.model_name()),
                after_ms: self.timeout.as_millis() as u64,
            })??;

        if embedding.is_empty() {
            return Err(Error::EmbeddingUnavailable(format!(
                "model '{}' returned an empty embedding",
                self.provider.model_name()
            )));
        }
        if embedding.iter().any(|value| !value.is_finite()) {
            return Err(Error::EmbeddingUnavailable(format!(
                "model '{}' returned non-finite values",
                self.provider.model_name()
            )));
        }
        Ok(embedding)
    }

    /// Embed texts one after another, reporting progress after every item.
    ///
    /// # Errors
    /// Stops at and returns the first failed embedding
    pub async fn embed_batch(
        &self,
        texts: &[String],
        progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Embedding>> {
        let total = texts.len();
        let mut embeddings = Vec::with_capacity(total);

        for (idx, text) in texts.iter().enumerate() {
            embeddings.push(self.embed(text).await?);

            let completed = idx + 1;
            if let Some(callback) = progress {
                callback(completed, total);
            }
            if completed % 10 == 0 {
                info!("Generated embeddings: {completed}/{total}");
            }
        }

        info!("Generated {} embeddings", embeddings.len());
        Ok(embeddings)
    }

    /// Vector length produced by the model, discovered with a probe text.
    ///
    /// # Errors
    /// Returns an error if the probe embedding fails
    pub async fn dimension(&self) -> Result<usize> {
        let probe = self.embed(DIMENSION_PROBE).await?;
        debug!(
            "Model '{}' produces {}-dimensional embeddings",
            self.provider.model_name(),
            probe.len()
        );
        Ok(probe.len())
    }
}

/// Calculate cosine similarity between two vectors.
///
/// Returns `0.0` when either vector has zero magnitude.
///
/// # Errors
/// Returns `DimensionMismatch` if the vectors differ in length
pub fn cosine_similarity(vector_a: &[f32], vector_b: &[f32]) -> Result<f32> {
    if vector_a.len() != vector_b.len() {
        return Err(Error::DimensionMismatch {
            expected: vector_a.len(),
            actual: vector_b.len(),
        });
    }

    let dot_product: f32 = vector_a
        .iter()
        .zip(vector_b.iter())
        .map(|(x_val, y_val)| x_val * y_val)
        .sum();
    let magnitude_a = vector_a.iter().map(|x_val| x_val * x_val).sum::<f32>().sqrt();
    let magnitude_b = vector_b.iter().map(|y_val| y_val * y_val).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot_product / (magnitude_a * magnitude_b)).clamp(-1.0, 1.0))
}
