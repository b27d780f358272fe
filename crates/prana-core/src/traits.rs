use async_trait::async_trait;

use crate::{Prompt, Result};

/// External text-generation model.
///
/// Implementations send the system prompt and then the user prompt as an
/// ordered pair of chat messages and return the generated text.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Returns the unique identifier for this provider.
    fn name(&self) -> &'static str;

    /// Checks whether this provider is currently available and ready to process requests.
    async fn is_available(&self) -> bool;

    /// Generates an answer for the prompt pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unavailable, the request fails,
    /// or the response cannot be parsed.
    async fn generate(&self, prompt: &Prompt) -> Result<String>;
}
