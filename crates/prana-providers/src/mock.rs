//! Mock provider for testing the ask pipeline.
//!
//! Returns canned answers keyed by substrings of the user prompt, records
//! every prompt it receives, and can be told to fail or stall so error and
//! timeout paths are testable without a model server.

use async_trait::async_trait;
use prana_core::{Error, GenerationProvider, IgnoreLock as _, Prompt, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Response storage type
type ResponseMap = Arc<Mutex<HashMap<String, String>>>;

/// Mock provider that returns pre-defined answers based on prompt patterns.
#[derive(Clone, Default)]
pub struct MockProvider {
    /// Predefined answers keyed by user-prompt substring
    responses: ResponseMap,
    /// Default answer if no pattern matches
    default_response: Arc<Mutex<Option<String>>>,
    /// Error message returned instead of an answer
    failure: Arc<Mutex<Option<String>>>,
    /// Artificial latency before answering
    delay: Arc<Mutex<Duration>>,
    /// Call history for verification
    call_history: Arc<Mutex<Vec<Prompt>>>,
}

impl MockProvider {
    /// Create a new mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer with `response` whenever the user prompt contains `pattern`.
    #[must_use]
    pub fn with_response(self, pattern: impl Into<String>, response: impl Into<String>) -> Self {
        {
            let mut responses = self.responses.lock_ignore_poison();
            responses.insert(pattern.into(), response.into());
        }
        self
    }

    /// Set a default answer for prompts that don't match any pattern.
    #[must_use]
    pub fn with_default_response(self, response: impl Into<String>) -> Self {
        {
            let mut default = self.default_response.lock_ignore_poison();
            *default = Some(response.into());
        }
        self
    }

    /// Fail every call with a `Generation` error.
    #[must_use]
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        {
            let mut failure = self.failure.lock_ignore_poison();
            *failure = Some(message.into());
        }
        self
    }

    /// Wait before answering.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        {
            let mut current = self.delay.lock_ignore_poison();
            *current = delay;
        }
        self
    }

    /// Clear the call history.
    pub fn clear_history(&self) {
        let mut history = self.call_history.lock_ignore_poison();
        history.clear();
    }

    /// Get the call history (every prompt received).
    #[must_use]
    pub fn get_call_history(&self) -> Vec<Prompt> {
        let history = self.call_history.lock_ignore_poison();
        history.clone()
    }

    /// Get the number of calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        let history = self.call_history.lock_ignore_poison();
        history.len()
    }

    /// Find a matching answer for the given user prompt.
    fn find_response(&self, user_prompt: &str) -> Option<String> {
        let responses = self.responses.lock_ignore_poison();
        responses
            .iter()
            .find(|(pattern, _)| user_prompt.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        {
            let mut history = self.call_history.lock_ignore_poison();
            history.push(prompt.clone());
        }

        let delay = *self.delay.lock_ignore_poison();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failure.lock_ignore_poison().clone();
        if let Some(message) = failure {
            return Err(Error::Generation(message));
        }

        Ok(self.find_response(&prompt.user_prompt).unwrap_or_else(|| {
            let default = self.default_response.lock_ignore_poison();
            default
                .clone()
                .unwrap_or_else(|| format!("Mock answer for: {}", prompt.user_prompt))
        }))
    }
}
