use async_trait::async_trait;
use prana_core::config::GenerationConfig;
use prana_core::{Error, GenerationProvider, Prompt, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Env var consulted when the config carries no API key.
const ENV_API_KEY: &str = "PRANA_API_KEY";

/// Chat-completions provider for any OpenAI-compatible endpoint (Groq, OpenRouter, vLLM).
pub struct OpenAiCompatibleProvider {
    /// HTTP client for API requests.
    client: Client,
    /// Base URL without the `/chat/completions` suffix.
    base_url: String,
    /// Bearer token.
    api_key: String,
    /// Model name to use.
    model: String,
}

impl OpenAiCompatibleProvider {
    /// Creates a provider for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the provided API key is empty.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::Config(format!(
                "generation API key missing: set [generation].api_key or {ENV_API_KEY}"
            )));
        }

        Ok(Self {
            client: Client::default(),
            base_url: base_url.into(),
            api_key,
            model: model.into(),
        })
    }

    /// Creates a provider from the `[generation]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured.
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.api_key.clone().unwrap_or_default(),
            config.model.clone(),
        )
    }

    /// Sets the model to use for generation.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Full chat-completions URL.
    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Request payload sent to the chat completion API.
#[derive(Debug, Serialize)]
struct ChatRequest {
    /// Model identifier.
    model: String,
    /// System message followed by user message.
    messages: Vec<ChatMessage>,
    /// Sampling temperature controlling response randomness.
    temperature: f32,
}

/// Message delivered to the API.
#[derive(Debug, Serialize)]
struct ChatMessage {
    /// Role of the message author (`system` or `user`).
    role: &'static str,
    /// Textual content of the message.
    content: String,
}

/// Response payload.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    /// List of candidate completions.
    choices: Vec<ChatChoice>,
}

/// A single completion choice.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    /// Message generated for the choice.
    message: ChatResponseMessage,
}

/// Response message containing the generated text.
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    /// Generated text content.
    content: String,
}

impl ChatRequest {
    fn new(model: String, prompt: &Prompt) -> Self {
        Self {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user_prompt.clone(),
                },
            ],
            temperature: 0.7,
        }
    }
}

#[async_trait]
impl GenerationProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        "OpenAI-compatible"
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let start = Instant::now();
        let request = ChatRequest::new(self.model.clone(), prompt);

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_owned());
            return Err(Error::Generation(format!(
                "chat completion error {status}: {error_text}"
            )));
        }

        let chat_response: ChatResponse = response.json().await?;
        let text = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Generation("No choices in response".to_owned()))?;

        debug!(
            "Chat completion from {} took {}ms",
            self.model,
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}
