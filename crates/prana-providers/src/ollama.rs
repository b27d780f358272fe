use async_trait::async_trait;
use ollama_rs::Ollama;
use ollama_rs::generation::chat::ChatMessage;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use prana_core::config::OllamaConfig;
use prana_core::{Error, GenerationProvider, Prompt, Result};
use tracing::debug;

/// Chat model served by a local or remote Ollama instance.
pub struct OllamaProvider {
    /// Ollama client
    ollama: Ollama,
    /// Chat model name
    model: String,
}

impl OllamaProvider {
    /// Creates a provider for the given endpoint and model.
    pub fn new(host: &str, port: u16, model: impl Into<String>) -> Self {
        Self {
            ollama: Ollama::new(host.to_owned(), port),
            model: model.into(),
        }
    }

    /// Creates a provider from the `[ollama]` configuration section.
    pub fn from_config(config: &OllamaConfig) -> Self {
        Self::new(&config.host, config.port, config.chat_model.clone())
    }

    /// Chat model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerationProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    async fn is_available(&self) -> bool {
        match self.ollama.list_local_models().await {
            Ok(models) => models.iter().any(|model| model.name.contains(&self.model)),
            Err(error) => {
                debug!("Ollama unavailable: {error}");
                false
            }
        }
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let messages = vec![
            ChatMessage::system(prompt.system_prompt.clone()),
            ChatMessage::user(prompt.user_prompt.clone()),
        ];
        let request = ChatMessageRequest::new(self.model.clone(), messages);

        let response = self
            .ollama
            .send_chat_messages(request)
            .await
            .map_err(|err| Error::Generation(format!("Ollama request failed: {err}")))?;

        Ok(response.message.content)
    }
}
