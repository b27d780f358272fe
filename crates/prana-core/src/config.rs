//! Configuration types for model endpoints, retrieval, safety and timeouts.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete prana configuration.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PranaConfig {
    /// Ollama endpoint and model names
    pub ollama: OllamaConfig,
    /// Which generation backend answers questions
    pub generation: GenerationConfig,
    /// Retrieval and chunking parameters
    pub rag: RagConfig,
    /// Safety screening switches
    pub safety: SafetyConfig,
    /// Deadlines for network-bound model calls
    pub timeouts: TimeoutConfig,
    /// Retry policy for model calls on the query path
    pub retry: RetryConfig,
    /// Query log destination
    pub log: LogConfig,
}

/// Ollama endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Scheme and host, without the port
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Chat model used for answers
    pub chat_model: String,
    /// Embedding model used for chunks and queries
    pub embedding_model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".to_owned(),
            port: 11434,
            chat_model: "llama3.2".to_owned(),
            embedding_model: "nomic-embed-text".to_owned(),
        }
    }
}

/// Generation backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationBackend {
    /// Local Ollama chat endpoint
    #[default]
    Ollama,
    /// Any service exposing an OpenAI-style `/chat/completions` route
    OpenaiCompatible,
}

/// Generation backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Which backend to use
    pub backend: GenerationBackend,
    /// Base URL for the OpenAI-compatible backend
    pub base_url: String,
    /// Model for the OpenAI-compatible backend
    pub model: String,
    /// API key for the OpenAI-compatible backend, falls back to `PRANA_API_KEY`
    pub api_key: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: GenerationBackend::Ollama,
            base_url: "https://api.groq.com/openai/v1".to_owned(),
            model: "llama-3.1-8b-instant".to_owned(),
            api_key: None,
        }
    }
}

/// Retrieval and chunking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Maximum number of chunks returned per query
    pub top_k: usize,
    /// Minimum cosine similarity for a chunk to be returned
    pub similarity_threshold: f32,
    /// Target chunk length in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
    /// Preferred break string when cutting chunks
    pub separator: String,
    /// Knowledge base JSON document
    pub knowledge_base: PathBuf,
    /// Vector index snapshot location
    pub index_path: PathBuf,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: 0.7,
            chunk_size: 500,
            chunk_overlap: 50,
            separator: "\n".to_owned(),
            knowledge_base: PathBuf::from("data/knowledge_base/articles.json"),
            index_path: PathBuf::from("data/vector_index.json"),
        }
    }
}

/// Safety screening configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Whether queries are screened at all
    pub enabled: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Deadlines for model calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-call embedding deadline in seconds
    pub embedding_secs: u64,
    /// Per-call generation deadline in seconds
    pub generation_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            embedding_secs: 30,
            generation_secs: 120,
        }
    }
}

impl TimeoutConfig {
    /// Embedding deadline.
    pub fn embedding(&self) -> Duration {
        Duration::from_secs(self.embedding_secs)
    }

    /// Generation deadline.
    pub fn generation(&self) -> Duration {
        Duration::from_secs(self.generation_secs)
    }
}

/// Retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt, doubled afterwards
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 250,
        }
    }
}

impl RetryConfig {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1_u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

/// Query log configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// JSON-lines file receiving one record per answered query
    pub query_log: Option<PathBuf>,
}

impl PranaConfig {
    /// Get the default config directory path (`~/.prana`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_owned()))?;
        Ok(home.join(".prana"))
    }

    /// Get the default config file path (`~/.prana/config.toml`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from the default location, creating it with defaults when absent.
    ///
    /// Environment overrides are applied after the file is read.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read or created
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let config = Self::default();
            config.save_to_file(&config_path)?;
            config
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|error| Error::Config(format!("Failed to read config: {error}")))?;
        let config: Self = toml::from_str(&contents)?;

        tracing::debug!(
            "Loaded config from {}: embedding_model={}, chat_model={}",
            path.display(),
            config.ollama.embedding_model,
            config.ollama.chat_model
        );

        Ok(config)
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                Error::Config(format!("Failed to create config directory: {error}"))
            })?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|error| Error::Config(format!("Failed to serialize config: {error}")))?;

        let header = "# Prana Configuration File\n\
                      # This file is automatically generated on first run\n\
                      # Edit this file to customize your settings\n\n";

        fs::write(path, format!("{header}{contents}"))?;
        Ok(())
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("OLLAMA_HOST") {
            self.ollama.host = host;
        }
        if let Some(port) = lookup("OLLAMA_PORT") {
            match port.parse() {
                Ok(port) => self.ollama.port = port,
                Err(error) => tracing::warn!("Ignoring OLLAMA_PORT={port}: {error}"),
            }
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.ollama.chat_model = model;
        }
        if let Some(model) = lookup("OLLAMA_EMBEDDING_MODEL") {
            self.ollama.embedding_model = model;
        }
        if let Some(path) = lookup("PRANA_INDEX_PATH") {
            self.rag.index_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("PRANA_KNOWLEDGE_BASE") {
            self.rag.knowledge_base = PathBuf::from(path);
        }
        if self.generation.api_key.is_none() {
            self.generation.api_key = lookup("PRANA_API_KEY");
        }
    }
}
