//! Command handlers for CLI operations

use anyhow::{Context as _, Result, bail};
use prana_agent::{AskSettings, Assistant, JsonlQueryLog, recent, safety_stats};
use prana_context::{
    EmbeddingClient, EmbeddingProvider as _, IndexBuilder, OllamaEmbeddingProvider, Retriever,
    VectorIndex,
};
use prana_core::{GenerationProvider, PranaConfig};
use prana_safety::{SafetyClassifier, safe_alternatives};
use serde::Serialize;
use serde_json::json;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Install the stderr log subscriber, keeping stdout for JSON output.
pub fn init_tracing() {
    Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "prana_context=info,prana_agent=info,prana_cli=info".into()
        }))
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .init();
}

/// Load configuration from `path`, or from `~/.prana/config.toml` when absent.
///
/// # Errors
/// Returns an error if an explicitly named file cannot be read or parsed
pub fn load_config(path: Option<PathBuf>) -> Result<PranaConfig> {
    if let Some(path) = path {
        let mut config = PranaConfig::load_from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        return Ok(config);
    }

    Ok(PranaConfig::load_or_create().unwrap_or_else(|error| {
        warn!("Failed to load config from ~/.prana/config.toml: {error}");
        warn!("Using default configuration");
        let mut config = PranaConfig::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }))
}

fn embedding_client(config: &PranaConfig) -> EmbeddingClient<OllamaEmbeddingProvider> {
    EmbeddingClient::new(OllamaEmbeddingProvider::from_config(&config.ollama))
        .with_timeout(config.timeouts.embedding())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Handle `prana build`
///
/// # Errors
/// Returns an error if the knowledge base cannot be loaded, embedded or persisted
pub async fn handle_build(config: &PranaConfig, force: bool) -> Result<()> {
    let index = VectorIndex::new(&config.rag.index_path);
    let builder = IndexBuilder::from_config(embedding_client(config), &config.rag);

    let report = builder
        .build(&index, force)
        .await
        .context("Failed to build the vector index")?;

    if report.reused_snapshot {
        info!("Existing snapshot reused; pass --force to rebuild");
    }
    print_json(&report)
}

/// Handle `prana ask`
///
/// # Errors
/// Returns an error if the question could not be answered
pub async fn handle_ask(
    config: &PranaConfig,
    question: &str,
    session: Option<&str>,
) -> Result<()> {
    let index = Arc::new(VectorIndex::new(&config.rag.index_path));
    let retriever = Retriever::new(embedding_client(config), index);
    let generator: Arc<dyn GenerationProvider> =
        Arc::from(prana_providers::from_config(config)?);

    let mut assistant = Assistant::new(retriever, generator, AskSettings::from_config(config));
    if let Some(path) = &config.log.query_log {
        assistant = assistant.with_query_log(Arc::new(JsonlQueryLog::new(path)));
    }

    let response = assistant.ask(question, session).await?;
    print_json(&response)
}

/// Handle `prana search`
///
/// # Errors
/// Returns an error if the index is not built or the query cannot be embedded
pub async fn handle_search(
    config: &PranaConfig,
    query: &str,
    top_k: Option<usize>,
    threshold: Option<f32>,
) -> Result<()> {
    let index = Arc::new(VectorIndex::new(&config.rag.index_path));
    let retriever = Retriever::new(embedding_client(config), index);

    let retrieval = retriever
        .retrieve(
            query,
            top_k.unwrap_or(config.rag.top_k),
            threshold.unwrap_or(config.rag.similarity_threshold),
        )
        .await?;
    print_json(&retrieval)
}

/// Handle `prana classify`
///
/// # Errors
/// Returns an error if the verdict cannot be serialized
pub fn handle_classify(text: &str, pose: Option<&str>) -> Result<()> {
    let verdict = SafetyClassifier::new().classify(text);
    match pose {
        Some(pose) => print_json(&json!({
            "verdict": verdict,
            "alternatives": safe_alternatives(pose),
        })),
        None => print_json(&verdict),
    }
}

/// Handle `prana status`
///
/// # Errors
/// Returns an error if the generation backend is misconfigured
pub async fn handle_status(config: &PranaConfig) -> Result<()> {
    let index = VectorIndex::new(&config.rag.index_path);
    if !index.reload() && index.snapshot_exists() {
        warn!(
            "Snapshot at {} exists but could not be loaded",
            index.snapshot_path().display()
        );
    }

    let embedder = OllamaEmbeddingProvider::from_config(&config.ollama);
    let embedding_available = embedder.ensure_model_available().await.is_ok();
    let generator = prana_providers::from_config(config)?;
    let generation_available = generator.is_available().await;

    print_json(&json!({
        "index": index.status(),
        "snapshotPath": index.snapshot_path(),
        "knowledgeBase": config.rag.knowledge_base,
        "embedding": {
            "model": embedder.model_name(),
            "available": embedding_available,
        },
        "generation": {
            "provider": generator.name(),
            "available": generation_available,
        },
        "safetyEnabled": config.safety.enabled,
    }))
}

/// Handle `prana stats`
///
/// # Errors
/// Returns an error if no query log is configured or it cannot be read
pub async fn handle_stats(config: &PranaConfig, limit: usize) -> Result<()> {
    let Some(path) = &config.log.query_log else {
        bail!("No query log configured; set `query_log` under [log] in the config file");
    };

    let records = JsonlQueryLog::new(path).load().await?;
    print_json(&json!({
        "stats": safety_stats(&records),
        "recent": recent(&records, limit),
    }))
}
