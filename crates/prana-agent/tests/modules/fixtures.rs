//! Shared fixtures: scripted embedders and a two-chunk index.

use prana_agent::{AskSettings, Assistant, MemoryQueryLog};
use prana_context::{
    Embedding, EmbeddingClient, EmbeddingProvider, Retriever, StagedIndex, VectorIndex,
};
use prana_core::config::RetryConfig;
use prana_core::{ArticleCategory, Chunk, Difficulty, Error, Result};
use prana_providers::MockProvider;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Embeds any text mentioning "breath" along the second axis, everything else along the first.
#[derive(Clone, Default)]
pub struct ScriptedEmbedder {
    /// Calls that fail before the embedder starts answering
    pub failures_before_success: usize,
    /// Length of returned vectors, two when zero
    pub dimension: usize,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedEmbedder {
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures_before_success: failures,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for ScriptedEmbedder {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn ensure_model_available(&self) -> Result<()> {
        Ok(())
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures_before_success {
            return Err(Error::EmbeddingUnavailable("connection refused".to_owned()));
        }
        let dimension = if self.dimension == 0 { 2 } else { self.dimension };
        let mut vector = vec![0.0; dimension];
        if text.to_lowercase().contains("breath") {
            vector[1] = 1.0;
        } else {
            vector[0] = 1.0;
        }
        Ok(vector)
    }
}

fn chunk(article_id: &str, title: &str, content: &str) -> Chunk {
    Chunk {
        chunk_id: Chunk::make_id(article_id, 0),
        article_id: article_id.to_owned(),
        title: title.to_owned(),
        content: content.to_owned(),
        category: ArticleCategory::Asanas,
        tags: Default::default(),
        source: "Self-written".to_owned(),
        difficulty: Difficulty::Beginner,
        safety_notes: String::new(),
        chunk_index: 0,
        total_chunks: 1,
    }
}

/// Index holding a pose chunk on the first axis and a breathing chunk on the second.
pub fn populated_index(dir: &Path) -> Arc<VectorIndex> {
    let index = Arc::new(VectorIndex::new(dir.join("index.json")));
    let mut staged = StagedIndex::new(2);
    staged
        .add(
            "tree-pose-chunk-0".to_owned(),
            vec![1.0, 0.0],
            chunk("tree-pose", "Tree Pose", "Balance on one leg with the sole on the inner thigh."),
        )
        .unwrap();
    staged
        .add(
            "ujjayi-chunk-0".to_owned(),
            vec![0.0, 1.0],
            chunk("ujjayi", "Ujjayi Breath", "Breathe through the nose with a soft ocean sound."),
        )
        .unwrap();
    index.swap_in(staged);
    index
}

pub fn fast_settings() -> AskSettings {
    AskSettings {
        top_k: 5,
        similarity_threshold: 0.5,
        safety_enabled: true,
        generation_timeout: Duration::from_secs(5),
        retry: RetryConfig {
            max_attempts: 3,
            backoff_ms: 1,
        },
    }
}

pub fn assistant(
    embedder: ScriptedEmbedder,
    index: Arc<VectorIndex>,
    generator: MockProvider,
    settings: AskSettings,
) -> (Assistant<ScriptedEmbedder>, Arc<MemoryQueryLog>) {
    let log = Arc::new(MemoryQueryLog::new());
    let retriever = Retriever::new(EmbeddingClient::new(embedder), index);
    let assistant = Assistant::new(retriever, Arc::new(generator), settings)
        .with_query_log(Arc::clone(&log) as Arc<dyn prana_agent::QueryLogSink>);
    (assistant, log)
}
