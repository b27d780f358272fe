use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;
use uuid::Uuid;

use prana_context::SourceCitation;
use prana_core::PranaConfig;
use prana_core::config::RetryConfig;
use prana_safety::{SafetyCategory, SafetyVerdict};

/// Safety details attached to a flagged answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyInfo {
    /// Why the query is risky
    pub warning: String,
    /// Safer practice to suggest
    pub recommendation: String,
    /// Who to consult
    pub disclaimer: String,
    /// Every matched trigger phrase
    pub detected_keywords: Vec<String>,
    /// Every matched category
    pub detected_categories: BTreeSet<SafetyCategory>,
}

impl SafetyInfo {
    /// Safety details for a flagged verdict, `None` for a safe one.
    pub fn from_verdict(verdict: &SafetyVerdict) -> Option<Self> {
        let message = verdict.message.filter(|_| verdict.is_unsafe)?;
        Some(Self {
            warning: message.warning.to_owned(),
            recommendation: message.recommendation.to_owned(),
            disclaimer: message.disclaimer.to_owned(),
            detected_keywords: verdict.matched_keywords.clone(),
            detected_categories: verdict.matched_categories.clone(),
        })
    }
}

/// Answer payload returned for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    /// Identifier of the query log record
    pub query_id: Uuid,
    /// Final answer, wrapped with safety guidance when flagged
    pub answer: String,
    /// Citations for the context used
    pub sources: Vec<SourceCitation>,
    /// Whether the query was flagged
    pub is_unsafe: bool,
    /// Safety details for flagged queries
    pub safety_info: Option<SafetyInfo>,
    /// Whether retrieval was skipped because the index or embedding model was unavailable
    pub degraded: bool,
    /// Wall-clock time spent answering
    pub response_time_ms: u64,
}

/// Tunables for the ask pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AskSettings {
    /// Maximum chunks retrieved per question
    pub top_k: usize,
    /// Minimum similarity for a chunk to be used
    pub similarity_threshold: f32,
    /// Whether questions are screened
    pub safety_enabled: bool,
    /// Deadline for the generation call
    pub generation_timeout: Duration,
    /// Retry policy for retrieval
    pub retry: RetryConfig,
}

impl Default for AskSettings {
    fn default() -> Self {
        Self::from_config(&PranaConfig::default())
    }
}

impl AskSettings {
    /// Settings taken from the loaded configuration.
    pub fn from_config(config: &PranaConfig) -> Self {
        Self {
            top_k: config.rag.top_k,
            similarity_threshold: config.rag.similarity_threshold,
            safety_enabled: config.safety.enabled,
            generation_timeout: config.timeouts.generation(),
            retry: config.retry.clone(),
        }
    }
}
