//! Retrieval retries and graceful degradation.

use crate::fixtures::{ScriptedEmbedder, assistant, fast_settings, populated_index};
use prana_agent::safety_stats;
use prana_context::VectorIndex;
use prana_core::Error;
use prana_providers::MockProvider;
use prana_safety::{SafetyCategory, SafetyMessage};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_transient_embedding_failure_is_retried() {
    let temp = TempDir::new().unwrap();
    let embedder = ScriptedEmbedder::failing_first(2);
    let (assistant, _log) = assistant(
        embedder.clone(),
        populated_index(temp.path()),
        MockProvider::new().with_default_response("answer"),
        fast_settings(),
    );

    let response = assistant.ask("Tell me about ujjayi breath", None).await.unwrap();
    assert!(!response.degraded);
    assert_eq!(embedder.call_count(), 3);
    assert_eq!(response.sources[0].chunk_id, "ujjayi-chunk-0");
}

#[tokio::test]
async fn test_exhausted_retries_degrade_to_generation_without_context() {
    let temp = TempDir::new().unwrap();
    let embedder = ScriptedEmbedder::failing_first(usize::MAX);
    let generator = MockProvider::new().with_default_response("general answer");
    let (assistant, log) = assistant(
        embedder.clone(),
        populated_index(temp.path()),
        generator.clone(),
        fast_settings(),
    );

    let response = assistant.ask("What is tree pose?", None).await.unwrap();
    assert!(response.degraded);
    assert!(response.sources.is_empty());
    assert_eq!(response.answer, "general answer");
    assert_eq!(embedder.call_count(), 3);

    let prompt = &generator.get_call_history()[0];
    assert!(!prompt.user_prompt.contains("Context from"));
    assert!(log.records()[0].retrieved_chunks.is_empty());
}

#[tokio::test]
async fn test_unbuilt_index_degrades_without_retrying() {
    let temp = TempDir::new().unwrap();
    let embedder = ScriptedEmbedder::default();
    let empty = Arc::new(VectorIndex::new(temp.path().join("missing.json")));
    let (assistant, _log) = assistant(
        embedder.clone(),
        empty,
        MockProvider::new().with_default_response("general answer"),
        fast_settings(),
    );

    let response = assistant.ask("What is tree pose?", None).await.unwrap();
    assert!(response.degraded);
    assert_eq!(embedder.call_count(), 0, "no embedding before the index is ready");
}

#[tokio::test]
async fn test_dimension_mismatch_is_not_degraded() {
    let temp = TempDir::new().unwrap();
    let embedder = ScriptedEmbedder {
        dimension: 3,
        ..ScriptedEmbedder::default()
    };
    let generator = MockProvider::new();
    let (assistant, log) = assistant(
        embedder.clone(),
        populated_index(temp.path()),
        generator.clone(),
        fast_settings(),
    );

    let result = assistant.ask("What is tree pose?", None).await;
    assert!(matches!(
        result,
        Err(Error::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    ));
    assert_eq!(embedder.call_count(), 1, "contract violations are never retried");
    assert_eq!(generator.call_count(), 0);
    assert_eq!(log.records()[0].ai_answer, "Error processing query");
}

#[tokio::test]
async fn test_failed_flagged_query_keeps_safety_fields_in_log() {
    let temp = TempDir::new().unwrap();
    let embedder = ScriptedEmbedder {
        dimension: 3,
        ..ScriptedEmbedder::default()
    };
    let (assistant, log) = assistant(
        embedder,
        populated_index(temp.path()),
        MockProvider::new(),
        fast_settings(),
    );

    let result = assistant.ask("Is tree pose fine with glaucoma?", None).await;
    assert!(matches!(result, Err(Error::DimensionMismatch { .. })));

    let records = log.records();
    let record = &records[0];
    let eyes = SafetyMessage::for_category(SafetyCategory::EyeConditions);
    assert_eq!(record.ai_answer, "Error processing query");
    assert!(record.is_unsafe);
    assert_eq!(record.safety_keywords_detected, vec!["glaucoma"]);
    assert_eq!(record.safety_warning, eyes.warning);
    assert_eq!(record.safe_recommendation, eyes.recommendation);
    assert_eq!(safety_stats(&records).unsafe_queries, 1);
}
