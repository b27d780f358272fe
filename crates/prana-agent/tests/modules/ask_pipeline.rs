//! Ask pipeline: grounding, safety wrapping, generation failures and logging.

use crate::fixtures::{ScriptedEmbedder, assistant, fast_settings, populated_index};
use prana_agent::{AskSettings, JsonlQueryLog, QueryLogSink};
use prana_core::Error;
use prana_providers::MockProvider;
use prana_safety::{SafetyCategory, SafetyMessage};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_safe_question_is_grounded_in_context() {
    let temp = TempDir::new().unwrap();
    let generator = MockProvider::new().with_default_response("Keep your gaze steady.");
    let (assistant, log) = assistant(
        ScriptedEmbedder::default(),
        populated_index(temp.path()),
        generator.clone(),
        fast_settings(),
    );

    let response = assistant
        .ask("How do I balance in tree pose?", Some("session-1"))
        .await
        .unwrap();

    assert_eq!(response.answer, "Keep your gaze steady.");
    assert!(!response.is_unsafe);
    assert!(response.safety_info.is_none());
    assert!(!response.degraded);
    assert_eq!(response.sources.len(), 1);
    assert_eq!(response.sources[0].chunk_id, "tree-pose-chunk-0");
    assert_eq!(response.sources[0].relevance_percent, 100);

    let prompts = generator.get_call_history();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].user_prompt.contains("[Source 1: Tree Pose]"));
    assert!(prompts[0].user_prompt.contains("User Question: How do I balance in tree pose?"));

    let records = log.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, response.query_id);
    assert_eq!(records[0].session_id, "session-1");
    assert_eq!(records[0].retrieved_chunks[0].chunk_id, "tree-pose-chunk-0");
    assert_eq!(records[0].ai_answer, "Keep your gaze steady.");
}

#[tokio::test]
async fn test_flagged_question_is_wrapped_with_priority_guidance() {
    let temp = TempDir::new().unwrap();
    let generator = MockProvider::new().with_default_response("Try gentle side stretches.");
    let (assistant, log) = assistant(
        ScriptedEmbedder::default(),
        populated_index(temp.path()),
        generator.clone(),
        fast_settings(),
    );

    let response = assistant
        .ask("I am pregnant and have arthritis, is tree pose ok?", None)
        .await
        .unwrap();

    let pregnancy = SafetyMessage::for_category(SafetyCategory::Pregnancy);
    assert!(response.is_unsafe);
    assert_eq!(response.answer, pregnancy.wrap_answer("Try gentle side stretches."));

    let info = response.safety_info.unwrap();
    assert_eq!(info.warning, pregnancy.warning);
    assert_eq!(info.detected_keywords, vec!["pregnant", "arthritis"]);
    assert!(info.detected_categories.contains(&SafetyCategory::Musculoskeletal));

    let prompts = generator.get_call_history();
    assert!(prompts[0].system_prompt.contains("flagged for safety concerns"));

    let record = &log.records()[0];
    assert!(record.is_unsafe);
    assert_eq!(record.safety_warning, pregnancy.warning);
    assert_eq!(record.safe_recommendation, pregnancy.recommendation);
    assert_eq!(record.session_id, "");
}

#[tokio::test]
async fn test_safety_can_be_disabled() {
    let temp = TempDir::new().unwrap();
    let settings = AskSettings {
        safety_enabled: false,
        ..fast_settings()
    };
    let (assistant, _log) = assistant(
        ScriptedEmbedder::default(),
        populated_index(temp.path()),
        MockProvider::new().with_default_response("ok"),
        settings,
    );

    let response = assistant.ask("I am pregnant", None).await.unwrap();
    assert!(!response.is_unsafe);
    assert_eq!(response.answer, "ok");
}

#[tokio::test]
async fn test_generation_failure_is_logged_and_returned() {
    let temp = TempDir::new().unwrap();
    let (assistant, log) = assistant(
        ScriptedEmbedder::default(),
        populated_index(temp.path()),
        MockProvider::new().with_failure("model offline"),
        fast_settings(),
    );

    let result = assistant.ask("How long should I hold tree pose?", Some("s")).await;
    assert!(matches!(result, Err(Error::Generation(_))));

    let records = log.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].ai_answer, "Error processing query");
    assert!(!records[0].is_unsafe);
    assert_eq!(records[0].session_id, "s");
}

#[tokio::test]
async fn test_flagged_question_falls_back_to_guidance_when_generation_fails() {
    let temp = TempDir::new().unwrap();
    let (assistant, _log) = assistant(
        ScriptedEmbedder::default(),
        populated_index(temp.path()),
        MockProvider::new().with_failure("model offline"),
        fast_settings(),
    );

    let response = assistant
        .ask("Can I do headstands with glaucoma?", None)
        .await
        .unwrap();
    let eyes = SafetyMessage::for_category(SafetyCategory::EyeConditions);
    assert!(response.answer.starts_with(eyes.warning));
    assert!(response.answer.contains("**General Information (for educational purposes only):**"));
    assert!(response.answer.ends_with("your query mentioned: glaucoma*"));
}

#[tokio::test]
async fn test_slow_generation_times_out() {
    let temp = TempDir::new().unwrap();
    let settings = AskSettings {
        generation_timeout: Duration::from_millis(20),
        ..fast_settings()
    };
    let (assistant, log) = assistant(
        ScriptedEmbedder::default(),
        populated_index(temp.path()),
        MockProvider::new().with_delay(Duration::from_millis(500)),
        settings,
    );

    let result = assistant.ask("What is tree pose?", None).await;
    assert!(matches!(result, Err(Error::Timeout { after_ms: 20, .. })));
    assert_eq!(log.records()[0].ai_answer, "Error processing query");
}

#[tokio::test]
async fn test_query_log_failure_is_not_fatal() {
    let temp = TempDir::new().unwrap();
    // A directory cannot be opened for appending
    let sink: Arc<dyn QueryLogSink> = Arc::new(JsonlQueryLog::new(temp.path()));
    let (assistant, _log) = assistant(
        ScriptedEmbedder::default(),
        populated_index(temp.path()),
        MockProvider::new().with_default_response("fine"),
        fast_settings(),
    );
    let assistant = assistant.with_query_log(sink);

    let response = assistant.ask("What is tree pose?", None).await.unwrap();
    assert_eq!(response.answer, "fine");
}

#[tokio::test]
async fn test_jsonl_log_receives_records() {
    let temp = TempDir::new().unwrap();
    let jsonl = JsonlQueryLog::new(temp.path().join("queries.jsonl"));
    let (assistant, _log) = assistant(
        ScriptedEmbedder::default(),
        populated_index(temp.path()),
        MockProvider::new().with_default_response("fine"),
        fast_settings(),
    );
    let assistant = assistant.with_query_log(Arc::new(jsonl.clone()));

    let first = assistant.ask("What is tree pose?", None).await.unwrap();
    assistant.ask("Breathing for calm?", None).await.unwrap();

    let records = jsonl.load().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, first.query_id);
    assert_eq!(records[1].retrieved_chunks[0].chunk_id, "ujjayi-chunk-0");
}
