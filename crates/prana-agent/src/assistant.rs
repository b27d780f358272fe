//! The ask pipeline: screen, retrieve, generate, wrap, log.

use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};
use uuid::Uuid;

use crate::query_log::{LoggedChunk, QueryLogRecord, QueryLogSink};
use crate::types::{AskResponse, AskSettings, SafetyInfo};
use chrono::Utc;
use prana_context::{
    EmbeddingProvider, Retrieval, Retriever, SearchBackend, VectorIndex, build_prompt,
};
use prana_core::{Error, GenerationProvider, Prompt, Result};
use prana_safety::{SafetyClassifier, SafetyVerdict, compose_safe_response};

/// Answer recorded when a query fails.
const FAILED_ANSWER: &str = "Error processing query";

/// What the pipeline produced before logging.
struct Answered {
    /// Final answer text
    answer: String,
    /// Context used, empty when degraded
    retrieval: Retrieval,
    /// Whether retrieval was skipped
    degraded: bool,
}

/// Answers wellness questions from the knowledge base.
pub struct Assistant<P: EmbeddingProvider, S: SearchBackend = VectorIndex> {
    /// Query embedding and index search
    retriever: Retriever<P, S>,
    /// Text-generation model
    generator: Arc<dyn GenerationProvider>,
    /// Keyword screening
    classifier: SafetyClassifier,
    /// Where answered queries are recorded
    query_log: Option<Arc<dyn QueryLogSink>>,
    /// Pipeline tunables
    settings: AskSettings,
}

impl<P: EmbeddingProvider, S: SearchBackend> Assistant<P, S> {
    /// Create an assistant without a query log.
    pub fn new(
        retriever: Retriever<P, S>,
        generator: Arc<dyn GenerationProvider>,
        settings: AskSettings,
    ) -> Self {
        Self {
            retriever,
            generator,
            classifier: SafetyClassifier::new(),
            query_log: None,
            settings,
        }
    }

    /// Record every query to `sink`.
    #[must_use]
    pub fn with_query_log(mut self, sink: Arc<dyn QueryLogSink>) -> Self {
        self.query_log = Some(sink);
        self
    }

    /// Retrieval half of the pipeline.
    pub fn retriever(&self) -> &Retriever<P, S> {
        &self.retriever
    }

    /// Pipeline tunables.
    pub fn settings(&self) -> &AskSettings {
        &self.settings
    }

    /// Screen a question, honouring the safety switch.
    pub fn screen(&self, question: &str) -> SafetyVerdict {
        if self.settings.safety_enabled {
            self.classifier.classify(question)
        } else {
            SafetyVerdict::safe()
        }
    }

    /// Answer one question.
    ///
    /// Retrieval failures the pipeline can live without fall back to
    /// generation without context. Flagged questions are answered from the
    /// canned guidance if generation fails. Every outcome, including
    /// failures, is written to the query log.
    ///
    /// # Errors
    /// Returns retrieval errors that cannot be degraded past (such as
    /// `DimensionMismatch`) and generation errors for unflagged questions
    pub async fn ask(&self, question: &str, session_id: Option<&str>) -> Result<AskResponse> {
        let started = Instant::now();
        let query_id = Uuid::new_v4();
        let verdict = self.screen(question);
        let safety_info = SafetyInfo::from_verdict(&verdict);
        let safety_warning = safety_info
            .as_ref()
            .map(|info| info.warning.clone())
            .unwrap_or_default();
        let safe_recommendation = safety_info
            .as_ref()
            .map(|info| info.recommendation.clone())
            .unwrap_or_default();

        let answered = match self.answer(question, &verdict).await {
            Ok(answered) => answered,
            Err(error) => {
                warn!("Error processing query: {error}");
                self.log(QueryLogRecord {
                    id: query_id,
                    user_query: question.to_owned(),
                    retrieved_chunks: Vec::new(),
                    ai_answer: FAILED_ANSWER.to_owned(),
                    is_unsafe: verdict.is_unsafe,
                    safety_keywords_detected: verdict.matched_keywords.clone(),
                    safety_warning,
                    safe_recommendation,
                    response_time_ms: elapsed_ms(started),
                    session_id: session_id.unwrap_or_default().to_owned(),
                    created_at: Utc::now(),
                })
                .await;
                return Err(error);
            }
        };

        let response_time_ms = elapsed_ms(started);

        self.log(QueryLogRecord {
            id: query_id,
            user_query: question.to_owned(),
            retrieved_chunks: answered
                .retrieval
                .chunks
                .iter()
                .map(LoggedChunk::from)
                .collect(),
            ai_answer: answered.answer.clone(),
            is_unsafe: verdict.is_unsafe,
            safety_keywords_detected: verdict.matched_keywords.clone(),
            safety_warning,
            safe_recommendation,
            response_time_ms,
            session_id: session_id.unwrap_or_default().to_owned(),
            created_at: Utc::now(),
        })
        .await;

        info!(
            "Answered query {query_id} in {response_time_ms}ms ({} sources, unsafe: {})",
            answered.retrieval.sources.len(),
            verdict.is_unsafe
        );

        Ok(AskResponse {
            query_id,
            answer: answered.answer,
            sources: answered.retrieval.sources,
            is_unsafe: verdict.is_unsafe,
            safety_info,
            degraded: answered.degraded,
            response_time_ms,
        })
    }

    async fn answer(&self, question: &str, verdict: &SafetyVerdict) -> Result<Answered> {
        let (retrieval, degraded) = match self.retrieve_with_retry(question).await? {
            Some(retrieval) => (retrieval, false),
            None => (Retrieval::default(), true),
        };

        let prompt = build_prompt(question, &retrieval.chunks, verdict.is_unsafe);
        let answer = match (self.generate(&prompt).await, verdict.message) {
            (Ok(text), Some(message)) => message.wrap_answer(&text),
            (Ok(text), None) => text,
            (Err(error), Some(_)) => {
                warn!(
                    "Generation failed for flagged query, answering with safety guidance: {error}"
                );
                compose_safe_response(verdict, &retrieval.context_block)
            }
            (Err(error), None) => return Err(error),
        };

        Ok(Answered {
            answer,
            retrieval,
            degraded,
        })
    }

    /// Retrieve context, retrying transient failures.
    ///
    /// Returns `None` when retrieval should be skipped.
    async fn retrieve_with_retry(&self, question: &str) -> Result<Option<Retrieval>> {
        let max_attempts = self.settings.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self
                .retriever
                .retrieve(
                    question,
                    self.settings.top_k,
                    self.settings.similarity_threshold,
                )
                .await
            {
                Ok(retrieval) => return Ok(Some(retrieval)),
                Err(error) if error.is_retryable() && attempt < max_attempts => {
                    let backoff = self.settings.retry.backoff_for(attempt);
                    warn!(
                        "Retrieval attempt {attempt}/{max_attempts} failed: {error}; retrying in {}ms",
                        backoff.as_millis()
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(error) if error.is_degradable() => {
                    if matches!(error, Error::IndexNotReady(_)) {
                        warn!(
                            "Answering without context: {error}. Run `prana build` to index the knowledge base"
                        );
                    } else {
                        warn!("Answering without context after {attempt} attempt(s): {error}");
                    }
                    return Ok(None);
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Call the generation model under the configured deadline.
    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let deadline = self.settings.generation_timeout;
        timeout(deadline, self.generator.generate(prompt))
            .await
            .map_err(|_| Error::Timeout {
                operation: format!("generation with {}", self.generator.name()),
                after_ms: deadline.as_millis() as u64,
            })?
    }

    /// Write a record, warning instead of failing.
    async fn log(&self, record: QueryLogRecord) {
        if let Some(sink) = &self.query_log
            && let Err(error) = sink.record(&record).await
        {
            warn!("Failed to write query log: {error}");
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
