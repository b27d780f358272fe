//! Durable record of every answered query.
//!
//! The pipeline writes one [`QueryLogRecord`] per `ask`, including failed
//! ones. Where records go is up to the [`QueryLogSink`]: a JSON-lines file
//! for the CLI, an in-memory list for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt as _;
use uuid::Uuid;

use prana_context::RetrievedChunk;
use prana_core::{Error, IgnoreLock as _, Result};

/// Longest chunk excerpt kept in a log record, in characters.
const EXCERPT_CHARS: usize = 500;

/// A retrieved chunk as stored in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedChunk {
    /// Chunk identifier
    pub chunk_id: String,
    /// Article title
    pub title: String,
    /// First 500 characters of the chunk
    pub content: String,
    /// Article provenance
    pub source: String,
    /// Rounded similarity score
    pub similarity_score: f32,
}

impl From<&RetrievedChunk> for LoggedChunk {
    fn from(retrieved: &RetrievedChunk) -> Self {
        Self {
            chunk_id: retrieved.chunk.chunk_id.clone(),
            title: retrieved.chunk.title.clone(),
            content: retrieved.chunk.content.chars().take(EXCERPT_CHARS).collect(),
            source: retrieved.chunk.source.clone(),
            similarity_score: retrieved.similarity_score,
        }
    }
}

/// One logged query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryLogRecord {
    /// Identifier returned to the caller as the query id
    pub id: Uuid,
    /// Question as asked
    pub user_query: String,
    /// Chunks used as context
    #[serde(default)]
    pub retrieved_chunks: Vec<LoggedChunk>,
    /// Final answer shown to the user
    pub ai_answer: String,
    /// Whether the query was flagged
    #[serde(default)]
    pub is_unsafe: bool,
    /// Trigger phrases that flagged the query
    #[serde(default)]
    pub safety_keywords_detected: Vec<String>,
    /// Warning shown for flagged queries, empty otherwise
    #[serde(default)]
    pub safety_warning: String,
    /// Safer alternative shown for flagged queries, empty otherwise
    #[serde(default)]
    pub safe_recommendation: String,
    /// Wall-clock time spent answering
    pub response_time_ms: u64,
    /// Caller-supplied session, empty when absent
    #[serde(default)]
    pub session_id: String,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

/// Destination for query log records.
#[async_trait]
pub trait QueryLogSink: Send + Sync {
    /// Persist one record.
    ///
    /// # Errors
    /// Returns an error if the record cannot be stored
    async fn record(&self, record: &QueryLogRecord) -> Result<()>;
}

/// Append-only JSON-lines log file.
#[derive(Debug, Clone)]
pub struct JsonlQueryLog {
    /// Log file location
    path: PathBuf,
}

impl JsonlQueryLog {
    /// Log to `path`, creating it on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record, oldest first. A missing file yields no records.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or a line cannot be parsed
    pub async fn load(&self) -> Result<Vec<QueryLogRecord>> {
        if !fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path).await?;
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(idx, line)| {
                serde_json::from_str(line).map_err(|err| {
                    Error::Other(format!(
                        "Failed to parse query log line {} in {}: {err}",
                        idx + 1,
                        self.path.display()
                    ))
                })
            })
            .collect()
    }
}

#[async_trait]
impl QueryLogSink for JsonlQueryLog {
    async fn record(&self, record: &QueryLogRecord) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// In-memory log, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryQueryLog {
    /// Records in arrival order
    records: Mutex<Vec<QueryLogRecord>>,
}

impl MemoryQueryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records.
    pub fn records(&self) -> Vec<QueryLogRecord> {
        self.records.lock_ignore_poison().clone()
    }
}

#[async_trait]
impl QueryLogSink for MemoryQueryLog {
    async fn record(&self, record: &QueryLogRecord) -> Result<()> {
        self.records.lock_ignore_poison().push(record.clone());
        Ok(())
    }
}

/// Aggregate safety figures over a set of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyStats {
    /// Number of records
    pub total_queries: usize,
    /// Records flagged as unsafe
    pub unsafe_queries: usize,
    /// Records not flagged
    pub safe_queries: usize,
    /// Share of flagged records, 0 to 100
    pub unsafe_percentage: f64,
    /// Most frequent trigger phrases, most common first, at most ten
    pub top_safety_keywords: Vec<(String, usize)>,
}

/// Summarise how often queries were flagged and by which phrases.
pub fn safety_stats(records: &[QueryLogRecord]) -> SafetyStats {
    let total_queries = records.len();
    let unsafe_queries = records.iter().filter(|record| record.is_unsafe).count();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records.iter().filter(|record| record.is_unsafe) {
        for keyword in &record.safety_keywords_detected {
            *counts.entry(keyword.as_str()).or_insert(0) += 1;
        }
    }
    let mut top_safety_keywords: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(keyword, count)| (keyword.to_owned(), count))
        .collect();
    top_safety_keywords.sort_by(|first, second| {
        second.1.cmp(&first.1).then_with(|| first.0.cmp(&second.0))
    });
    top_safety_keywords.truncate(10);

    let unsafe_percentage = if total_queries == 0 {
        0.0
    } else {
        (unsafe_queries as f64 / total_queries as f64 * 10_000.0).round() / 100.0
    };

    SafetyStats {
        total_queries,
        unsafe_queries,
        safe_queries: total_queries - unsafe_queries,
        unsafe_percentage,
        top_safety_keywords,
    }
}

/// The `limit` most recent records, newest first.
pub fn recent(records: &[QueryLogRecord], limit: usize) -> Vec<QueryLogRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|first, second| second.created_at.cmp(&first.created_at));
    sorted.truncate(limit);
    sorted
}
