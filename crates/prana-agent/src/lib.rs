//! Question answering over the yoga knowledge base.
//!
//! [`Assistant::ask`] screens the question, retrieves context (retrying and
//! degrading past transient model failures), prompts the generation model,
//! wraps flagged answers in safety guidance and writes a [`QueryLogRecord`].
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        reason = "Test allows"
    )
)]

mod assistant;
/// Query log records, sinks and summaries.
pub mod query_log;
mod types;

pub use assistant::Assistant;
pub use query_log::{
    JsonlQueryLog, LoggedChunk, MemoryQueryLog, QueryLogRecord, QueryLogSink, SafetyStats, recent,
    safety_stats,
};
pub use types::{AskResponse, AskSettings, SafetyInfo};
