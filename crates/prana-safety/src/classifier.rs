//! Keyword classification of free-text queries.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

use crate::{SafetyCategory, SafetyMessage};

/// Outcome of screening one query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyVerdict {
    /// Whether any trigger phrase matched
    pub is_unsafe: bool,
    /// Matched phrases, deduplicated, in detection order
    pub matched_keywords: Vec<String>,
    /// Every matched category
    pub matched_categories: BTreeSet<SafetyCategory>,
    /// Guidance of the highest-priority matched category
    pub message: Option<SafetyMessage>,
}

impl SafetyVerdict {
    /// Verdict for a query with nothing to flag.
    pub fn safe() -> Self {
        Self::default()
    }
}

/// Screens queries against the built-in category keyword tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyClassifier;

impl SafetyClassifier {
    /// Create a classifier.
    pub const fn new() -> Self {
        Self
    }

    /// Classify a query. Never fails; empty input is safe.
    pub fn classify(&self, query: &str) -> SafetyVerdict {
        if query.trim().is_empty() {
            return SafetyVerdict::safe();
        }

        let lowered = query.to_lowercase();
        let mut matched_keywords: Vec<String> = Vec::new();
        let mut matched_categories = BTreeSet::new();

        for category in SafetyCategory::ALL {
            for keyword in category.keywords() {
                if lowered.contains(keyword) {
                    matched_categories.insert(category);
                    if !matched_keywords.iter().any(|seen| seen == keyword) {
                        matched_keywords.push((*keyword).to_owned());
                    }
                }
            }
        }

        if matched_categories.is_empty() {
            return SafetyVerdict::safe();
        }

        info!(
            "Query flagged for safety: categories [{}], keywords [{}]",
            matched_categories
                .iter()
                .map(|category| category.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            matched_keywords.join(", ")
        );

        let message = SafetyMessage::select(&matched_categories);
        SafetyVerdict {
            is_unsafe: true,
            matched_keywords,
            matched_categories,
            message: Some(message),
        }
    }
}

/// Self-contained cautious answer for a flagged query, optionally quoting
/// retrieved context as general information.
pub fn compose_safe_response(verdict: &SafetyVerdict, context: &str) -> String {
    let message = verdict.message.unwrap_or(SafetyMessage::GENERIC);
    let mut response = format!("{}\n\n", message.warning);

    if !context.is_empty() {
        response.push_str("**General Information (for educational purposes only):**\n");
        response.push_str(
            "Based on general yoga knowledge, here's some context that might be helpful:\n\n",
        );
        response.push_str(context);
        response.push_str("\n\n---\n\n");
    }

    response.push_str(&format!(
        "**Safe Alternatives:**\n{}\n\n**Important Notice:**\n{}\n\n---\n",
        message.recommendation, message.disclaimer
    ));
    response.push_str(&format!(
        "*This response has been flagged for safety because your query mentioned: {}*",
        verdict.matched_keywords.join(", ")
    ));
    response
}
