//! Knowledge-base loading.

use prana_core::{Article, ArticleCategory, Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Top-level knowledge-base document.
#[derive(Deserialize)]
struct KnowledgeBase {
    /// Articles in document order
    articles: Vec<Article>,
}

/// Load articles from a `{ "articles": [...] }` JSON document.
///
/// # Errors
/// Returns `KnowledgeBase` if the file cannot be read or parsed
pub fn load_knowledge_base(path: &Path) -> Result<Vec<Article>> {
    let data = fs::read_to_string(path).map_err(|error| {
        Error::KnowledgeBase(format!("Failed to read {}: {error}", path.display()))
    })?;
    let knowledge_base: KnowledgeBase = serde_json::from_str(&data).map_err(|error| {
        Error::KnowledgeBase(format!("Failed to parse {}: {error}", path.display()))
    })?;

    info!(
        "Loaded {} articles from knowledge base",
        knowledge_base.articles.len()
    );
    Ok(knowledge_base.articles)
}

/// Number of articles per category.
pub fn category_counts(articles: &[Article]) -> BTreeMap<ArticleCategory, usize> {
    let mut counts = BTreeMap::new();
    for article in articles {
        *counts.entry(article.category).or_insert(0) += 1;
    }
    counts
}
