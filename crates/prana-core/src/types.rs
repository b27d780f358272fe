use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Topic an article belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleCategory {
    /// Individual poses.
    Asanas,
    /// Breathing techniques.
    Pranayama,
    /// Effects of a practice.
    Benefits,
    /// When a practice should be avoided.
    Contraindications,
    /// Material for newcomers.
    Beginner,
    /// Material for experienced practitioners.
    Advanced,
    /// Anything else.
    General,
}

impl ArticleCategory {
    /// Stable lowercase name, matching the knowledge-base encoding.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asanas => "asanas",
            Self::Pranayama => "pranayama",
            Self::Benefits => "benefits",
            Self::Contraindications => "contraindications",
            Self::Beginner => "beginner",
            Self::Advanced => "advanced",
            Self::General => "general",
        }
    }
}

impl fmt::Display for ArticleCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Intended practitioner level of an article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    /// Suitable for newcomers.
    Beginner,
    /// Requires some experience.
    Intermediate,
    /// Requires significant experience.
    Advanced,
    /// No particular level.
    #[default]
    AllLevels,
}

/// Default citation for articles that do not name one.
fn default_source() -> String {
    "Self-written".to_owned()
}

/// A knowledge-base article, the unit chunked for indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Unique article identifier
    pub article_id: String,
    /// Display title
    pub title: String,
    /// Full article body
    pub content: String,
    /// Topic
    pub category: ArticleCategory,
    /// Free-form search tags
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Citation or provenance
    #[serde(default = "default_source")]
    pub source: String,
    /// Practitioner level
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Cautions attached to the article
    #[serde(default)]
    pub safety_notes: String,
}

/// A bounded slice of an article prepared for embedding and retrieval.
///
/// Chunks inherit every descriptive field of their parent article and record
/// their position among siblings so citations can be re-assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// `{article_id}-chunk-{chunk_index}`
    pub chunk_id: String,
    /// Parent article identifier
    pub article_id: String,
    /// Parent article title
    pub title: String,
    /// Substring of the parent article content
    pub content: String,
    /// Parent article topic
    pub category: ArticleCategory,
    /// Parent article tags
    pub tags: BTreeSet<String>,
    /// Parent article citation
    pub source: String,
    /// Parent article level
    pub difficulty: Difficulty,
    /// Parent article cautions
    pub safety_notes: String,
    /// Zero-based position among siblings
    pub chunk_index: usize,
    /// Number of siblings, including this chunk
    pub total_chunks: usize,
}

impl Chunk {
    /// Build the chunk identifier for an article and ordinal.
    pub fn make_id(article_id: &str, chunk_index: usize) -> String {
        format!("{article_id}-chunk-{chunk_index}")
    }

    /// Text handed to the embedding model for this chunk.
    pub fn embedding_text(&self) -> String {
        format!("{}\n{}", self.title, self.content)
    }
}

/// System and user prompt pair sent to a generation model, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Instructions for the model
    pub system_prompt: String,
    /// Context block and the literal question
    pub user_prompt: String,
}
