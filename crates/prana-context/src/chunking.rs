//! Overlapping character-window chunking for knowledge-base articles.
//!
//! Windows are measured in characters, not bytes, so multi-byte text never
//! splits inside a code point. Each window prefers to end on the configured
//! break string, then on a sentence terminator, and only then at the raw
//! window boundary. Consecutive chunks share `overlap` characters.

use prana_core::config::RagConfig;
use prana_core::{Article, Chunk, Error, Result};
use tracing::info;

/// Terminator tried when the preferred break does not occur in the window.
const SENTENCE_BREAK: &str = ". ";

/// Chunking parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Window length in characters
    pub target_size: usize,
    /// Characters repeated at the start of the following chunk
    pub overlap: usize,
    /// Preferred cut point
    pub break_preference: String,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            target_size: 500,
            overlap: 50,
            break_preference: "\n".to_owned(),
        }
    }
}

impl From<&RagConfig> for ChunkConfig {
    fn from(config: &RagConfig) -> Self {
        Self {
            target_size: config.chunk_size,
            overlap: config.chunk_overlap,
            break_preference: config.separator.clone(),
        }
    }
}

impl ChunkConfig {
    /// Check that the parameters yield a terminating split.
    ///
    /// # Errors
    /// Returns `InvalidChunkConfig` when the window is empty, the overlap is not
    /// smaller than the window, or the break string is empty
    pub fn validate(&self) -> Result<()> {
        if self.target_size == 0 {
            return Err(Error::InvalidChunkConfig(
                "target size must be greater than zero".to_owned(),
            ));
        }
        if self.overlap >= self.target_size {
            return Err(Error::InvalidChunkConfig(format!(
                "overlap ({}) must be smaller than target size ({})",
                self.overlap, self.target_size
            )));
        }
        if self.break_preference.is_empty() {
            return Err(Error::InvalidChunkConfig(
                "break preference must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Split text into trimmed, non-empty, overlapping chunks.
///
/// # Errors
/// Returns `InvalidChunkConfig` if the configuration is invalid
pub fn chunk(text: &str, config: &ChunkConfig) -> Result<Vec<String>> {
    config.validate()?;

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    if total <= config.target_size {
        let trimmed = text.trim();
        return Ok(if trimmed.is_empty() {
            Vec::default()
        } else {
            vec![trimmed.to_owned()]
        });
    }

    let preferred: Vec<char> = config.break_preference.chars().collect();
    let sentence: Vec<char> = SENTENCE_BREAK.chars().collect();
    let half = config.target_size / 2;

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let window_end = start + config.target_size;
        let end = if window_end >= total {
            total
        } else {
            find_break(&chars, &preferred, start + half, window_end)
                .or_else(|| find_break(&chars, &sentence, start + half, window_end))
                .unwrap_or(window_end)
        };

        let piece: String = chars[start..end].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_owned());
        }

        if end >= total {
            break;
        }

        // A break close to the window midpoint with a large overlap would move
        // the cursor backwards; fall back to a zero-overlap step there.
        let overlapped = end.saturating_sub(config.overlap);
        start = if overlapped > start { overlapped } else { end };
    }

    Ok(chunks)
}

/// Cut position just past the last `needle` that starts after `floor` and ends by `limit`.
fn find_break(chars: &[char], needle: &[char], floor: usize, limit: usize) -> Option<usize> {
    let last_start = limit.checked_sub(needle.len())?;
    (floor + 1..=last_start)
        .rev()
        .find(|&pos| chars[pos..pos + needle.len()] == *needle)
        .map(|pos| pos + needle.len())
}

/// Chunk one article, copying its metadata onto every chunk.
///
/// # Errors
/// Returns `InvalidChunkConfig` if the configuration is invalid
pub fn chunk_article(article: &Article, config: &ChunkConfig) -> Result<Vec<Chunk>> {
    let pieces = chunk(&article.content, config)?;
    let total_chunks = pieces.len();

    Ok(pieces
        .into_iter()
        .enumerate()
        .map(|(chunk_index, content)| Chunk {
            chunk_id: Chunk::make_id(&article.article_id, chunk_index),
            article_id: article.article_id.clone(),
            title: article.title.clone(),
            content,
            category: article.category,
            tags: article.tags.clone(),
            source: article.source.clone(),
            difficulty: article.difficulty,
            safety_notes: article.safety_notes.clone(),
            chunk_index,
            total_chunks,
        })
        .collect())
}

/// Chunk every article in order.
///
/// # Errors
/// Returns `InvalidChunkConfig` if the configuration is invalid
pub fn chunk_all(articles: &[Article], config: &ChunkConfig) -> Result<Vec<Chunk>> {
    let mut all_chunks = Vec::new();
    for article in articles {
        all_chunks.extend(chunk_article(article, config)?);
    }

    info!(
        "Chunked {} articles into {} chunks",
        articles.len(),
        all_chunks.len()
    );
    Ok(all_chunks)
}
