//! Context block and prompt templates for the generation model.

use super::RetrievedChunk;
use prana_core::Prompt;

/// Separator placed between sources in the context block.
const SOURCE_SEPARATOR: &str = "\n\n---\n\n";

const SYSTEM_PROMPT: &str = "You are a knowledgeable yoga instructor and wellness expert.
Use the provided context to answer questions accurately about yoga poses, breathing techniques,
meditation practices, and general wellness.

Guidelines:
1. Base your answers primarily on the provided context
2. If the context doesn't contain relevant information, you may draw on general yoga knowledge
3. Always prioritize user safety
4. Recommend consulting healthcare professionals for medical concerns
5. Be clear about difficulty levels and contraindications
6. Keep responses helpful and encouraging";

const SAFETY_ADDENDUM: &str = "

IMPORTANT: This query has been flagged for safety concerns.
Include appropriate warnings and suggest consulting a healthcare provider or certified yoga therapist.
Do not provide medical advice or specific instructions for medical conditions.";

/// Render chunks as numbered sources, best match first.
///
/// Each chunk becomes `[Source N: <title>]\n<content>`; sources are joined by
/// a blank line, a `---` line and another blank line. No chunks yields `""`.
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(idx, retrieved)| {
            format!(
                "[Source {}: {}]\n{}",
                idx + 1,
                retrieved.chunk.title,
                retrieved.chunk.content
            )
        })
        .collect::<Vec<_>>()
        .join(SOURCE_SEPARATOR)
}

/// Build the system and user prompts for a question.
///
/// The context section is omitted entirely when nothing was retrieved.
pub fn build_prompt(query: &str, chunks: &[RetrievedChunk], is_unsafe: bool) -> Prompt {
    let mut system_prompt = SYSTEM_PROMPT.to_owned();
    if is_unsafe {
        system_prompt.push_str(SAFETY_ADDENDUM);
    }

    let context = build_context(chunks);
    let user_prompt = if context.is_empty() {
        format!(
            "User Question: {query}\n\nPlease provide a helpful, accurate, and safe response based on your yoga knowledge."
        )
    } else {
        format!(
            "Context from yoga knowledge base:\n\n{context}\n\n---\n\nUser Question: {query}\n\nPlease provide a helpful, accurate, and safe response based on the context above."
        )
    };

    Prompt {
        system_prompt,
        user_prompt,
    }
}
