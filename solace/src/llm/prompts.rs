//! Prompt templates for memory summarization and advice generation.
//!
//! Templates use `format!()` interpolation so missing variables fail at
//! compile time.

use crate::models::{AdviceContext, Note};

/// System role text for advice generation.
pub const ADVICE_SYSTEM_PROMPT: &str = "You are a thoughtful, supportive companion for a \
journaling app. You read short summaries of the user's recent journal entries and their \
emotional state, then offer one piece of warm, concrete, actionable advice. Speak directly \
to the user in 2-4 sentences. Never diagnose, never moralize, never mention that you are \
reading summaries.";

/// System role text for memory summarization.
pub const SUMMARY_SYSTEM_PROMPT: &str = "You condense journal entries into a short factual \
summary. Capture recurring topics and the overall emotional tone in at most 3 sentences. \
Write in third person about the writer.";

/// Generate a prompt for summarizing a batch of notes into a memory.
///
/// Each note contributes its text and its dominant emotion label (or
/// "unscored" while classification is still pending).
///
/// # Example
/// ```
/// use solace::llm::prompts::memory_summary_prompt;
/// use solace::models::Note;
///
/// let notes = vec![Note::new("n1".into(), "u1".into(), "Slept badly again".into())];
/// let prompt = memory_summary_prompt(&notes);
/// assert!(prompt.contains("Slept badly again"));
/// ```
pub fn memory_summary_prompt(notes: &[Note]) -> String {
    let entries = notes
        .iter()
        .enumerate()
        .map(|(i, note)| {
            let emotion = note
                .dominant_emotion()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unscored".to_string());
            format!("Entry {} [feeling: {}]: {}", i + 1, emotion, note.content)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Summarize the following journal entries into a short memory of this period of the \
         writer's life.\n\n{entries}\n\nSummary:"
    )
}

/// Generate the advice prompt from the assembled context.
///
/// Embeds the dominant current emotion, each memory's summary and dominant
/// emotion, and each recent note with its own dominant emotion.
pub fn advice_prompt(context: &AdviceContext) -> String {
    let mut sections = Vec::new();

    sections.push(format!(
        "The user currently seems to feel: {}.",
        context.dominant_current_emotion
    ));

    if !context.memories.is_empty() {
        let memories = context
            .memories
            .iter()
            .map(|memory| {
                let summary = if memory.summary.is_empty() {
                    "(no summary available)"
                } else {
                    memory.summary.as_str()
                };
                format!("- [{}] {}", memory.dominant_emotion, summary)
            })
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("Summaries of earlier periods:\n{memories}"));
    }

    if !context.recent_notes.is_empty() {
        let notes = context
            .recent_notes
            .iter()
            .map(|note| {
                let emotion = note
                    .dominant_emotion()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unscored".to_string());
                format!("- [{}] {}", emotion, note.content)
            })
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("Most recent journal entries:\n{notes}"));
    }

    sections.push(
        "Based on all of the above, give the user one piece of personal advice.".to_string(),
    );

    sections.join("\n\n")
}
