use std::sync::Arc;

use nanoid::nanoid;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::db::DatabaseBackend;
use crate::error::Result;
use crate::llm::{prompts, LlmProvider};
use crate::models::{EmotionVector, Memory, Note};

/// Batches notes into immutable memory summaries.
///
/// A memory always closes over a full batch: exactly `notes_per_memory`
/// notes created after the previous memory, oldest first. Summarization is
/// best-effort; batch accounting never blocks on it.
#[derive(Clone)]
pub struct MemoryService {
    db: Arc<dyn DatabaseBackend>,
    llm: LlmProvider,
    notes_per_memory: u32,
}

impl MemoryService {
    pub fn new(db: Arc<dyn DatabaseBackend>, llm: LlmProvider, config: &PipelineConfig) -> Self {
        Self {
            db,
            llm,
            notes_per_memory: config.notes_per_memory,
        }
    }

    /// True iff enough un-summarized notes have accumulated for a full batch.
    pub async fn should_create_memory(&self, user_id: &str) -> Result<bool> {
        let since = self
            .db
            .latest_memory(user_id)
            .await?
            .map(|memory| memory.created_at);

        let count = self.db.count_notes_since(user_id, since).await?;
        Ok(count >= self.notes_per_memory as u64)
    }

    /// The oldest-first slice of un-summarized notes, capped at the batch size.
    pub async fn notes_for_next_memory(&self, user_id: &str) -> Result<Vec<Note>> {
        let since = self
            .db
            .latest_memory(user_id)
            .await?
            .map(|memory| memory.created_at);

        self.db
            .notes_after(user_id, since, self.notes_per_memory)
            .await
    }

    /// Close the next batch into a memory. Returns `None` without writing
    /// anything when fewer than a full batch is available.
    pub async fn create_memory(&self, user_id: &str) -> Result<Option<Memory>> {
        let notes = self.notes_for_next_memory(user_id).await?;

        if (notes.len() as u32) < self.notes_per_memory {
            return Ok(None);
        }
        let (Some(first), Some(last)) = (notes.first(), notes.last()) else {
            return Ok(None);
        };
        let (first_note_at, last_note_at) = (first.created_at, last.created_at);

        let summary = self.summarize_batch(user_id, &notes).await;
        let (dominant_emotion, intensity) = batch_dominant_emotion(&notes);

        let memory = Memory::new(
            nanoid!(),
            user_id.to_string(),
            summary,
            notes.len() as u32,
            first_note_at,
            last_note_at,
            dominant_emotion,
            intensity,
        );

        self.db.create_memory(&memory).await?;

        info!(
            user_id,
            memory_id = memory.id.as_str(),
            dominant = %memory.dominant_emotion,
            batch_size = memory.batch_size,
            "Created memory from note batch"
        );

        Ok(Some(memory))
    }

    /// Best-effort batch summary; empty string when generation is
    /// unavailable or fails.
    async fn summarize_batch(&self, user_id: &str, notes: &[Note]) -> String {
        if !self.llm.is_available() {
            debug!(user_id, "LLM unavailable, storing memory without summary");
            return String::new();
        }

        let prompt = prompts::memory_summary_prompt(notes);
        let options = self.llm.default_options();

        match self
            .llm
            .complete(&prompt, Some(prompts::SUMMARY_SYSTEM_PROMPT), Some(&options))
            .await
        {
            Ok(summary) => summary.trim().to_string(),
            Err(e) => {
                warn!(user_id, error = %e, "Failed to summarize note batch, storing empty summary");
                String::new()
            }
        }
    }
}

/// Average the per-emotion scores across the batch and take the argmax.
/// Unscored notes contribute zero vectors; ties resolve in enumeration order.
fn batch_dominant_emotion(notes: &[Note]) -> (crate::models::Emotion, f64) {
    let vectors: Vec<EmotionVector> = notes.iter().map(|note| note.emotions_or_zero()).collect();
    EmotionVector::mean(&vectors)
        .unwrap_or_default()
        .dominant()
}
