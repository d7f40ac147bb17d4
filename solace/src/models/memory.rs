use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Emotion;

/// A compressed summary of a contiguous, chronologically ordered batch of
/// notes, plus the batch's dominant emotion. Immutable after insert.
///
/// Batches never overlap and never leave gaps: the notes behind a memory
/// are exactly those created after the previous memory, oldest first,
/// capped at the batch threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub user_id: String,
    /// Best-effort LLM summary; empty string when summarization failed.
    pub summary: String,
    pub batch_size: u32,
    pub first_note_at: DateTime<Utc>,
    pub last_note_at: DateTime<Utc>,
    pub dominant_emotion: Emotion,
    /// Score of the dominant emotion in the batch average, 0..1.
    pub emotional_intensity: f64,
    pub theme: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Memory {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        user_id: String,
        summary: String,
        batch_size: u32,
        first_note_at: DateTime<Utc>,
        last_note_at: DateTime<Utc>,
        dominant_emotion: Emotion,
        emotional_intensity: f64,
    ) -> Self {
        Self {
            id,
            user_id,
            summary,
            batch_size,
            first_note_at,
            last_note_at,
            dominant_emotion,
            emotional_intensity,
            theme: None,
            created_at: Utc::now(),
        }
    }
}
