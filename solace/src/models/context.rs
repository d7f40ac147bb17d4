use serde::{Deserialize, Serialize};

use super::{Emotion, EmotionVector, Memory, Note};

/// The bounded context fed into advice generation: the most recent memories,
/// the most recent notes (which may overlap notes already folded into a
/// memory), and the current emotional state derived from those notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceContext {
    /// Newest-first, capped at the configured context size.
    pub memories: Vec<Memory>,
    /// Newest-first, independent of memory boundaries.
    pub recent_notes: Vec<Note>,
    /// Per-emotion average over `recent_notes`; `None` when no notes exist.
    pub current_emotions: Option<EmotionVector>,
    /// Argmax of `current_emotions`, `Neutral` when no notes exist.
    pub dominant_current_emotion: Emotion,
}

impl AdviceContext {
    pub fn is_empty(&self) -> bool {
        self.memories.is_empty() && self.recent_notes.is_empty()
    }
}
