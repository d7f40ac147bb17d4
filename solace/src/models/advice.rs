use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Emotion;

/// What caused an advice generation run.
///
/// Only count-based triggering is supported; the column exists so the
/// history stays interpretable if other triggers are ever added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    #[default]
    NoteCount,
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerType::NoteCount => write!(f, "note_count"),
        }
    }
}

impl std::str::FromStr for TriggerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "note_count" => Ok(TriggerType::NoteCount),
            other => Err(format!("Unknown trigger type: {other}")),
        }
    }
}

/// A generated advice text with provenance: how many memories and notes fed
/// the prompt and which dominant emotion framed it. Immutable after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advice {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub trigger_type: TriggerType,
    pub memories_used: u32,
    pub notes_used: u32,
    pub dominant_emotion: Emotion,
    pub created_at: DateTime<Utc>,
}

impl Advice {
    pub fn new(
        id: String,
        user_id: String,
        content: String,
        memories_used: u32,
        notes_used: u32,
        dominant_emotion: Emotion,
    ) -> Self {
        Self {
            id,
            user_id,
            content,
            trigger_type: TriggerType::NoteCount,
            memories_used,
            notes_used,
            dominant_emotion,
            created_at: Utc::now(),
        }
    }
}
