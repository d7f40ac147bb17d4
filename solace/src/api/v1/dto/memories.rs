//! Memory response DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{self, Emotion};

/// Query parameters for `GET /v1/memories`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListMemoriesQuery {
    /// Maximum results per page (default 20, max 100).
    pub limit: Option<u32>,
    /// Opaque cursor for pagination.
    pub cursor: Option<String>,
}

/// A summarized batch of notes.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemoryResponse {
    /// Unique memory ID (nanoid, 21 chars).
    pub memory_id: String,
    /// Batch summary; empty when summarization was unavailable.
    pub summary: String,
    /// Number of notes folded into this memory.
    pub batch_size: u32,
    /// Creation time of the oldest note in the batch.
    #[schema(value_type = String)]
    pub first_note_at: DateTime<Utc>,
    /// Creation time of the newest note in the batch.
    #[schema(value_type = String)]
    pub last_note_at: DateTime<Utc>,
    /// Dominant emotion of the batch average.
    pub dominant_emotion: Emotion,
    /// Score of the dominant emotion, 0..1.
    pub emotional_intensity: f64,
    /// Optional extracted theme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<models::Memory> for MemoryResponse {
    fn from(memory: models::Memory) -> Self {
        Self {
            memory_id: memory.id,
            summary: memory.summary,
            batch_size: memory.batch_size,
            first_note_at: memory.first_note_at,
            last_note_at: memory.last_note_at,
            dominant_emotion: memory.dominant_emotion,
            emotional_intensity: memory.emotional_intensity,
            theme: memory.theme,
            created_at: memory.created_at,
        }
    }
}

/// Memory list response wrapper.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMemoriesResponse {
    pub memories: Vec<MemoryResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Memory;

    #[test]
    fn memory_response_serializes_camel_case() {
        let memory = Memory::new(
            "mem_1".into(),
            "user_1".into(),
            "A calm week".into(),
            3,
            Utc::now(),
            Utc::now(),
            Emotion::Neutral,
            0.44,
        );
        let json = serde_json::to_value(MemoryResponse::from(memory)).expect("serialize");
        assert_eq!(json["memoryId"], "mem_1");
        assert_eq!(json["batchSize"], 3);
        assert_eq!(json["dominantEmotion"], "neutral");
        assert_eq!(json["emotionalIntensity"], 0.44);
        assert!(json.get("theme").is_none());
    }
}
