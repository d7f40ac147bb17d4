//! Note request/response DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{self, ClassificationStatus, Emotion, EmotionVector};

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/notes`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    /// The journal entry text.
    #[validate(length(min = 1, max = 20_000))]
    pub content: String,
}

/// Request body for `PATCH /v1/notes/{noteId}`.
///
/// Editing content re-queues the note for classification.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    #[validate(length(min = 1, max = 20_000))]
    pub content: String,
}

/// Query parameters for `GET /v1/notes`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListNotesQuery {
    /// Maximum results per page (default 20, max 100).
    pub limit: Option<u32>,
    /// Opaque cursor for pagination.
    pub cursor: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// Full note response, including the emotion state.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    /// Unique note ID (nanoid, 21 chars).
    pub note_id: String,
    /// The journal entry text.
    pub content: String,
    /// Classification lifecycle state.
    pub classification: ClassificationStatus,
    /// Emotion scores; absent until classification settles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotions: Option<EmotionVector>,
    /// Highest-scoring emotion label; absent until classification settles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_emotion: Option<Emotion>,
    /// When the note was created.
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    /// When the note was last updated.
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl From<models::Note> for NoteResponse {
    fn from(note: models::Note) -> Self {
        Self {
            note_id: note.id.clone(),
            dominant_emotion: note.dominant_emotion(),
            content: note.content,
            classification: note.classification,
            emotions: note.emotions,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// Note list response wrapper.
///
/// Pagination is carried by the envelope's `meta.nextCursor` / `meta.total`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListNotesResponse {
    pub notes: Vec<NoteResponse>,
}

/// Response for `DELETE /v1/notes/{noteId}`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNoteResponse {
    pub note_id: String,
    pub deleted: bool,
}
