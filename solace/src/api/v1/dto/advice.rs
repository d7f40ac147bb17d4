//! Advice request/response DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{self, Emotion, JobStatus, TriggerType};

/// Query parameters for `GET /v1/advice`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListAdviceQuery {
    /// Maximum results per page (default 20, max 100).
    pub limit: Option<u32>,
    /// Opaque cursor for pagination.
    pub cursor: Option<String>,
}

/// A generated advice with its provenance.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdviceResponse {
    /// Unique advice ID (nanoid, 21 chars).
    pub advice_id: String,
    /// The generated advice text.
    pub content: String,
    /// What triggered this generation run.
    pub trigger_type: TriggerType,
    /// Number of memories that fed the prompt.
    pub memories_used: u32,
    /// Number of recent notes that fed the prompt.
    pub notes_used: u32,
    /// Dominant current emotion at generation time.
    pub dominant_emotion: Emotion,
    /// When the advice was created.
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<models::Advice> for AdviceResponse {
    fn from(advice: models::Advice) -> Self {
        Self {
            advice_id: advice.id,
            content: advice.content,
            trigger_type: advice.trigger_type,
            memories_used: advice.memories_used,
            notes_used: advice.notes_used,
            dominant_emotion: advice.dominant_emotion,
            created_at: advice.created_at,
        }
    }
}

/// Advice list response wrapper.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListAdviceResponse {
    pub advice: Vec<AdviceResponse>,
}

/// Response for `GET /v1/advice/eligibility`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    /// Whether enough notes have accumulated since the last advice.
    pub eligible: bool,
    /// The note-count threshold in effect.
    pub threshold: u32,
}

/// Response for `POST /v1/advice:generate` — the polling handle.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAdviceResponse {
    /// Job ID to poll via `GET /v1/advice/jobs/{jobId}`.
    pub job_id: String,
    pub status: JobStatus,
}

/// Response for `GET /v1/advice/jobs/{jobId}`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdviceJobResponse {
    pub job_id: String,
    pub status: JobStatus,
    /// Set once the job succeeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice_id: Option<String>,
    /// Set once the job fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl From<models::AdviceJob> for AdviceJobResponse {
    fn from(job: models::AdviceJob) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            advice_id: job.advice_id,
            error: job.error,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Advice, AdviceJob};

    #[test]
    fn advice_response_serializes_camel_case() {
        let advice = Advice::new(
            "adv_1".into(),
            "user_1".into(),
            "Take a walk".into(),
            2,
            3,
            Emotion::Sadness,
        );
        let json = serde_json::to_value(AdviceResponse::from(advice)).expect("serialize");
        assert_eq!(json["adviceId"], "adv_1");
        assert_eq!(json["triggerType"], "note_count");
        assert_eq!(json["memoriesUsed"], 2);
        assert_eq!(json["notesUsed"], 3);
        assert_eq!(json["dominantEmotion"], "sadness");
    }

    #[test]
    fn job_response_omits_unset_fields() {
        let job = AdviceJob::new("user_1".into());
        let json = serde_json::to_value(AdviceJobResponse::from(job)).expect("serialize");
        assert_eq!(json["status"], "queued");
        assert!(json.get("adviceId").is_none());
        assert!(json.get("error").is_none());
    }
}
