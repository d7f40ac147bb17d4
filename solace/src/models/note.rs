use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Emotion, EmotionVector};

/// Where a note stands in the classification lifecycle.
///
/// `Pending` notes carry no emotion vector yet. Once a note reaches
/// `Scored` or `Fallback` it is terminal: all seven scores are populated
/// and are only ever rewritten by an explicit content edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationStatus {
    #[default]
    Pending,
    Scored,
    Fallback,
}

impl std::fmt::Display for ClassificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClassificationStatus::Pending => "pending",
            ClassificationStatus::Scored => "scored",
            ClassificationStatus::Fallback => "fallback",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ClassificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ClassificationStatus::Pending),
            "scored" => Ok(ClassificationStatus::Scored),
            "fallback" => Ok(ClassificationStatus::Fallback),
            other => Err(format!("Unknown classification status: {other}")),
        }
    }
}

/// A user-submitted journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub user_id: String,
    pub content: String,
    /// Populated once classification settles; `None` while pending.
    pub emotions: Option<EmotionVector>,
    pub classification: ClassificationStatus,
    pub classify_attempts: u32,
    /// Cooperative-backoff due time for the next classification attempt.
    pub next_classify_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(id: String, user_id: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            content,
            emotions: None,
            classification: ClassificationStatus::Pending,
            classify_attempts: 0,
            next_classify_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Dominant emotion of this note, or `None` while unclassified.
    pub fn dominant_emotion(&self) -> Option<Emotion> {
        self.emotions.map(|v| v.dominant().0)
    }

    /// Emotion vector used when aggregating this note into a batch.
    /// Unscored notes contribute zeros.
    pub fn emotions_or_zero(&self) -> EmotionVector {
        self.emotions.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_note_starts_pending_and_unscored() {
        let note = Note::new("note_1".into(), "user_1".into(), "hello".into());
        assert_eq!(note.classification, ClassificationStatus::Pending);
        assert!(note.emotions.is_none());
        assert!(note.dominant_emotion().is_none());
        assert_eq!(note.classify_attempts, 0);
    }

    #[test]
    fn classification_status_round_trips() {
        for status in [
            ClassificationStatus::Pending,
            ClassificationStatus::Scored,
            ClassificationStatus::Fallback,
        ] {
            let parsed: ClassificationStatus = status.to_string().parse().expect("parse");
            assert_eq!(parsed, status);
        }
    }
}
