use std::sync::Arc;

use solace::config::{DatabaseConfig, PipelineConfig};
use solace::db::{Database, DatabaseBackend, LibSqlBackend};
use solace::models::{ClassificationStatus, EmotionVector, Note};

/// Fresh in-memory database with the full schema applied.
pub async fn setup_db() -> Arc<dyn DatabaseBackend> {
    let raw_db = Database::new(&DatabaseConfig {
        url: ":memory:".to_string(),
        auth_token: None,
        local_path: None,
    })
    .await
    .expect("in-memory database");
    Arc::new(LibSqlBackend::new(raw_db))
}

pub fn pipeline_config() -> PipelineConfig {
    PipelineConfig {
        notes_per_memory: 3,
        memories_for_context: 5,
        recent_notes_for_context: 3,
        advice_note_threshold: 3,
        classify_poll_interval_secs: 1,
        advice_poll_interval_secs: 1,
        classify_batch_size: 25,
    }
}

pub async fn create_user(db: &Arc<dyn DatabaseBackend>, subject: &str) -> String {
    db.get_or_create_user(subject)
        .await
        .expect("create user")
        .id
}

/// Insert a note that has already settled with the given scores.
#[allow(dead_code)]
pub async fn insert_scored_note(
    db: &Arc<dyn DatabaseBackend>,
    user_id: &str,
    content: &str,
    emotions: EmotionVector,
) -> Note {
    let mut note = Note::new(nanoid::nanoid!(), user_id.to_string(), content.to_string());
    note.emotions = Some(emotions);
    note.classification = ClassificationStatus::Scored;
    db.create_note(&note).await.expect("insert note");
    // Keep created_at strictly increasing across inserts.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    note
}

/// Insert a note still waiting for classification.
#[allow(dead_code)]
pub async fn insert_pending_note(
    db: &Arc<dyn DatabaseBackend>,
    user_id: &str,
    content: &str,
) -> Note {
    let note = Note::new(nanoid::nanoid!(), user_id.to_string(), content.to_string());
    db.create_note(&note).await.expect("insert note");
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    note
}

#[allow(dead_code)]
pub fn joyful() -> EmotionVector {
    EmotionVector {
        joy: 0.9,
        sadness: 0.05,
        ..Default::default()
    }
}
