use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::db::DatabaseBackend;
use crate::error::Result;
use crate::models::{AdviceContext, Emotion, EmotionVector};

/// Assembles the bounded context driving advice generation: the most recent
/// memories, the most recent notes, and the current emotional state.
///
/// Recent notes are selected independently of memory boundaries — a note
/// already folded into a memory still counts as immediate context.
#[derive(Clone)]
pub struct ContextBuilder {
    db: Arc<dyn DatabaseBackend>,
    memories_for_context: u32,
    recent_notes_for_context: u32,
}

impl ContextBuilder {
    pub fn new(db: Arc<dyn DatabaseBackend>, config: &PipelineConfig) -> Self {
        Self {
            db,
            memories_for_context: config.memories_for_context,
            recent_notes_for_context: config.recent_notes_for_context,
        }
    }

    pub async fn build(&self, user_id: &str) -> Result<AdviceContext> {
        let memories = self
            .db
            .recent_memories(user_id, self.memories_for_context)
            .await?;
        let recent_notes = self
            .db
            .recent_notes(user_id, self.recent_notes_for_context)
            .await?;

        let vectors: Vec<EmotionVector> = recent_notes
            .iter()
            .map(|note| note.emotions_or_zero())
            .collect();
        let current_emotions = EmotionVector::mean(&vectors);

        let dominant_current_emotion = current_emotions
            .map(|emotions| emotions.dominant().0)
            .unwrap_or(Emotion::Neutral);

        Ok(AdviceContext {
            memories,
            recent_notes,
            current_emotions,
            dominant_current_emotion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, PipelineConfig};
    use crate::db::{Database, LibSqlBackend};
    use crate::models::{ClassificationStatus, Note};
    use nanoid::nanoid;

    async fn setup_test_db() -> Arc<dyn DatabaseBackend> {
        let raw_db = Database::new(&DatabaseConfig {
            url: ":memory:".to_string(),
            auth_token: None,
            local_path: None,
        })
        .await
        .unwrap();
        Arc::new(LibSqlBackend::new(raw_db))
    }

    fn test_pipeline_config() -> PipelineConfig {
        PipelineConfig {
            notes_per_memory: 3,
            memories_for_context: 5,
            recent_notes_for_context: 3,
            advice_note_threshold: 3,
            classify_poll_interval_secs: 5,
            advice_poll_interval_secs: 5,
            classify_batch_size: 25,
        }
    }

    async fn insert_note(
        db: &Arc<dyn DatabaseBackend>,
        user_id: &str,
        content: &str,
        emotions: Option<EmotionVector>,
    ) {
        let mut note = Note::new(nanoid!(), user_id.to_string(), content.to_string());
        if let Some(emotions) = emotions {
            note.emotions = Some(emotions);
            note.classification = ClassificationStatus::Scored;
        }
        db.create_note(&note).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    #[tokio::test]
    async fn empty_user_gets_neutral_default() {
        let db = setup_test_db().await;
        let user = db.get_or_create_user("sub-1").await.unwrap();
        let builder = ContextBuilder::new(db, &test_pipeline_config());

        let context = builder.build(&user.id).await.unwrap();
        assert!(context.is_empty());
        assert!(context.current_emotions.is_none());
        assert_eq!(context.dominant_current_emotion, Emotion::Neutral);
    }

    #[tokio::test]
    async fn recent_notes_are_newest_first_and_capped() {
        let db = setup_test_db().await;
        let user = db.get_or_create_user("sub-1").await.unwrap();
        let builder = ContextBuilder::new(db.clone(), &test_pipeline_config());

        for i in 0..5 {
            insert_note(&db, &user.id, &format!("note {i}"), None).await;
        }

        let context = builder.build(&user.id).await.unwrap();
        assert_eq!(context.recent_notes.len(), 3);
        assert_eq!(context.recent_notes[0].content, "note 4");
        assert_eq!(context.recent_notes[2].content, "note 2");
    }

    #[tokio::test]
    async fn current_emotions_average_recent_notes() {
        let db = setup_test_db().await;
        let user = db.get_or_create_user("sub-1").await.unwrap();
        let builder = ContextBuilder::new(db.clone(), &test_pipeline_config());

        let sad = EmotionVector {
            sadness: 0.9,
            ..Default::default()
        };
        let glad = EmotionVector {
            joy: 0.6,
            ..Default::default()
        };
        insert_note(&db, &user.id, "down", Some(sad)).await;
        insert_note(&db, &user.id, "up", Some(glad)).await;

        let context = builder.build(&user.id).await.unwrap();
        let emotions = context.current_emotions.expect("emotions");
        assert!((emotions.sadness - 0.45).abs() < 1e-9);
        assert!((emotions.joy - 0.3).abs() < 1e-9);
        assert_eq!(context.dominant_current_emotion, Emotion::Sadness);
    }

    #[tokio::test]
    async fn build_is_idempotent_without_writes() {
        let db = setup_test_db().await;
        let user = db.get_or_create_user("sub-1").await.unwrap();
        let builder = ContextBuilder::new(db.clone(), &test_pipeline_config());

        insert_note(
            &db,
            &user.id,
            "same",
            Some(EmotionVector {
                joy: 0.5,
                ..Default::default()
            }),
        )
        .await;

        let first = builder.build(&user.id).await.unwrap();
        let second = builder.build(&user.id).await.unwrap();

        assert_eq!(first.recent_notes.len(), second.recent_notes.len());
        assert_eq!(first.memories.len(), second.memories.len());
        assert_eq!(first.current_emotions, second.current_emotions);
        assert_eq!(
            first.dominant_current_emotion,
            second.dominant_current_emotion
        );
    }
}
