use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use crate::classifier::{ClassifierProvider, ClassifyOutcome};
use crate::config::PipelineConfig;
use crate::db::DatabaseBackend;
use crate::error::Result;
use crate::llm::LlmProvider;
use crate::models::{AdviceJob, ClassificationStatus, EmotionVector, Note};

use super::eligibility::EligibilityGate;

/// Background manager that settles pending notes into a terminal emotion
/// state.
///
/// The notes table is the work queue: pending rows whose `next_classify_at`
/// is due get one classification attempt per pass. Transient failures are
/// re-queued with a fixed delay (cooperative backoff, no blocking sleep);
/// permanent failures and exhausted retries fall back to the neutral
/// vector, so every note ends fully scored.
///
/// When a note settles, the eligibility gate is consulted and, if the
/// user's note count since their last advice has reached the threshold, an
/// advice generation job is queued (at most one in flight per user).
#[derive(Clone)]
pub struct ClassificationManager {
    db: Arc<dyn DatabaseBackend>,
    classifier: ClassifierProvider,
    llm: LlmProvider,
    gate: EligibilityGate,
    interval_secs: u64,
    batch_size: u32,
}

impl ClassificationManager {
    pub fn new(
        db: Arc<dyn DatabaseBackend>,
        classifier: ClassifierProvider,
        llm: LlmProvider,
        config: &PipelineConfig,
    ) -> Self {
        let gate = EligibilityGate::new(db.clone(), config);
        Self {
            db,
            classifier,
            llm,
            gate,
            interval_secs: config.classify_poll_interval_secs,
            batch_size: config.classify_batch_size,
        }
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    /// Run a single pass over due pending notes. Per-note errors are logged
    /// and skipped. Returns the number of notes that reached a terminal
    /// state this pass.
    pub async fn run_once(&self) -> Result<u64> {
        let due = self.db.due_pending_notes(Utc::now(), self.batch_size).await?;

        if due.is_empty() {
            return Ok(0);
        }

        debug!(count = due.len(), "Classifying pending notes");

        let mut settled = 0u64;
        for note in &due {
            match self.classify_note(note).await {
                Ok(true) => {
                    settled += 1;
                    self.maybe_queue_advice(&note.user_id).await;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        note_id = note.id.as_str(),
                        error = %e,
                        "Failed to process pending note, will retry next pass"
                    );
                }
            }
        }

        Ok(settled)
    }

    /// Queue an advice generation run once the note count since the last
    /// advice reaches the threshold. Never more than one job in flight per
    /// user; failures here never disturb classification.
    async fn maybe_queue_advice(&self, user_id: &str) {
        if !self.llm.is_available() {
            return;
        }
        if !self.gate.is_eligible(user_id).await {
            return;
        }

        match self.db.active_advice_job_for_user(user_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                let job = AdviceJob::new(user_id.to_string());
                match self.db.create_advice_job(&job).await {
                    Ok(()) => {
                        debug!(user_id, job_id = job.id.as_str(), "Queued advice generation")
                    }
                    Err(e) => warn!(user_id, error = %e, "Failed to queue advice generation"),
                }
            }
            Err(e) => warn!(user_id, error = %e, "Failed to check for active advice job"),
        }
    }

    /// One classification attempt for one note. `Ok(true)` when the note
    /// reached a terminal state, `Ok(false)` when it was re-queued.
    async fn classify_note(&self, note: &Note) -> Result<bool> {
        match self.classifier.classify(&note.content).await {
            ClassifyOutcome::Scored(emotions) => {
                self.db
                    .store_note_emotions(&note.id, &emotions, ClassificationStatus::Scored)
                    .await?;
                debug!(note_id = note.id.as_str(), "Note scored");
                Ok(true)
            }
            ClassifyOutcome::Retry(reason) => {
                let attempts = note.classify_attempts + 1;
                if attempts > self.classifier.max_retries() {
                    warn!(
                        note_id = note.id.as_str(),
                        attempts,
                        reason = reason.as_str(),
                        "Classification retries exhausted, storing neutral fallback"
                    );
                    self.store_fallback(&note.id).await?;
                    Ok(true)
                } else {
                    let next_attempt_at = Utc::now()
                        + Duration::seconds(self.classifier.retry_delay_secs() as i64);
                    debug!(
                        note_id = note.id.as_str(),
                        attempts,
                        reason = reason.as_str(),
                        "Transient classification failure, re-queued"
                    );
                    self.db
                        .schedule_note_retry(&note.id, attempts, next_attempt_at)
                        .await?;
                    Ok(false)
                }
            }
            ClassifyOutcome::Failed(reason) => {
                warn!(
                    note_id = note.id.as_str(),
                    reason = reason.as_str(),
                    "Permanent classification failure, storing neutral fallback"
                );
                self.store_fallback(&note.id).await?;
                Ok(true)
            }
        }
    }

    async fn store_fallback(&self, note_id: &str) -> Result<()> {
        self.db
            .store_note_emotions(
                note_id,
                &EmotionVector::neutral_fallback(),
                ClassificationStatus::Fallback,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::{Database, LibSqlBackend};
    use crate::models::Emotion;
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

    async fn insert_pending_note(db: &Arc<dyn DatabaseBackend>, user_id: &str, content: &str) -> Note {
        let note = Note::new(nanoid!(), user_id.to_string(), content.to_string());
        db.create_note(&note).await.unwrap();
        note
    }

    #[tokio::test]
    async fn run_once_with_no_pending_notes_is_a_noop() {
        let db = setup_test_db().await;
        let manager = ClassificationManager::new(
            db,
            ClassifierProvider::unavailable("test"),
            LlmProvider::unavailable("test"),
            &test_pipeline_config(),
        );
        assert_eq!(manager.run_once().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unavailable_classifier_settles_notes_to_fallback() {
        let db = setup_test_db().await;
        let user = db.get_or_create_user("sub-1").await.unwrap();
        let note = insert_pending_note(&db, &user.id, "hello world").await;

        let manager = ClassificationManager::new(
            db.clone(),
            ClassifierProvider::unavailable("no api key"),
            LlmProvider::unavailable("test"),
            &test_pipeline_config(),
        );

        assert_eq!(manager.run_once().await.unwrap(), 1);

        let settled = db.get_note_by_id(&note.id).await.unwrap().expect("note");
        assert_eq!(settled.classification, ClassificationStatus::Fallback);
        let emotions = settled.emotions.expect("emotions populated");
        assert_eq!(emotions.neutral, 1.0);
        assert_eq!(emotions.dominant().0, Emotion::Neutral);
        for emotion in Emotion::ALL {
            let score = emotions.get(emotion);
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[tokio::test]
    async fn settled_notes_are_not_reprocessed() {
        let db = setup_test_db().await;
        let user = db.get_or_create_user("sub-1").await.unwrap();
        insert_pending_note(&db, &user.id, "hello world").await;

        let manager = ClassificationManager::new(
            db.clone(),
            ClassifierProvider::unavailable("no api key"),
            LlmProvider::unavailable("test"),
            &test_pipeline_config(),
        );

        assert_eq!(manager.run_once().await.unwrap(), 1);
        assert_eq!(manager.run_once().await.unwrap(), 0);
    }

    fn generation_capable_llm() -> LlmProvider {
        LlmProvider::new(Some(&crate::config::LlmConfig {
            model: "ollama/llama3".to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 1,
            max_retries: 0,
            temperature: 0.7,
            max_tokens: 200,
        }))
    }

    #[tokio::test]
    async fn eligible_user_gets_one_advice_job_queued() {
        let db = setup_test_db().await;
        let user = db.get_or_create_user("sub-1").await.unwrap();
        for i in 0..3 {
            insert_pending_note(&db, &user.id, &format!("note {i}")).await;
        }

        let manager = ClassificationManager::new(
            db.clone(),
            ClassifierProvider::unavailable("no api key"),
            generation_capable_llm(),
            &test_pipeline_config(),
        );

        assert_eq!(manager.run_once().await.unwrap(), 3);

        // The threshold tripped during the pass, but only one job may be
        // in flight for the user.
        let queued = db.queued_advice_jobs(10).await.unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].user_id, user.id);
    }

    #[tokio::test]
    async fn no_advice_job_without_configured_llm() {
        let db = setup_test_db().await;
        let user = db.get_or_create_user("sub-1").await.unwrap();
        for i in 0..3 {
            insert_pending_note(&db, &user.id, &format!("note {i}")).await;
        }

        let manager = ClassificationManager::new(
            db.clone(),
            ClassifierProvider::unavailable("no api key"),
            LlmProvider::unavailable("test"),
            &test_pipeline_config(),
        );

        assert_eq!(manager.run_once().await.unwrap(), 3);
        assert!(db.queued_advice_jobs(10).await.unwrap().is_empty());
    }
}
