use std::sync::Arc;

use nanoid::nanoid;
use tracing::{debug, error, info, warn};

use crate::config::PipelineConfig;
use crate::db::DatabaseBackend;
use crate::error::{Result, SolaceError};
use crate::llm::{prompts, LlmProvider};
use crate::models::{Advice, AdviceContext, JobStatus};

use super::context::ContextBuilder;
use super::locks::UserLocks;
use super::memory::MemoryService;

/// Generates and persists advice from a user's accumulated context.
///
/// A run holds the user's advisory lock for its whole read -> decide ->
/// write sequence; memory batching inside the run sees a consistent note
/// stream and two runs can never consume the same batch.
#[derive(Clone)]
pub struct AdviceService {
    db: Arc<dyn DatabaseBackend>,
    llm: LlmProvider,
    memory: MemoryService,
    context: ContextBuilder,
    locks: UserLocks,
}

impl AdviceService {
    pub fn new(
        db: Arc<dyn DatabaseBackend>,
        llm: LlmProvider,
        config: &PipelineConfig,
        locks: UserLocks,
    ) -> Self {
        let memory = MemoryService::new(db.clone(), llm.clone(), config);
        let context = ContextBuilder::new(db.clone(), config);
        Self {
            db,
            llm,
            memory,
            context,
            locks,
        }
    }

    /// Produce the advice for a user without persisting it; the caller
    /// decides how the row is committed (directly, or atomically with its
    /// job record).
    async fn build_advice(&self, user_id: &str) -> Result<Advice> {
        if !self.llm.is_available() {
            return Err(SolaceError::LlmUnavailable(
                "Advice generation requires a configured LLM".to_string(),
            ));
        }

        let _guard = self.locks.lock(user_id).await;

        // Close any full note batch first so the freshest memory is part
        // of the generation context.
        if self.memory.should_create_memory(user_id).await? {
            match self.memory.create_memory(user_id).await {
                Ok(Some(memory)) => {
                    debug!(user_id, memory_id = memory.id.as_str(), "Batch closed before advice run")
                }
                Ok(None) => {}
                Err(e) => return Err(e),
            }
        }

        let context = self.context.build(user_id).await?;
        if context.is_empty() {
            return Err(SolaceError::NoContext);
        }

        let content = self.complete_advice(&context).await?;

        Ok(Advice::new(
            nanoid!(),
            user_id.to_string(),
            content,
            context.memories.len() as u32,
            context.recent_notes.len() as u32,
            context.dominant_current_emotion,
        ))
    }

    /// Generate and persist advice for a user.
    pub async fn generate(&self, user_id: &str) -> Result<Advice> {
        let advice = self.build_advice(user_id).await?;
        self.db.create_advice(&advice).await?;

        info!(
            user_id,
            advice_id = advice.id.as_str(),
            memories_used = advice.memories_used,
            notes_used = advice.notes_used,
            dominant = %advice.dominant_emotion,
            "Generated advice"
        );

        Ok(advice)
    }

    /// Generate advice for a queued job; the advice row and the job's
    /// succeeded status commit in one transaction.
    pub async fn generate_for_job(&self, job_id: &str, user_id: &str) -> Result<Advice> {
        let advice = self.build_advice(user_id).await?;
        self.db.complete_advice_job(job_id, &advice).await?;

        info!(
            user_id,
            job_id,
            advice_id = advice.id.as_str(),
            "Generated advice for job"
        );

        Ok(advice)
    }

    async fn complete_advice(&self, context: &AdviceContext) -> Result<String> {
        let prompt = prompts::advice_prompt(context);
        let options = self.llm.default_options();

        let content = self
            .llm
            .complete(&prompt, Some(prompts::ADVICE_SYSTEM_PROMPT), Some(&options))
            .await?;

        Ok(content.trim().to_string())
    }
}

/// Background manager draining the advice job queue.
///
/// Jobs are claimed oldest first; a failed run marks the job failed with
/// the error string and never leaves a partial advice row behind.
#[derive(Clone)]
pub struct AdviceJobManager {
    db: Arc<dyn DatabaseBackend>,
    advice: AdviceService,
    interval_secs: u64,
}

impl AdviceJobManager {
    pub fn new(db: Arc<dyn DatabaseBackend>, advice: AdviceService, config: &PipelineConfig) -> Self {
        Self {
            db,
            advice,
            interval_secs: config.advice_poll_interval_secs,
        }
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    /// Run a single pass over queued jobs. Returns the number of jobs that
    /// finished (succeeded or failed).
    pub async fn run_once(&self) -> Result<u64> {
        let queued = self.db.queued_advice_jobs(10).await?;

        if queued.is_empty() {
            return Ok(0);
        }

        let mut finished = 0u64;
        for job in &queued {
            if job.status != JobStatus::Queued {
                continue;
            }

            self.db.mark_advice_job_running(&job.id).await?;

            match self.advice.generate_for_job(&job.id, &job.user_id).await {
                Ok(_) => finished += 1,
                Err(e) => {
                    warn!(
                        job_id = job.id.as_str(),
                        user_id = job.user_id.as_str(),
                        error = %e,
                        "Advice generation failed"
                    );
                    if let Err(mark_err) = self.db.fail_advice_job(&job.id, &e.to_string()).await {
                        error!(
                            job_id = job.id.as_str(),
                            error = %mark_err,
                            "Failed to record advice job failure"
                        );
                    } else {
                        finished += 1;
                    }
                }
            }
        }

        Ok(finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, LlmConfig, PipelineConfig};
    use crate::db::{Database, LibSqlBackend};
    use crate::models::{AdviceJob, ClassificationStatus, EmotionVector, Note};

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

    /// An available LLM that is never reached because preconditions fail
    /// first (no API calls are made in these tests).
    fn configured_llm() -> LlmProvider {
        LlmProvider::new(Some(&LlmConfig {
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
    async fn generate_without_llm_is_unavailable() {
        let db = setup_test_db().await;
        let user = db.get_or_create_user("sub-1").await.unwrap();
        let service = AdviceService::new(
            db,
            LlmProvider::unavailable("no model"),
            &test_pipeline_config(),
            UserLocks::new(),
        );

        let result = service.generate(&user.id).await;
        assert!(matches!(result, Err(SolaceError::LlmUnavailable(_))));
    }

    #[tokio::test]
    async fn generate_with_no_context_fails_and_writes_nothing() {
        let db = setup_test_db().await;
        let user = db.get_or_create_user("sub-1").await.unwrap();
        let service = AdviceService::new(
            db.clone(),
            configured_llm(),
            &test_pipeline_config(),
            UserLocks::new(),
        );

        let result = service.generate(&user.id).await;
        assert!(matches!(result, Err(SolaceError::NoContext)));

        let (advice, total) = db.list_advice(&user.id, 10, 0).await.unwrap();
        assert!(advice.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn failed_job_records_error_and_no_advice() {
        let db = setup_test_db().await;
        let user = db.get_or_create_user("sub-1").await.unwrap();

        // One scored note: context is non-empty, so the run reaches the
        // generation call, which fails against the unreachable local
        // backend and must leave no advice row behind.
        let mut note = Note::new(nanoid!(), user.id.clone(), "hello".to_string());
        note.emotions = Some(EmotionVector {
            joy: 0.9,
            ..Default::default()
        });
        note.classification = ClassificationStatus::Scored;
        db.create_note(&note).await.unwrap();

        let job = AdviceJob::new(user.id.clone());
        db.create_advice_job(&job).await.unwrap();

        let service = AdviceService::new(
            db.clone(),
            configured_llm(),
            &test_pipeline_config(),
            UserLocks::new(),
        );
        let manager = AdviceJobManager::new(db.clone(), service, &test_pipeline_config());

        assert_eq!(manager.run_once().await.unwrap(), 1);

        let finished = db.get_advice_job(&job.id).await.unwrap().expect("job");
        assert_eq!(finished.status, JobStatus::Failed);
        assert!(finished.error.is_some());
        assert!(finished.advice_id.is_none());

        let (advice, _) = db.list_advice(&user.id, 10, 0).await.unwrap();
        assert!(advice.is_empty());
    }

    #[tokio::test]
    async fn job_queue_drains_oldest_first() {
        let db = setup_test_db().await;
        let user = db.get_or_create_user("sub-1").await.unwrap();

        let first = AdviceJob::new(user.id.clone());
        db.create_advice_job(&first).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = AdviceJob::new(user.id.clone());
        db.create_advice_job(&second).await.unwrap();

        let queued = db.queued_advice_jobs(10).await.unwrap();
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0].id, first.id);
        assert_eq!(queued[1].id, second.id);
    }
}
