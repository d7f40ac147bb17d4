use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    Advice, AdviceJob, ClassificationStatus, EmotionVector, Memory, Note, Quote, User,
};

// ---------------------------------------------------------------------------
// Individual store traits
// ---------------------------------------------------------------------------

/// Account lookup and lifecycle.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Resolve an identity provider subject to a user, creating the row on
    /// first sight.
    async fn get_or_create_user(&self, subject: &str) -> Result<User>;
    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>>;
    /// Delete a user. Notes, memories, advice, and jobs cascade.
    async fn delete_user(&self, id: &str) -> Result<bool>;
}

/// CRUD, windowed queries, and classification bookkeeping for notes.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn create_note(&self, note: &Note) -> Result<()>;
    async fn get_note_by_id(&self, id: &str) -> Result<Option<Note>>;
    async fn list_notes(&self, user_id: &str, limit: u32, offset: u32)
        -> Result<(Vec<Note>, u64)>;
    /// Replace content and reset the note to the unscored pending state.
    async fn update_note_content(&self, id: &str, content: &str) -> Result<()>;
    async fn delete_note(&self, id: &str) -> Result<bool>;

    /// Count notes created strictly after `since` (all notes when `None`).
    async fn count_notes_since(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64>;
    /// Notes created strictly after `since`, oldest first, capped at `limit`.
    async fn notes_after(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<Note>>;
    /// Most recent notes, newest first.
    async fn recent_notes(&self, user_id: &str, limit: u32) -> Result<Vec<Note>>;

    /// Pending notes whose next attempt is due, oldest first.
    async fn due_pending_notes(&self, now: DateTime<Utc>, limit: u32) -> Result<Vec<Note>>;
    /// Write all seven scores and the terminal status in one statement.
    async fn store_note_emotions(
        &self,
        id: &str,
        emotions: &EmotionVector,
        status: ClassificationStatus,
    ) -> Result<()>;
    /// Record a failed attempt and when to try again.
    async fn schedule_note_retry(
        &self,
        id: &str,
        attempts: u32,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Insert and windowed queries for memories.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    async fn create_memory(&self, memory: &Memory) -> Result<()>;
    async fn latest_memory(&self, user_id: &str) -> Result<Option<Memory>>;
    /// Most recent memories, newest first.
    async fn recent_memories(&self, user_id: &str, limit: u32) -> Result<Vec<Memory>>;
    async fn list_memories(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Memory>, u64)>;
}

/// Insert and queries for advice records.
#[async_trait]
pub trait AdviceStore: Send + Sync {
    async fn create_advice(&self, advice: &Advice) -> Result<()>;
    async fn latest_advice(&self, user_id: &str) -> Result<Option<Advice>>;
    async fn list_advice(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Advice>, u64)>;
}

/// Queue operations for async advice generation jobs.
#[async_trait]
pub trait AdviceJobStore: Send + Sync {
    async fn create_advice_job(&self, job: &AdviceJob) -> Result<()>;
    async fn get_advice_job(&self, id: &str) -> Result<Option<AdviceJob>>;
    async fn queued_advice_jobs(&self, limit: u32) -> Result<Vec<AdviceJob>>;
    /// The user's queued or running job, if any. Used to avoid enqueueing
    /// duplicate generation runs.
    async fn active_advice_job_for_user(&self, user_id: &str) -> Result<Option<AdviceJob>>;
    async fn mark_advice_job_running(&self, id: &str) -> Result<()>;
    /// Persist the advice row and mark the job succeeded in one transaction,
    /// so a crash can never leave a succeeded job without its advice.
    async fn complete_advice_job(&self, id: &str, advice: &Advice) -> Result<()>;
    async fn fail_advice_job(&self, id: &str, error: &str) -> Result<()>;
}

/// Read access to the quote pool.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    async fn random_quote(&self) -> Result<Option<Quote>>;
    async fn create_quote(&self, quote: &Quote) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Unified backend supertrait
// ---------------------------------------------------------------------------

/// A complete database backend combining all store traits plus lifecycle
/// operations.
#[async_trait]
pub trait DatabaseBackend:
    UserStore + NoteStore + MemoryStore + AdviceStore + AdviceJobStore + QuoteStore
{
    /// Sync with remote (e.g. Turso replication). No-op for local backends.
    async fn sync(&self) -> Result<()>;
}
