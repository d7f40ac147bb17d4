use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::connection::Database;
use crate::db::repository::{
    AdviceJobRepository, AdviceRepository, MemoryRepository, NoteRepository, QuoteRepository,
    UserRepository,
};
use crate::db::traits::{
    AdviceJobStore, AdviceStore, DatabaseBackend, MemoryStore, NoteStore, QuoteStore, UserStore,
};
use crate::error::Result;
use crate::models::{
    Advice, AdviceJob, ClassificationStatus, EmotionVector, Memory, Note, Quote, User,
};

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for LibSqlBackend {
    async fn get_or_create_user(&self, subject: &str) -> Result<User> {
        let conn = self.db.connect()?;
        UserRepository::get_or_create(&conn, subject).await
    }
    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let conn = self.db.connect()?;
        UserRepository::get_by_id(&conn, id).await
    }
    async fn delete_user(&self, id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        UserRepository::delete(&conn, id).await
    }
}

#[async_trait]
impl NoteStore for LibSqlBackend {
    async fn create_note(&self, note: &Note) -> Result<()> {
        let conn = self.db.connect()?;
        NoteRepository::create(&conn, note).await
    }
    async fn get_note_by_id(&self, id: &str) -> Result<Option<Note>> {
        let conn = self.db.connect()?;
        NoteRepository::get_by_id(&conn, id).await
    }
    async fn list_notes(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Note>, u64)> {
        let conn = self.db.connect()?;
        NoteRepository::list(&conn, user_id, limit, offset).await
    }
    async fn update_note_content(&self, id: &str, content: &str) -> Result<()> {
        let conn = self.db.connect()?;
        NoteRepository::update_content(&conn, id, content).await
    }
    async fn delete_note(&self, id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        NoteRepository::delete(&conn, id).await
    }
    async fn count_notes_since(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64> {
        let conn = self.db.connect()?;
        NoteRepository::count_since(&conn, user_id, since).await
    }
    async fn notes_after(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<Note>> {
        let conn = self.db.connect()?;
        NoteRepository::after(&conn, user_id, since, limit).await
    }
    async fn recent_notes(&self, user_id: &str, limit: u32) -> Result<Vec<Note>> {
        let conn = self.db.connect()?;
        NoteRepository::recent(&conn, user_id, limit).await
    }
    async fn due_pending_notes(&self, now: DateTime<Utc>, limit: u32) -> Result<Vec<Note>> {
        let conn = self.db.connect()?;
        NoteRepository::due_pending(&conn, now, limit).await
    }
    async fn store_note_emotions(
        &self,
        id: &str,
        emotions: &EmotionVector,
        status: ClassificationStatus,
    ) -> Result<()> {
        let conn = self.db.connect()?;
        NoteRepository::store_emotions(&conn, id, emotions, status).await
    }
    async fn schedule_note_retry(
        &self,
        id: &str,
        attempts: u32,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.db.connect()?;
        NoteRepository::schedule_retry(&conn, id, attempts, next_attempt_at).await
    }
}

#[async_trait]
impl MemoryStore for LibSqlBackend {
    async fn create_memory(&self, memory: &Memory) -> Result<()> {
        let conn = self.db.connect()?;
        MemoryRepository::create(&conn, memory).await
    }
    async fn latest_memory(&self, user_id: &str) -> Result<Option<Memory>> {
        let conn = self.db.connect()?;
        MemoryRepository::latest(&conn, user_id).await
    }
    async fn recent_memories(&self, user_id: &str, limit: u32) -> Result<Vec<Memory>> {
        let conn = self.db.connect()?;
        MemoryRepository::recent(&conn, user_id, limit).await
    }
    async fn list_memories(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Memory>, u64)> {
        let conn = self.db.connect()?;
        MemoryRepository::list(&conn, user_id, limit, offset).await
    }
}

#[async_trait]
impl AdviceStore for LibSqlBackend {
    async fn create_advice(&self, advice: &Advice) -> Result<()> {
        let conn = self.db.connect()?;
        AdviceRepository::create(&conn, advice).await
    }
    async fn latest_advice(&self, user_id: &str) -> Result<Option<Advice>> {
        let conn = self.db.connect()?;
        AdviceRepository::latest(&conn, user_id).await
    }
    async fn list_advice(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Advice>, u64)> {
        let conn = self.db.connect()?;
        AdviceRepository::list(&conn, user_id, limit, offset).await
    }
}

#[async_trait]
impl AdviceJobStore for LibSqlBackend {
    async fn create_advice_job(&self, job: &AdviceJob) -> Result<()> {
        let conn = self.db.connect()?;
        AdviceJobRepository::create(&conn, job).await
    }
    async fn get_advice_job(&self, id: &str) -> Result<Option<AdviceJob>> {
        let conn = self.db.connect()?;
        AdviceJobRepository::get_by_id(&conn, id).await
    }
    async fn queued_advice_jobs(&self, limit: u32) -> Result<Vec<AdviceJob>> {
        let conn = self.db.connect()?;
        AdviceJobRepository::queued(&conn, limit).await
    }
    async fn active_advice_job_for_user(&self, user_id: &str) -> Result<Option<AdviceJob>> {
        let conn = self.db.connect()?;
        AdviceJobRepository::active_for_user(&conn, user_id).await
    }
    async fn mark_advice_job_running(&self, id: &str) -> Result<()> {
        let conn = self.db.connect()?;
        AdviceJobRepository::mark_running(&conn, id).await
    }
    async fn complete_advice_job(&self, id: &str, advice: &Advice) -> Result<()> {
        let conn = self.db.connect()?;
        AdviceJobRepository::complete(&conn, id, advice).await
    }
    async fn fail_advice_job(&self, id: &str, error: &str) -> Result<()> {
        let conn = self.db.connect()?;
        AdviceJobRepository::fail(&conn, id, error).await
    }
}

#[async_trait]
impl QuoteStore for LibSqlBackend {
    async fn random_quote(&self) -> Result<Option<Quote>> {
        let conn = self.db.connect()?;
        QuoteRepository::random(&conn).await
    }
    async fn create_quote(&self, quote: &Quote) -> Result<()> {
        let conn = self.db.connect()?;
        QuoteRepository::create(&conn, quote).await
    }
}

#[async_trait]
impl DatabaseBackend for LibSqlBackend {
    async fn sync(&self) -> Result<()> {
        self.db.sync().await
    }
}
