use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Accounts, keyed by identity provider subject
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            subject TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );

        -- Journal entries with their emotion scores.
        -- Emotion columns stay NULL until classification settles; the
        -- classification column is the work queue for the background
        -- classifier (pending rows with next_classify_at due).
        CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            content TEXT NOT NULL,
            anger REAL,
            disgust REAL,
            fear REAL,
            joy REAL,
            neutral REAL,
            sadness REAL,
            surprise REAL,
            classification TEXT NOT NULL DEFAULT 'pending',
            classify_attempts INTEGER NOT NULL DEFAULT 0,
            next_classify_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_notes_user_created ON notes(user_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_notes_classification ON notes(classification);

        -- Batched note summaries, immutable after insert
        CREATE TABLE IF NOT EXISTS memories (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            summary TEXT NOT NULL,
            batch_size INTEGER NOT NULL,
            first_note_at TEXT NOT NULL,
            last_note_at TEXT NOT NULL,
            dominant_emotion TEXT NOT NULL,
            emotional_intensity REAL NOT NULL DEFAULT 0.0,
            theme TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_memories_user_created ON memories(user_id, created_at);

        -- Generated advice with provenance, immutable after insert
        CREATE TABLE IF NOT EXISTS advice (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            content TEXT NOT NULL,
            trigger_type TEXT NOT NULL DEFAULT 'note_count',
            memories_used INTEGER NOT NULL DEFAULT 0,
            notes_used INTEGER NOT NULL DEFAULT 0,
            dominant_emotion TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_advice_user_created ON advice(user_id, created_at);

        -- Async generation handles; the status column is the job queue
        CREATE TABLE IF NOT EXISTS advice_jobs (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'queued',
            advice_id TEXT,
            error TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (advice_id) REFERENCES advice(id)
        );

        CREATE INDEX IF NOT EXISTS idx_advice_jobs_status ON advice_jobs(status);
        CREATE INDEX IF NOT EXISTS idx_advice_jobs_user ON advice_jobs(user_id);

        -- Inspirational quotes for the public endpoint
        CREATE TABLE IF NOT EXISTS quotes (
            id TEXT PRIMARY KEY,
            content TEXT NOT NULL,
            author TEXT NOT NULL
        );
        "#,
    )
    .await?;

    Ok(())
}
