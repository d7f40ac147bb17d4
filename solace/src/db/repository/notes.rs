use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{ClassificationStatus, EmotionVector, Note};

const NOTE_COLUMNS: &str = "id, user_id, content, anger, disgust, fear, joy, neutral, sadness, \
                            surprise, classification, classify_attempts, next_classify_at, \
                            created_at, updated_at";

pub struct NoteRepository;

impl NoteRepository {
    pub async fn create(conn: &Connection, note: &Note) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO notes (
                id, user_id, content, anger, disgust, fear, joy, neutral, sadness,
                surprise, classification, classify_attempts, next_classify_at,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                note.id.clone(),
                note.user_id.clone(),
                note.content.clone(),
                note.emotions.map(|e| e.anger),
                note.emotions.map(|e| e.disgust),
                note.emotions.map(|e| e.fear),
                note.emotions.map(|e| e.joy),
                note.emotions.map(|e| e.neutral),
                note.emotions.map(|e| e.sadness),
                note.emotions.map(|e| e.surprise),
                note.classification.to_string(),
                note.classify_attempts as i64,
                note.next_classify_at.map(|dt| dt.to_rfc3339()),
                note.created_at.to_rfc3339(),
                note.updated_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Note>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1");
        let mut rows = conn.query(&sql, params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_note(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list(
        conn: &Connection,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Note>, u64)> {
        let mut count_rows = conn
            .query(
                "SELECT COUNT(*) FROM notes WHERE user_id = ?1",
                params![user_id],
            )
            .await?;
        let total: i64 = if let Some(row) = count_rows.next().await? {
            row.get(0)?
        } else {
            0
        };

        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
        );
        let mut rows = conn
            .query(&sql, params![user_id, limit as i64, offset as i64])
            .await?;

        let mut notes = Vec::new();
        while let Some(row) = rows.next().await? {
            notes.push(Self::row_to_note(&row)?);
        }

        Ok((notes, total as u64))
    }

    /// Replaces the content and puts the note back into the unscored
    /// pending state so the classifier picks it up again.
    pub async fn update_content(conn: &Connection, id: &str, content: &str) -> Result<()> {
        conn.execute(
            r#"
            UPDATE notes
            SET content = ?2,
                anger = NULL, disgust = NULL, fear = NULL, joy = NULL,
                neutral = NULL, sadness = NULL, surprise = NULL,
                classification = 'pending', classify_attempts = 0,
                next_classify_at = NULL, updated_at = ?3
            WHERE id = ?1
            "#,
            params![id, content, Utc::now().to_rfc3339()],
        )
        .await?;

        Ok(())
    }

    pub async fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let affected = conn
            .execute("DELETE FROM notes WHERE id = ?1", params![id])
            .await?;
        Ok(affected > 0)
    }

    pub async fn count_since(
        conn: &Connection,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64> {
        let mut rows = match since {
            Some(since) => {
                conn.query(
                    "SELECT COUNT(*) FROM notes WHERE user_id = ?1 AND created_at > ?2",
                    params![user_id, since.to_rfc3339()],
                )
                .await?
            }
            None => {
                conn.query(
                    "SELECT COUNT(*) FROM notes WHERE user_id = ?1",
                    params![user_id],
                )
                .await?
            }
        };

        let total: i64 = if let Some(row) = rows.next().await? {
            row.get(0)?
        } else {
            0
        };
        Ok(total as u64)
    }

    pub async fn after(
        conn: &Connection,
        user_id: &str,
        since: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<Note>> {
        let mut rows = match since {
            Some(since) => {
                let sql = format!(
                    "SELECT {NOTE_COLUMNS} FROM notes \
                     WHERE user_id = ?1 AND created_at > ?2 \
                     ORDER BY created_at ASC, id ASC LIMIT ?3"
                );
                conn.query(&sql, params![user_id, since.to_rfc3339(), limit as i64])
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ?1 \
                     ORDER BY created_at ASC, id ASC LIMIT ?2"
                );
                conn.query(&sql, params![user_id, limit as i64]).await?
            }
        };

        let mut notes = Vec::new();
        while let Some(row) = rows.next().await? {
            notes.push(Self::row_to_note(&row)?);
        }
        Ok(notes)
    }

    pub async fn recent(conn: &Connection, user_id: &str, limit: u32) -> Result<Vec<Note>> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT ?2"
        );
        let mut rows = conn.query(&sql, params![user_id, limit as i64]).await?;

        let mut notes = Vec::new();
        while let Some(row) = rows.next().await? {
            notes.push(Self::row_to_note(&row)?);
        }
        Ok(notes)
    }

    pub async fn due_pending(
        conn: &Connection,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Note>> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes \
             WHERE classification = 'pending' \
               AND (next_classify_at IS NULL OR next_classify_at <= ?1) \
             ORDER BY created_at ASC LIMIT ?2"
        );
        let mut rows = conn
            .query(&sql, params![now.to_rfc3339(), limit as i64])
            .await?;

        let mut notes = Vec::new();
        while let Some(row) = rows.next().await? {
            notes.push(Self::row_to_note(&row)?);
        }
        Ok(notes)
    }

    /// All seven scores and the terminal status land in one UPDATE so a
    /// partially scored note can never be observed.
    pub async fn store_emotions(
        conn: &Connection,
        id: &str,
        emotions: &EmotionVector,
        status: ClassificationStatus,
    ) -> Result<()> {
        conn.execute(
            r#"
            UPDATE notes
            SET anger = ?2, disgust = ?3, fear = ?4, joy = ?5, neutral = ?6,
                sadness = ?7, surprise = ?8, classification = ?9,
                next_classify_at = NULL, updated_at = ?10
            WHERE id = ?1
            "#,
            params![
                id,
                emotions.anger,
                emotions.disgust,
                emotions.fear,
                emotions.joy,
                emotions.neutral,
                emotions.sadness,
                emotions.surprise,
                status.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn schedule_retry(
        conn: &Connection,
        id: &str,
        attempts: u32,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<()> {
        conn.execute(
            "UPDATE notes SET classify_attempts = ?2, next_classify_at = ?3, updated_at = ?4 \
             WHERE id = ?1",
            params![
                id,
                attempts as i64,
                next_attempt_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub fn row_to_note(row: &libsql::Row) -> Result<Note> {
        let anger: Option<f64> = row.get(3)?;
        let disgust: Option<f64> = row.get(4)?;
        let fear: Option<f64> = row.get(5)?;
        let joy: Option<f64> = row.get(6)?;
        let neutral: Option<f64> = row.get(7)?;
        let sadness: Option<f64> = row.get(8)?;
        let surprise: Option<f64> = row.get(9)?;

        let emotions = match (anger, disgust, fear, joy, neutral, sadness, surprise) {
            (Some(anger), Some(disgust), Some(fear), Some(joy), Some(neutral), Some(sadness), Some(surprise)) => {
                Some(EmotionVector {
                    anger,
                    disgust,
                    fear,
                    joy,
                    neutral,
                    sadness,
                    surprise,
                })
            }
            _ => None,
        };

        Ok(Note {
            id: row.get(0)?,
            user_id: row.get(1)?,
            content: row.get(2)?,
            emotions,
            classification: row.get::<String>(10)?.parse().unwrap_or_default(),
            classify_attempts: row.get::<i64>(11)? as u32,
            next_classify_at: row
                .get::<Option<String>>(12)?
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(13)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            updated_at: DateTime::parse_from_rfc3339(&row.get::<String>(14)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
