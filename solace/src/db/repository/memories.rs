use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{Emotion, Memory};

const MEMORY_COLUMNS: &str = "id, user_id, summary, batch_size, first_note_at, last_note_at, \
                              dominant_emotion, emotional_intensity, theme, created_at";

pub struct MemoryRepository;

impl MemoryRepository {
    pub async fn create(conn: &Connection, memory: &Memory) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO memories (
                id, user_id, summary, batch_size, first_note_at, last_note_at,
                dominant_emotion, emotional_intensity, theme, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                memory.id.clone(),
                memory.user_id.clone(),
                memory.summary.clone(),
                memory.batch_size as i64,
                memory.first_note_at.to_rfc3339(),
                memory.last_note_at.to_rfc3339(),
                memory.dominant_emotion.to_string(),
                memory.emotional_intensity,
                memory.theme.clone(),
                memory.created_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn latest(conn: &Connection, user_id: &str) -> Result<Option<Memory>> {
        let sql = format!(
            "SELECT {MEMORY_COLUMNS} FROM memories WHERE user_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        let mut rows = conn.query(&sql, params![user_id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_memory(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn recent(conn: &Connection, user_id: &str, limit: u32) -> Result<Vec<Memory>> {
        let sql = format!(
            "SELECT {MEMORY_COLUMNS} FROM memories WHERE user_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT ?2"
        );
        let mut rows = conn.query(&sql, params![user_id, limit as i64]).await?;

        let mut memories = Vec::new();
        while let Some(row) = rows.next().await? {
            memories.push(Self::row_to_memory(&row)?);
        }
        Ok(memories)
    }

    pub async fn list(
        conn: &Connection,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Memory>, u64)> {
        let mut count_rows = conn
            .query(
                "SELECT COUNT(*) FROM memories WHERE user_id = ?1",
                params![user_id],
            )
            .await?;
        let total: i64 = if let Some(row) = count_rows.next().await? {
            row.get(0)?
        } else {
            0
        };

        let sql = format!(
            "SELECT {MEMORY_COLUMNS} FROM memories WHERE user_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
        );
        let mut rows = conn
            .query(&sql, params![user_id, limit as i64, offset as i64])
            .await?;

        let mut memories = Vec::new();
        while let Some(row) = rows.next().await? {
            memories.push(Self::row_to_memory(&row)?);
        }

        Ok((memories, total as u64))
    }

    pub fn row_to_memory(row: &libsql::Row) -> Result<Memory> {
        Ok(Memory {
            id: row.get(0)?,
            user_id: row.get(1)?,
            summary: row.get(2)?,
            batch_size: row.get::<i64>(3)? as u32,
            first_note_at: DateTime::parse_from_rfc3339(&row.get::<String>(4)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            last_note_at: DateTime::parse_from_rfc3339(&row.get::<String>(5)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            dominant_emotion: row
                .get::<String>(6)?
                .parse()
                .unwrap_or(Emotion::Neutral),
            emotional_intensity: row.get(7)?,
            theme: row.get(8)?,
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(9)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
