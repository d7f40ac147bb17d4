use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{Advice, Emotion};

const ADVICE_COLUMNS: &str = "id, user_id, content, trigger_type, memories_used, notes_used, \
                              dominant_emotion, created_at";

pub struct AdviceRepository;

impl AdviceRepository {
    pub async fn create(conn: &Connection, advice: &Advice) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO advice (
                id, user_id, content, trigger_type, memories_used, notes_used,
                dominant_emotion, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                advice.id.clone(),
                advice.user_id.clone(),
                advice.content.clone(),
                advice.trigger_type.to_string(),
                advice.memories_used as i64,
                advice.notes_used as i64,
                advice.dominant_emotion.to_string(),
                advice.created_at.to_rfc3339(),
            ],
        )
        .await?;
        Ok(())
    }

    pub async fn latest(conn: &Connection, user_id: &str) -> Result<Option<Advice>> {
        let sql = format!(
            "SELECT {ADVICE_COLUMNS} FROM advice WHERE user_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        let mut rows = conn.query(&sql, params![user_id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_advice(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list(
        conn: &Connection,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Advice>, u64)> {
        let mut count_rows = conn
            .query(
                "SELECT COUNT(*) FROM advice WHERE user_id = ?1",
                params![user_id],
            )
            .await?;
        let total: i64 = if let Some(row) = count_rows.next().await? {
            row.get(0)?
        } else {
            0
        };

        let sql = format!(
            "SELECT {ADVICE_COLUMNS} FROM advice WHERE user_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
        );
        let mut rows = conn
            .query(&sql, params![user_id, limit as i64, offset as i64])
            .await?;

        let mut advice = Vec::new();
        while let Some(row) = rows.next().await? {
            advice.push(Self::row_to_advice(&row)?);
        }

        Ok((advice, total as u64))
    }

    pub fn row_to_advice(row: &libsql::Row) -> Result<Advice> {
        Ok(Advice {
            id: row.get(0)?,
            user_id: row.get(1)?,
            content: row.get(2)?,
            trigger_type: row.get::<String>(3)?.parse().unwrap_or_default(),
            memories_used: row.get::<i64>(4)? as u32,
            notes_used: row.get::<i64>(5)? as u32,
            dominant_emotion: row
                .get::<String>(6)?
                .parse()
                .unwrap_or(Emotion::Neutral),
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(7)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
