use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::{Result, SolaceError};
use crate::models::{Advice, AdviceJob};

const JOB_COLUMNS: &str = "id, user_id, status, advice_id, error, created_at, updated_at";

pub struct AdviceJobRepository;

impl AdviceJobRepository {
    pub async fn create(conn: &Connection, job: &AdviceJob) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO advice_jobs (id, user_id, status, advice_id, error, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                job.id.clone(),
                job.user_id.clone(),
                job.status.to_string(),
                job.advice_id.clone(),
                job.error.clone(),
                job.created_at.to_rfc3339(),
                job.updated_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<AdviceJob>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM advice_jobs WHERE id = ?1");
        let mut rows = conn.query(&sql, params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_job(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn queued(conn: &Connection, limit: u32) -> Result<Vec<AdviceJob>> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM advice_jobs WHERE status = 'queued' \
             ORDER BY created_at ASC LIMIT ?1"
        );
        let mut rows = conn.query(&sql, params![limit as i64]).await?;

        let mut jobs = Vec::new();
        while let Some(row) = rows.next().await? {
            jobs.push(Self::row_to_job(&row)?);
        }
        Ok(jobs)
    }

    pub async fn active_for_user(conn: &Connection, user_id: &str) -> Result<Option<AdviceJob>> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM advice_jobs \
             WHERE user_id = ?1 AND status IN ('queued', 'running') \
             ORDER BY created_at ASC LIMIT 1"
        );
        let mut rows = conn.query(&sql, params![user_id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_job(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn mark_running(conn: &Connection, id: &str) -> Result<()> {
        conn.execute(
            "UPDATE advice_jobs SET status = 'running', updated_at = ?2 WHERE id = ?1",
            params![id, Utc::now().to_rfc3339()],
        )
        .await?;
        Ok(())
    }

    /// Advice insert and job update commit together; a crash between the
    /// two statements rolls both back.
    pub async fn complete(conn: &Connection, id: &str, advice: &Advice) -> Result<()> {
        conn.execute("BEGIN IMMEDIATE", ()).await?;

        match Self::complete_inner(conn, id, advice).await {
            Ok(()) => {
                conn.execute("COMMIT", ()).await?;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = conn.execute("ROLLBACK", ()).await {
                    tracing::warn!(error = %rollback_err, "Failed to roll back advice job completion");
                }
                Err(e)
            }
        }
    }

    async fn complete_inner(conn: &Connection, id: &str, advice: &Advice) -> Result<()> {
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

        let affected = conn
            .execute(
                "UPDATE advice_jobs \
                 SET status = 'succeeded', advice_id = ?2, error = NULL, updated_at = ?3 \
                 WHERE id = ?1",
                params![id, advice.id.clone(), Utc::now().to_rfc3339()],
            )
            .await?;

        if affected == 0 {
            return Err(SolaceError::NotFound(format!("Advice job {id} not found")));
        }
        Ok(())
    }

    pub async fn fail(conn: &Connection, id: &str, error: &str) -> Result<()> {
        conn.execute(
            "UPDATE advice_jobs SET status = 'failed', error = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, error, Utc::now().to_rfc3339()],
        )
        .await?;
        Ok(())
    }

    pub fn row_to_job(row: &libsql::Row) -> Result<AdviceJob> {
        Ok(AdviceJob {
            id: row.get(0)?,
            user_id: row.get(1)?,
            status: row.get::<String>(2)?.parse().unwrap_or_default(),
            advice_id: row.get(3)?,
            error: row.get(4)?,
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(5)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            updated_at: DateTime::parse_from_rfc3339(&row.get::<String>(6)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
