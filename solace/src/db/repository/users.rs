use chrono::{DateTime, Utc};
use libsql::{params, Connection};
use nanoid::nanoid;

use crate::error::Result;
use crate::models::User;

pub struct UserRepository;

impl UserRepository {
    /// Resolve a subject to a user, inserting on first sight. The insert
    /// tolerates a concurrent creation of the same subject.
    pub async fn get_or_create(conn: &Connection, subject: &str) -> Result<User> {
        if let Some(user) = Self::get_by_subject(conn, subject).await? {
            return Ok(user);
        }

        let user = User::new(nanoid!(), subject.to_string());
        conn.execute(
            "INSERT OR IGNORE INTO users (id, subject, created_at) VALUES (?1, ?2, ?3)",
            params![
                user.id.clone(),
                user.subject.clone(),
                user.created_at.to_rfc3339()
            ],
        )
        .await?;

        // Re-read in case another request won the insert race.
        match Self::get_by_subject(conn, subject).await? {
            Some(user) => Ok(user),
            None => Ok(user),
        }
    }

    pub async fn get_by_subject(conn: &Connection, subject: &str) -> Result<Option<User>> {
        let mut rows = conn
            .query(
                "SELECT id, subject, created_at FROM users WHERE subject = ?1",
                params![subject],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_user(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<User>> {
        let mut rows = conn
            .query(
                "SELECT id, subject, created_at FROM users WHERE id = ?1",
                params![id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_user(&row)?))
        } else {
            Ok(None)
        }
    }

    /// Delete a user and everything they own in one transaction.
    ///
    /// The cascade is explicit rather than left to `ON DELETE CASCADE`:
    /// the foreign_keys pragma is per-connection in SQLite and this must
    /// hold on every connection. Jobs go before advice (jobs reference
    /// advice rows).
    pub async fn delete(conn: &Connection, id: &str) -> Result<bool> {
        conn.execute("BEGIN IMMEDIATE", ()).await?;

        match Self::delete_inner(conn, id).await {
            Ok(deleted) => {
                conn.execute("COMMIT", ()).await?;
                Ok(deleted)
            }
            Err(e) => {
                if let Err(rollback_err) = conn.execute("ROLLBACK", ()).await {
                    tracing::warn!(error = %rollback_err, "Failed to roll back user deletion");
                }
                Err(e)
            }
        }
    }

    async fn delete_inner(conn: &Connection, id: &str) -> Result<bool> {
        conn.execute("DELETE FROM advice_jobs WHERE user_id = ?1", params![id])
            .await?;
        conn.execute("DELETE FROM advice WHERE user_id = ?1", params![id])
            .await?;
        conn.execute("DELETE FROM memories WHERE user_id = ?1", params![id])
            .await?;
        conn.execute("DELETE FROM notes WHERE user_id = ?1", params![id])
            .await?;
        let affected = conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])
            .await?;
        Ok(affected > 0)
    }

    pub fn row_to_user(row: &libsql::Row) -> Result<User> {
        Ok(User {
            id: row.get(0)?,
            subject: row.get(1)?,
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(2)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
