use libsql::{params, Connection};

use crate::error::Result;
use crate::models::Quote;

pub struct QuoteRepository;

impl QuoteRepository {
    pub async fn create(conn: &Connection, quote: &Quote) -> Result<()> {
        conn.execute(
            "INSERT INTO quotes (id, content, author) VALUES (?1, ?2, ?3)",
            params![quote.id.clone(), quote.content.clone(), quote.author.clone()],
        )
        .await?;
        Ok(())
    }

    pub async fn random(conn: &Connection) -> Result<Option<Quote>> {
        let mut rows = conn
            .query(
                "SELECT id, content, author FROM quotes ORDER BY RANDOM() LIMIT 1",
                (),
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Quote {
                id: row.get(0)?,
                content: row.get(1)?,
                author: row.get(2)?,
            }))
        } else {
            Ok(None)
        }
    }
}
