use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An account owned by an external identity provider subject.
///
/// Users are created lazily on the first authenticated request; deleting a
/// user cascades to every note, memory, advice, and advice job they own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Subject claim from the identity provider (unique).
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: String, subject: String) -> Self {
        Self {
            id,
            subject,
            created_at: Utc::now(),
        }
    }
}
