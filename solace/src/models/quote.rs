use serde::{Deserialize, Serialize};

/// An inspirational quote served by the public random-quote endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub content: String,
    pub author: String,
}
