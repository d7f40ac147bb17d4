//! Quote response DTOs for the v1 API.

use serde::Serialize;

use crate::models;

/// Response for `GET /v1/quotes/random`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub quote_id: String,
    pub content: String,
    pub author: String,
}

impl From<models::Quote> for QuoteResponse {
    fn from(quote: models::Quote) -> Self {
        Self {
            quote_id: quote.id,
            content: quote.content,
            author: quote.author,
        }
    }
}
