//! v1 Quote handlers.

use axum::extract::State;

use crate::api::v1::dto::QuoteResponse;
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;

/// `GET /api/v1/quotes/random`
///
/// Public endpoint; no authentication required.
#[utoipa::path(
    get,
    path = "/api/v1/quotes/random",
    tag = "quotes",
    operation_id = "quotes.random",
    responses(
        (status = 200, description = "A random quote", body = QuoteResponse),
        (status = 404, description = "No quotes in the database", body = ApiError),
    )
)]
pub async fn get_random_quote(State(state): State<AppState>) -> ApiResponse<QuoteResponse> {
    match state.db.random_quote().await {
        Ok(Some(quote)) => ApiResponse::success(QuoteResponse::from(quote)),
        Ok(None) => ApiResponse::error(ErrorCode::NotFound, "No quotes found in database"),
        Err(e) => e.into(),
    }
}
