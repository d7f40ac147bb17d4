use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolaceError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authentication error: {0}")]
    ApiAuth(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    #[error("No notes or memories available to build advice context")]
    NoContext,
}

impl IntoResponse for SolaceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            SolaceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            SolaceError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            SolaceError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            SolaceError::NoContext => (StatusCode::BAD_REQUEST, self.to_string()),
            SolaceError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            SolaceError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            SolaceError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            SolaceError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            SolaceError::ApiAuth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            SolaceError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            SolaceError::Classifier(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            SolaceError::ClassifierUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
            SolaceError::Llm(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            SolaceError::LlmUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            SolaceError::LlmRateLimit { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("LLM rate limit exceeded, retry after {retry_after:?} seconds"),
            ),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, SolaceError>;
