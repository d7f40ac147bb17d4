//! # V1 Authentication Middleware
//!
//! Protects all v1 API routes (except explicitly public ones like `/health`)
//! with Bearer token authentication. The token is verified by the external
//! identity provider adapter; the resolved subject is then mapped to a local
//! account (created on first sight) and attached to the request extensions
//! as [`AuthUser`], so handlers never touch raw credentials.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;
use crate::models::User;

use super::response::{ApiResponse, ErrorCode};

/// The authenticated account, attached to the request by
/// [`v1_auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Axum middleware that enforces Bearer token authentication for v1 routes.
///
/// # Behavior
///
/// - If no identity provider is configured → 401 with JSON error envelope.
///   The server still starts, but protected routes are locked down.
/// - If the `Authorization: Bearer <token>` header is missing or malformed → 401.
/// - If the identity provider rejects the token → 401.
/// - Otherwise the resolved user is attached and the request proceeds.
pub async fn v1_auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if !state.identity.is_available() {
        return ApiResponse::<()>::error(
            ErrorCode::Unauthorized,
            "Identity provider not configured. Set AUTH_USERINFO_URL or AUTH_DEV_TOKENS.",
        )
        .into_response();
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) if h.starts_with("Bearer ") => &h[7..],
        Some(_) => {
            return ApiResponse::<()>::error(
                ErrorCode::Unauthorized,
                "Invalid authorization header format. Expected: Bearer <token>",
            )
            .into_response();
        }
        None => {
            return ApiResponse::<()>::error(
                ErrorCode::Unauthorized,
                "Missing authorization header",
            )
            .into_response();
        }
    };

    let subject = match state.identity.verify(token).await {
        Ok(subject) => subject,
        Err(e) => {
            tracing::debug!(error = %e, "Token verification failed");
            return ApiResponse::<()>::error(ErrorCode::Unauthorized, "Invalid token")
                .into_response();
        }
    };

    let user = match state.db.get_or_create_user(&subject).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "Failed to resolve user for subject");
            return ApiResponse::<()>::error(
                ErrorCode::InternalError,
                "An internal error occurred",
            )
            .into_response();
        }
    };

    request.extensions_mut().insert(AuthUser(user));
    next.run(request).await
}
