//! v1 User handlers.

use axum::extract::State;
use axum::Extension;

use crate::api::v1::dto::DeleteUserResponse;
use crate::api::v1::middleware::AuthUser;
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;

/// `DELETE /api/v1/users/me`
///
/// Deletes the authenticated account. Notes, memories, advice, and jobs
/// cascade with it; no orphaned rows remain.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    tag = "users",
    operation_id = "users.deleteMe",
    responses(
        (status = 200, description = "Account deleted", body = DeleteUserResponse),
        (status = 401, description = "Not authenticated", body = ApiError),
    )
)]
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> ApiResponse<DeleteUserResponse> {
    match state.db.delete_user(&user.id).await {
        Ok(deleted) => ApiResponse::success(DeleteUserResponse {
            user_id: user.id,
            deleted,
        }),
        Err(e) => e.into(),
    }
}
