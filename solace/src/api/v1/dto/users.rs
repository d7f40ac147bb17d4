//! User response DTOs for the v1 API.

use serde::Serialize;

/// Response for `DELETE /v1/users/me`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserResponse {
    pub user_id: String,
    /// All notes, memories, advice, and jobs were removed with the account.
    pub deleted: bool,
}
