//! v1 Memory handlers. Memories are produced only by the batching pipeline;
//! the API exposes them read-only.

use axum::extract::State;
use axum::Extension;
use axum_extra::extract::Query;

use crate::api::v1::dto::{ListMemoriesQuery, ListMemoriesResponse, MemoryResponse, PageParams};
use crate::api::v1::middleware::AuthUser;
use crate::api::v1::response::ApiResponse;
use crate::api::AppState;

/// `GET /api/v1/memories`
#[utoipa::path(
    get,
    path = "/api/v1/memories",
    tag = "memories",
    operation_id = "memories.list",
    params(ListMemoriesQuery),
    responses(
        (status = 200, description = "Memories listed newest first", body = ListMemoriesResponse),
    )
)]
pub async fn list_memories(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Query(query): Query<ListMemoriesQuery>,
) -> ApiResponse<ListMemoriesResponse> {
    let params = PageParams::resolve(query.limit, query.cursor.as_deref());

    let (memories, total) = match state
        .db
        .list_memories(&user.id, params.limit, params.offset)
        .await
    {
        Ok(result) => result,
        Err(e) => return e.into(),
    };

    let memories = memories.into_iter().map(MemoryResponse::from).collect();
    ApiResponse::success_with_meta(ListMemoriesResponse { memories }, params.meta(total))
}
