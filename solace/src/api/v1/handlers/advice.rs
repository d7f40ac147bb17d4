//! v1 Advice handlers.
//!
//! Generation is asynchronous: `POST /advice:generate` only enqueues a job
//! and returns its id; a background worker runs the pipeline and the client
//! polls `GET /advice/jobs/{jobId}`.

use axum::extract::{Path, State};
use axum::Extension;
use axum_extra::extract::Query;

use crate::api::v1::dto::{
    AdviceJobResponse, AdviceResponse, EligibilityResponse, GenerateAdviceResponse,
    ListAdviceQuery, ListAdviceResponse, PageParams,
};
use crate::api::v1::middleware::AuthUser;
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::models::AdviceJob;

/// `GET /api/v1/advice/latest`
#[utoipa::path(
    get,
    path = "/api/v1/advice/latest",
    tag = "advice",
    operation_id = "advice.latest",
    responses(
        (status = 200, description = "Most recent advice", body = AdviceResponse),
        (status = 404, description = "No advice generated yet", body = ApiError),
    )
)]
pub async fn get_latest_advice(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> ApiResponse<AdviceResponse> {
    match state.db.latest_advice(&user.id).await {
        Ok(Some(advice)) => ApiResponse::success(AdviceResponse::from(advice)),
        Ok(None) => ApiResponse::error(ErrorCode::NotFound, "No advice available yet"),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/advice`
#[utoipa::path(
    get,
    path = "/api/v1/advice",
    tag = "advice",
    operation_id = "advice.list",
    params(ListAdviceQuery),
    responses(
        (status = 200, description = "Advice history newest first", body = ListAdviceResponse),
    )
)]
pub async fn list_advice(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Query(query): Query<ListAdviceQuery>,
) -> ApiResponse<ListAdviceResponse> {
    let params = PageParams::resolve(query.limit, query.cursor.as_deref());

    let (advice, total) = match state
        .db
        .list_advice(&user.id, params.limit, params.offset)
        .await
    {
        Ok(result) => result,
        Err(e) => return e.into(),
    };

    let advice = advice.into_iter().map(AdviceResponse::from).collect();
    ApiResponse::success_with_meta(ListAdviceResponse { advice }, params.meta(total))
}

/// `GET /api/v1/advice/eligibility`
#[utoipa::path(
    get,
    path = "/api/v1/advice/eligibility",
    tag = "advice",
    operation_id = "advice.eligibility",
    responses(
        (status = 200, description = "Whether a new advice run would trigger", body = EligibilityResponse),
    )
)]
pub async fn check_eligibility(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> ApiResponse<EligibilityResponse> {
    let eligible = state.eligibility.is_eligible(&user.id).await;

    ApiResponse::success(EligibilityResponse {
        eligible,
        threshold: state.eligibility.threshold(),
    })
}

/// `POST /api/v1/advice:generate`
///
/// Enqueues an advice generation job. Rejected when the user has no notes
/// at all; other precondition failures (e.g. no generation credential)
/// surface on the job itself.
#[utoipa::path(
    post,
    path = "/api/v1/advice:generate",
    tag = "advice",
    operation_id = "advice.generate",
    responses(
        (status = 202, description = "Generation queued", body = GenerateAdviceResponse),
        (status = 400, description = "No notes available", body = ApiError),
    )
)]
pub async fn generate_advice(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> ApiResponse<GenerateAdviceResponse> {
    let note_count = match state.db.count_notes_since(&user.id, None).await {
        Ok(count) => count,
        Err(e) => return e.into(),
    };

    if note_count == 0 {
        return ApiResponse::error(
            ErrorCode::InvalidRequest,
            "No notes available for advice generation",
        );
    }

    let job = AdviceJob::new(user.id);
    if let Err(e) = state.db.create_advice_job(&job).await {
        return e.into();
    }

    ApiResponse::accepted(GenerateAdviceResponse {
        job_id: job.id,
        status: job.status,
    })
}

/// `GET /api/v1/advice/jobs/{jobId}`
#[utoipa::path(
    get,
    path = "/api/v1/advice/jobs/{jobId}",
    tag = "advice",
    operation_id = "advice.jobStatus",
    params(("jobId" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job status", body = AdviceJobResponse),
        (status = 404, description = "Job not found", body = ApiError),
    )
)]
pub async fn get_advice_job(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResponse<AdviceJobResponse> {
    match state.db.get_advice_job(&id).await {
        Ok(Some(job)) if job.user_id == user.id => {
            ApiResponse::success(AdviceJobResponse::from(job))
        }
        Ok(_) => ApiResponse::error(ErrorCode::NotFound, format!("Advice job {id} not found")),
        Err(e) => e.into(),
    }
}
