use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Solace API",
        version = "1.0.0",
        description = "Self-hostable journaling backend. Notes are scored for emotion, \
                       batched into memories, and turned into personalized advice.",
    ),
    paths(
        handlers::health::health_check,
        handlers::notes::create_note,
        handlers::notes::list_notes,
        handlers::notes::get_note,
        handlers::notes::update_note,
        handlers::notes::delete_note,
        handlers::advice::get_latest_advice,
        handlers::advice::list_advice,
        handlers::advice::check_eligibility,
        handlers::advice::generate_advice,
        handlers::advice::get_advice_job,
        handlers::memories::list_memories,
        handlers::quotes::get_random_quote,
        handlers::users::delete_me,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Domain enums and vectors
        crate::models::Emotion,
        crate::models::EmotionVector,
        crate::models::ClassificationStatus,
        crate::models::TriggerType,
        crate::models::JobStatus,
        // Notes
        dto::notes::CreateNoteRequest,
        dto::notes::UpdateNoteRequest,
        dto::notes::ListNotesQuery,
        dto::notes::NoteResponse,
        dto::notes::ListNotesResponse,
        dto::notes::DeleteNoteResponse,
        // Advice
        dto::advice::ListAdviceQuery,
        dto::advice::AdviceResponse,
        dto::advice::ListAdviceResponse,
        dto::advice::EligibilityResponse,
        dto::advice::GenerateAdviceResponse,
        dto::advice::AdviceJobResponse,
        // Memories
        dto::memories::ListMemoriesQuery,
        dto::memories::MemoryResponse,
        dto::memories::ListMemoriesResponse,
        // Quotes
        dto::quotes::QuoteResponse,
        // Users
        dto::users::DeleteUserResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
        handlers::health::ClassifierStatus,
        handlers::health::LlmStatus,
        handlers::health::IdentityStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "notes", description = "Journal entry CRUD and emotion state"),
        (name = "advice", description = "Advice history, eligibility, and async generation"),
        (name = "memories", description = "Summarized note batches"),
        (name = "quotes", description = "Public inspirational quotes"),
        (name = "users", description = "Account lifecycle"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
