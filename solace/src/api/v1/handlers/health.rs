use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::v1::response::ApiResponse;
use crate::classifier::ClassifierBackend;
use crate::identity::IdentityBackend;
use crate::llm::LlmBackend;

/// Health data returned inside the v1 envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub database: DatabaseStatus,
    pub classifier: ClassifierStatus,
    pub llm: LlmStatus,
    pub identity: IdentityStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct DatabaseStatus {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ClassifierStatus {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LlmStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct IdentityStatus {
    pub status: String,
    pub mode: String,
}

/// `GET /api/v1/health`
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let database = match state.db.sync().await {
        Ok(_) => DatabaseStatus {
            status: "ok".to_string(),
        },
        Err(_) => DatabaseStatus {
            status: "error".to_string(),
        },
    };

    let classifier = ClassifierStatus {
        status: match state.classifier.backend() {
            ClassifierBackend::Inference { .. } => "ok".to_string(),
            ClassifierBackend::Unavailable { .. } => "unavailable".to_string(),
        },
    };

    let llm = if state.llm.is_available() {
        let provider = match state.llm.backend() {
            LlmBackend::OpenAI => "openai",
            LlmBackend::OpenRouter => "openrouter",
            LlmBackend::Ollama => "ollama",
            LlmBackend::LmStudio => "lmstudio",
            LlmBackend::OpenAICompatible { .. } => "openai-compatible",
            LlmBackend::Unavailable { .. } => "unavailable",
        };
        LlmStatus {
            status: "ok".to_string(),
            provider: Some(provider.to_string()),
            model: state.llm.config().map(|c| c.model.clone()),
        }
    } else {
        LlmStatus {
            status: "unavailable".to_string(),
            provider: None,
            model: None,
        }
    };

    let identity = IdentityStatus {
        status: if state.identity.is_available() {
            "ok".to_string()
        } else {
            "unavailable".to_string()
        },
        mode: match state.identity.backend() {
            IdentityBackend::Userinfo { .. } => "userinfo".to_string(),
            IdentityBackend::DevTokens { .. } => "dev-tokens".to_string(),
            IdentityBackend::Unavailable { .. } => "none".to_string(),
        },
    };

    ApiResponse::success(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        classifier,
        llm,
        identity,
    })
}
