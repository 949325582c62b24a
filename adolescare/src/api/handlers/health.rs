use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::llm::{LlmBackend, LlmProvider};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub index: IndexStatus,
    pub llm: LlmStatus,
    pub caches: CacheStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct IndexStatus {
    pub chunks: usize,
    /// Embedding model the index was built with.
    pub model: String,
    pub dimensions: usize,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LlmStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Why no model is reachable, when it is not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Stored entries per cache file.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CacheStatus {
    pub tips: usize,
    pub insights: usize,
}

impl LlmStatus {
    fn of(llm: &LlmProvider) -> Self {
        match llm.backend() {
            LlmBackend::Unavailable { reason } => Self {
                status: "unavailable".to_string(),
                provider: None,
                model: None,
                reason: Some(reason.clone()),
            },
            backend => Self {
                status: "available".to_string(),
                provider: Some(backend.name().to_string()),
                model: llm.model().map(str::to_string),
                reason: None,
            },
        }
    }
}

/// `GET /health`
///
/// Always 200 while the process is serving; an unavailable model shows up in
/// `llm.status` rather than the response code.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Index, model and cache status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthData> {
    let caches = CacheStatus {
        tips: state.tips.stored_count().await,
        insights: state.insights.stored_count().await,
    };

    Json(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        index: IndexStatus {
            chunks: state.index.len(),
            model: state.index.model().to_string(),
            dimensions: state.index.dimensions(),
        },
        llm: LlmStatus::of(&state.llm),
        caches,
    })
}
