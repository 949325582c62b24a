use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Adolescare API",
        description = "Question answering, daily tips and symptom insights grounded in adolescent reproductive-health documents.",
    ),
    paths(
        handlers::root,
        handlers::health::health_check,
        handlers::chat::chat,
        handlers::tips::todays_tip,
        handlers::tips::tip_by_date,
        handlers::insights::insights,
    ),
    components(schemas(
        dto::MessageResponse,
        dto::ChatAnswer,
        dto::ChatResponse,
        dto::InsightsRequest,
        dto::ErrorResponse,
        models::DailyTip,
        models::InsightResult,
        handlers::health::HealthData,
        handlers::health::IndexStatus,
        handlers::health::LlmStatus,
        handlers::health::CacheStatus,
    )),
    tags(
        (name = "health", description = "Liveness and health"),
        (name = "chat", description = "Document-grounded question answering"),
        (name = "tips", description = "Daily health tip"),
        (name = "insights", description = "Symptom and activity insights"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
