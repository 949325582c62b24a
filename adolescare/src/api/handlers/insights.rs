use axum::extract::State;
use axum::Json;

use crate::api::dto::{ErrorResponse, InsightsRequest};
use crate::api::{AppJson, AppState};
use crate::error::Result;
use crate::models::InsightResult;

/// `POST /insights`
#[utoipa::path(
    post,
    path = "/insights",
    tag = "insights",
    request_body = InsightsRequest,
    responses(
        (status = 200, description = "Insights for the logged symptoms and activities", body = InsightResult),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 502, description = "Upstream provider failed", body = ErrorResponse),
        (status = 503, description = "No LLM configured", body = ErrorResponse),
    )
)]
pub async fn insights(
    State(state): State<AppState>,
    AppJson(req): AppJson<InsightsRequest>,
) -> Result<Json<InsightResult>> {
    let result = state
        .insights
        .insights(req.symptoms, req.activities)
        .await?;
    Ok(Json(result))
}
