use axum::extract::{Path, State};
use axum::Json;

use crate::api::dto::ErrorResponse;
use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::DailyTip;

/// `GET /todays-tip`
#[utoipa::path(
    get,
    path = "/todays-tip",
    tag = "tips",
    responses(
        (status = 200, description = "Tip for the server's local date", body = DailyTip),
        (status = 502, description = "Upstream provider failed", body = ErrorResponse),
        (status = 503, description = "No LLM configured", body = ErrorResponse),
    )
)]
pub async fn todays_tip(State(state): State<AppState>) -> Result<Json<DailyTip>> {
    Ok(Json(state.tips.todays_tip().await?))
}

/// `GET /tips/{date}`
#[utoipa::path(
    get,
    path = "/tips/{date}",
    tag = "tips",
    params(("date" = String, Path, description = "Date as YYYY-MM-DD")),
    responses(
        (status = 200, description = "Previously generated tip", body = DailyTip),
        (status = 400, description = "Malformed date", body = ErrorResponse),
        (status = 404, description = "No tip was generated on that date", body = ErrorResponse),
    )
)]
pub async fn tip_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DailyTip>> {
    state
        .tips
        .cached_tip(&date)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No tip for {date}")))
}
