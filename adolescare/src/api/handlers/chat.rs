use axum::extract::State;
use axum::Json;

use crate::api::dto::{ChatAnswer, ChatQuery, ChatResponse, ErrorResponse};
use crate::api::{AppQuery, AppState};
use crate::error::Result;

/// `GET /chat?query=...`
///
/// Answers from the indexed documents only. When retrieval finds nothing the
/// result is a fixed "couldn't find information" message, whatever the model said.
#[utoipa::path(
    get,
    path = "/chat",
    tag = "chat",
    params(ChatQuery),
    responses(
        (status = 200, description = "Answer grounded in the documents", body = ChatResponse),
        (status = 400, description = "Missing query parameter", body = ErrorResponse),
        (status = 502, description = "Upstream provider failed", body = ErrorResponse),
        (status = 503, description = "No LLM configured", body = ErrorResponse),
    )
)]
pub async fn chat(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ChatQuery>,
) -> Result<Json<ChatResponse>> {
    let answer = state.qa.answer(&params.query).await?;

    Ok(Json(ChatResponse {
        answer: ChatAnswer {
            result: answer.grounded().to_string(),
            query: params.query,
        },
    }))
}
