pub mod chat;
pub mod health;
pub mod insights;
pub mod tips;

pub use chat::chat;
pub use health::health_check;
pub use insights::insights;
pub use tips::{tip_by_date, todays_tip};

use axum::Json;

use crate::api::dto::MessageResponse;

/// `GET /`
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Liveness message", body = MessageResponse))
)]
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Adolescare RAG Chatbot is live.".to_string(),
    })
}
