//! Request and response bodies for the HTTP surface.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChatQuery {
    /// Question about adolescent reproductive health.
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ChatAnswer {
    pub query: String,
    pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ChatResponse {
    pub answer: ChatAnswer,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct InsightsRequest {
    pub symptoms: Vec<String>,
    pub activities: Vec<String>,
}

/// Error body shared by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// HTTP status code, repeated in the body.
    pub code: u16,
}
