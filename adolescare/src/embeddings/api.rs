use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::retry::{with_retries, Failure};

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    encoding_format: &'static str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedVector>,
}

#[derive(Deserialize)]
struct EmbedVector {
    embedding: Vec<f32>,
}

/// Client for OpenAI-compatible `/embeddings` endpoints.
///
/// The bearer token is installed as a default header, so each attempt is a
/// plain JSON POST.
#[derive(Clone)]
pub struct EmbeddingApiClient {
    http: Client,
    endpoint: String,
    model: String,
    max_retries: u32,
}

impl EmbeddingApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &config.api_key {
            let mut bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| AppError::Embedding(format!("Invalid API key header: {e}")))?;
            bearer.set_sensitive(true);
            headers.insert(AUTHORIZATION, bearer);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Embedding(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model,
            max_retries: config.max_retries,
        })
    }

    /// One vector per input, in input order.
    pub async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
            encoding_format: "float",
        };

        let response =
            with_retries(self.max_retries, "embeddings", || self.post(&request)).await?;

        if response.data.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }

        Ok(response.data.into_iter().map(|v| v.embedding).collect())
    }

    async fn post(&self, request: &EmbedRequest<'_>) -> std::result::Result<EmbedResponse, Failure> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| Failure::Transient(AppError::Embedding(format!("Request failed: {e}"))))?;

        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(|e| {
                Failure::Fatal(AppError::Embedding(format!("Failed to parse response: {e}")))
            });
        }

        let retry_after = retry_after_secs(response.headers());
        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status, body, retry_after))
    }
}

fn classify_status(status: StatusCode, body: String, retry_after: Option<u64>) -> Failure {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Failure::Fatal(AppError::ApiAuth(body)),
        StatusCode::TOO_MANY_REQUESTS => {
            Failure::Transient(AppError::ApiRateLimit { retry_after })
        }
        s if s.is_server_error() => {
            Failure::Transient(AppError::Embedding(format!("Server error {s}: {body}")))
        }
        s => Failure::Fatal(AppError::Embedding(format!("API error {s}: {body}"))),
    }
}

fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
