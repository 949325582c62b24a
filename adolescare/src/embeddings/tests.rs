//! Embedding client and provider against a mocked `/embeddings` endpoint.

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::EmbeddingsConfig;
use crate::embeddings::api::{ApiConfig, EmbeddingApiClient};
use crate::embeddings::EmbeddingProvider;
use crate::error::AppError;

fn test_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        api_key: Some("test-api-key".to_string()),
        model: "embed-english-v3.0".to_string(),
        timeout_secs: 10,
        max_retries: 3,
    }
}

fn provider_config(base_url: &str, batch_size: usize) -> EmbeddingsConfig {
    EmbeddingsConfig {
        model: "cohere/embed-english-v3.0".to_string(),
        api_key: Some("test-api-key".to_string()),
        base_url: Some(base_url.to_string()),
        batch_size,
        timeout_secs: 10,
        max_retries: 0,
    }
}

fn embedding_response(embeddings: Vec<Vec<f32>>) -> serde_json::Value {
    json!({
        "data": embeddings.into_iter().map(|e| json!({ "embedding": e })).collect::<Vec<_>>()
    })
}

// =============================================================================
// API client
// =============================================================================

#[tokio::test]
async fn test_api_client_posts_batch_with_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "model": "embed-english-v3.0",
            "input": ["menarche", "ovulation"],
            "encoding_format": "float"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_response(vec![
            vec![0.1, 0.2],
            vec![0.3, 0.4],
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    // trailing slash on the base URL must not double up in the path
    let base_url = format!("{}/", mock_server.uri());
    let client = EmbeddingApiClient::new(test_config(&base_url)).unwrap();

    let embeddings = client.embed(&["menarche", "ovulation"]).await.unwrap();
    assert_eq!(embeddings, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
}

#[tokio::test]
async fn test_api_client_rate_limit_retry() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with({
            let count = Arc::clone(&attempt_count);
            move |_: &wiremock::Request| {
                let attempt = count.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 {
                    ResponseTemplate::new(429)
                        .set_body_json(json!({ "error": "rate limited" }))
                        .insert_header("retry-after", "1")
                } else {
                    ResponseTemplate::new(200)
                        .set_body_json(embedding_response(vec![vec![0.1, 0.2, 0.3]]))
                }
            }
        })
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();

    let result = client.embed(&["test"]).await;
    assert!(result.is_ok(), "Should succeed after retry");
    assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_api_client_rate_limit_exhausted_reports_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({ "error": "rate limited" }))
                .insert_header("retry-after", "7"),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = ApiConfig {
        max_retries: 1,
        ..test_config(&mock_server.uri())
    };
    let client = EmbeddingApiClient::new(config).unwrap();

    let err = client.embed(&["test"]).await.unwrap_err();
    assert!(matches!(err, AppError::ApiRateLimit { retry_after: Some(7) }));
}

#[tokio::test]
async fn test_api_client_zero_retries_makes_single_attempt() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with({
            let count = Arc::clone(&attempt_count);
            move |_: &wiremock::Request| {
                count.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(500).set_body_string("boom")
            }
        })
        .mount(&mock_server)
        .await;

    let config = ApiConfig {
        max_retries: 0,
        ..test_config(&mock_server.uri())
    };
    let client = EmbeddingApiClient::new(config).unwrap();

    let err = client.embed(&["test"]).await.unwrap_err();
    assert!(matches!(err, AppError::Embedding(_)));
    assert_eq!(attempt_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_api_client_auth_error_no_retry() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with({
            let count = Arc::clone(&attempt_count);
            move |_: &wiremock::Request| {
                count.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid api key" }))
            }
        })
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();

    let err = client.embed(&["test"]).await.unwrap_err();
    assert!(matches!(err, AppError::ApiAuth(_)), "Should be ApiAuth error");
    assert_eq!(attempt_count.load(Ordering::SeqCst), 1, "Should NOT retry on 401");
}

#[tokio::test]
async fn test_api_client_count_mismatch_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_response(vec![vec![0.1]])),
        )
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();

    let result = client.embed(&["a", "b"]).await;
    assert!(matches!(result, Err(AppError::Embedding(_))));
}

#[tokio::test]
async fn test_api_client_400_error_no_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad input"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = EmbeddingApiClient::new(test_config(&mock_server.uri())).unwrap();

    let err = client.embed(&["test"]).await.unwrap_err();
    assert!(err.to_string().contains("bad input"));
}

// =============================================================================
// Provider
// =============================================================================

#[tokio::test]
async fn test_provider_batches_documents_in_order() {
    let mock_server = MockServer::start().await;
    let call_count = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with({
            let count = Arc::clone(&call_count);
            move |request: &wiremock::Request| {
                count.fetch_add(1, Ordering::SeqCst);
                let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
                let inputs = body["input"].as_array().unwrap().clone();
                let vectors: Vec<Vec<f32>> = inputs
                    .iter()
                    .map(|text| vec![text.as_str().unwrap().len() as f32])
                    .collect();
                ResponseTemplate::new(200).set_body_json(embedding_response(vectors))
            }
        })
        .mount(&mock_server)
        .await;

    let provider = EmbeddingProvider::new(&provider_config(&mock_server.uri(), 2)).unwrap();
    assert_eq!(provider.model(), "cohere/embed-english-v3.0");

    let texts = vec!["a".to_string(), "bb".to_string(), "ccc".to_string()];
    let embeddings = provider.embed_documents(texts).await.unwrap();

    assert_eq!(embeddings, vec![vec![1.0], vec![2.0], vec![3.0]]);
    assert_eq!(call_count.load(Ordering::SeqCst), 2, "3 texts in batches of 2");
}

#[tokio::test]
async fn test_provider_embed_query_sends_raw_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_json(json!({
            "model": "embed-english-v3.0",
            "input": ["what is puberty"],
            "encoding_format": "float"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_response(vec![vec![0.5, 0.5]])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = EmbeddingProvider::new(&provider_config(&mock_server.uri(), 8)).unwrap();

    let embedding = provider.embed_query("what is puberty").await.unwrap();
    assert_eq!(embedding, vec![0.5, 0.5]);
}

#[tokio::test]
async fn test_provider_empty_documents_skip_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let provider = EmbeddingProvider::new(&provider_config(&mock_server.uri(), 8)).unwrap();
    assert!(provider.embed_documents(vec![]).await.unwrap().is_empty());
}

#[test]
fn test_provider_requires_api_key_for_hosted_providers() {
    let config = EmbeddingsConfig {
        api_key: None,
        ..provider_config("http://localhost:1", 8)
    };

    let result = EmbeddingProvider::new(&config);
    assert!(matches!(result, Err(AppError::Embedding(_))));
}

#[test]
fn test_provider_ollama_needs_no_api_key() {
    let config = EmbeddingsConfig {
        model: "ollama/nomic-embed-text".to_string(),
        api_key: None,
        ..provider_config("http://localhost:11434/v1", 8)
    };

    assert!(EmbeddingProvider::new(&config).is_ok());
}
