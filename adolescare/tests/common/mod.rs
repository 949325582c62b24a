#![allow(dead_code)]

use std::sync::Once;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use adolescare::config::{EmbeddingsConfig, LlmConfig};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "command-r-plus",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }
        ],
        "usage": {
            "prompt_tokens": 1,
            "completion_tokens": 1,
            "total_tokens": 2
        }
    })
}

pub fn api_error_body(message: &str, error_type: &str, code: &str) -> serde_json::Value {
    json!({
        "error": {
            "message": message,
            "type": error_type,
            "param": serde_json::Value::Null,
            "code": code
        }
    })
}

pub fn embedding_body(vectors: &[Vec<f32>]) -> serde_json::Value {
    json!({
        "data": vectors.iter().map(|v| json!({ "embedding": v })).collect::<Vec<_>>()
    })
}

pub fn llm_config(model: &str, base_url: Option<String>) -> LlmConfig {
    LlmConfig {
        model: model.to_string(),
        api_key: Some("test-key".to_string()),
        base_url,
        timeout_secs: 5,
        max_retries: 0,
        temperature: 0.0,
        title_temperature: 0.2,
    }
}

pub fn embeddings_config(base_url: String) -> EmbeddingsConfig {
    EmbeddingsConfig {
        model: "cohere/embed-english-v3.0".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url),
        batch_size: 96,
        timeout_secs: 5,
        max_retries: 0,
    }
}

/// Every `/embeddings` call returns `vector` for each input.
pub async fn mount_query_embedding(server: &MockServer, vector: Vec<f32>) {
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[vector])))
        .mount(server)
        .await;
}
