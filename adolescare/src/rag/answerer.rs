use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{IndexConfig, LlmConfig};
use crate::embeddings::EmbeddingProvider;
use crate::error::Result;
use crate::index::VectorIndex;
use crate::llm::{prompts, CompletionOptions, LlmProvider};
use crate::models::ScoredChunk;

/// Returned by `/chat` instead of the model answer when retrieval found nothing.
pub const NOT_FOUND_MESSAGE: &str =
    "Sorry, I couldn't find information about that in the documents provided.";

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    /// Chunks handed to the model as context.
    pub sources: Vec<ScoredChunk>,
}

impl Answer {
    /// The model answer, or [`NOT_FOUND_MESSAGE`] when no source backed it.
    pub fn grounded(&self) -> &str {
        if self.sources.is_empty() {
            NOT_FOUND_MESSAGE
        } else {
            &self.answer
        }
    }
}

/// Retrieval + generation over the document corpus.
#[async_trait]
pub trait Answerer: Send + Sync {
    async fn answer(&self, query: &str) -> Result<Answer>;
}

#[derive(Debug, Clone, Copy)]
pub enum RetrievalMode {
    TopK { k: usize },
    Threshold { k: usize, min_score: f32 },
}

impl RetrievalMode {
    pub fn from_config(config: &IndexConfig) -> Self {
        match config.score_threshold {
            Some(min_score) => RetrievalMode::Threshold {
                k: config.top_k,
                min_score,
            },
            None => RetrievalMode::TopK { k: config.top_k },
        }
    }
}

#[derive(Clone)]
pub struct RetrievalQa {
    index: Arc<VectorIndex>,
    embeddings: EmbeddingProvider,
    llm: LlmProvider,
    mode: RetrievalMode,
    temperature: f32,
}

impl RetrievalQa {
    pub fn new(
        index: Arc<VectorIndex>,
        embeddings: EmbeddingProvider,
        llm: LlmProvider,
        mode: RetrievalMode,
        llm_config: &LlmConfig,
    ) -> Self {
        Self {
            index,
            embeddings,
            llm,
            mode,
            temperature: llm_config.temperature,
        }
    }

    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        let query_embedding = self.embeddings.embed_query(query).await?;

        let results = match self.mode {
            RetrievalMode::TopK { k } => self.index.search(&query_embedding, k),
            RetrievalMode::Threshold { k, min_score } => {
                self.index
                    .search_with_threshold(&query_embedding, k, min_score)
            }
        };

        Ok(results)
    }
}

#[async_trait]
impl Answerer for RetrievalQa {
    async fn answer(&self, query: &str) -> Result<Answer> {
        let sources = self.retrieve(query).await?;
        tracing::debug!(sources = sources.len(), "Retrieved context for query");

        let prompt = prompts::retrieval_qa_prompt(query, &sources);
        let options = CompletionOptions::with_temperature(self.temperature);
        let answer = self.llm.complete(&prompt, Some(&options)).await?;

        Ok(Answer {
            answer: answer.trim().to_string(),
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingsConfig;
    use crate::models::Chunk;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1,
            "model": "command-r-plus",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2 }
        })
    }

    fn llm_config(base_url: &str) -> LlmConfig {
        LlmConfig {
            model: "cohere/command-r-plus".to_string(),
            api_key: Some("test-key".to_string()),
            base_url: Some(base_url.to_string()),
            timeout_secs: 5,
            max_retries: 0,
            temperature: 0.0,
            title_temperature: 0.2,
        }
    }

    async fn mock_server(query_vector: Vec<f32>, answer: &str) -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "embedding": query_vector }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(answer)))
            .mount(&server)
            .await;

        server
    }

    fn qa(server: &MockServer, mode: RetrievalMode) -> RetrievalQa {
        let index = VectorIndex::build(
            "cohere/embed-english-v3.0",
            vec![
                Chunk::new("Menarche is the first period.".to_string(), "module", 0, 1),
                Chunk::new("Eat iron-rich food.".to_string(), "module", 1, 2),
            ],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        )
        .unwrap();

        let embeddings = EmbeddingProvider::new(&EmbeddingsConfig {
            model: "cohere/embed-english-v3.0".to_string(),
            api_key: Some("test-key".to_string()),
            base_url: Some(server.uri()),
            batch_size: 8,
            timeout_secs: 5,
            max_retries: 0,
        })
        .unwrap();

        let config = llm_config(&server.uri());
        RetrievalQa::new(
            Arc::new(index),
            embeddings,
            LlmProvider::new(&config),
            mode,
            &config,
        )
    }

    #[test]
    fn test_grounded_answer_substitutes_fallback() {
        let answer = Answer {
            answer: "Made up answer".to_string(),
            sources: vec![],
        };
        assert_eq!(answer.grounded(), NOT_FOUND_MESSAGE);
    }

    #[test]
    fn test_retrieval_mode_from_config() {
        let mut config = IndexConfig {
            path: "vectorstore.index".to_string(),
            top_k: 3,
            score_threshold: None,
        };
        assert!(matches!(
            RetrievalMode::from_config(&config),
            RetrievalMode::TopK { k: 3 }
        ));

        config.score_threshold = Some(0.5);
        assert!(matches!(
            RetrievalMode::from_config(&config),
            RetrievalMode::Threshold { k: 3, .. }
        ));
    }

    #[tokio::test]
    async fn test_answer_passes_retrieved_context_to_model() {
        let server = mock_server(vec![1.0, 0.1], "It is the first period.").await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("Menarche is the first period."))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("It is the first period.")),
            )
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        let qa = qa(&server, RetrievalMode::TopK { k: 1 });
        let answer = qa.answer("What is menarche?").await.unwrap();

        assert_eq!(answer.answer, "It is the first period.");
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].chunk.position, 0);
        assert_eq!(answer.grounded(), "It is the first period.");
    }

    #[tokio::test]
    async fn test_threshold_mode_can_retrieve_nothing() {
        let server = mock_server(vec![-1.0, -1.0], "Something unrelated").await;

        let qa = qa(
            &server,
            RetrievalMode::Threshold {
                k: 2,
                min_score: 0.5,
            },
        );
        let answer = qa.answer("Who won the football match?").await.unwrap();

        assert!(answer.sources.is_empty());
        assert_eq!(answer.grounded(), NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn test_unavailable_llm_is_error() {
        let server = mock_server(vec![1.0, 0.0], "unused").await;
        let mut qa = qa(&server, RetrievalMode::TopK { k: 1 });
        qa.llm = LlmProvider::unavailable("no key");

        let result = qa.answer("question").await;
        assert!(matches!(
            result,
            Err(crate::error::AppError::LlmUnavailable(_))
        ));
    }
}
