use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};

use crate::config::{default_base_url, parse_provider_model, EmbeddingsConfig};
use crate::error::{AppError, Result};

use super::api::{ApiConfig, EmbeddingApiClient};

#[derive(Clone)]
enum EmbeddingBackend {
    Local {
        model: Arc<Mutex<TextEmbedding>>,
    },
    Api {
        client: EmbeddingApiClient,
    },
}

/// Embedding collaborator for chunks and queries.
///
/// `local/...` (or an unprefixed name) runs a fastembed model in-process;
/// any other known provider goes through its OpenAI-compatible HTTP API.
#[derive(Clone)]
pub struct EmbeddingProvider {
    backend: EmbeddingBackend,
    model: String,
    batch_size: usize,
}

impl EmbeddingProvider {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let (provider, model_name) = parse_provider_model(&config.model);

        let backend = if provider.eq_ignore_ascii_case("local") {
            EmbeddingBackend::Local {
                model: Arc::new(Mutex::new(build_model(resolve_embedding_model(
                    model_name,
                ))?)),
            }
        } else {
            let needs_api_key = !matches!(
                provider.to_lowercase().as_str(),
                "ollama" | "lmstudio"
            );
            if needs_api_key && config.api_key.is_none() {
                return Err(AppError::Embedding(format!(
                    "API key required for embedding provider '{provider}'"
                )));
            }

            let client = EmbeddingApiClient::new(ApiConfig {
                base_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| default_base_url(provider).to_string()),
                api_key: config.api_key.clone(),
                model: model_name.to_string(),
                timeout_secs: config.timeout_secs,
                max_retries: config.max_retries,
            })?;
            EmbeddingBackend::Api { client }
        };

        Ok(Self {
            backend,
            model: config.model.clone(),
            batch_size: config.batch_size.max(1),
        })
    }

    /// Configured model name, including the provider prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embed corpus passages in batches, preserving input order.
    pub async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for (i, batch) in texts.chunks(self.batch_size).enumerate() {
            tracing::debug!(batch = i, size = batch.len(), "Embedding document batch");
            let prepared = match self.backend {
                EmbeddingBackend::Local { .. } => {
                    // Local models use passage: prefix
                    batch.iter().map(|t| format!("passage: {t}")).collect()
                }
                EmbeddingBackend::Api { .. } => batch.to_vec(),
            };
            let mut embedded = self.embed_raw(prepared).await?;
            all_embeddings.append(&mut embedded);
            tokio::task::yield_now().await;
        }

        Ok(all_embeddings)
    }

    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let text = match self.backend {
            // Local models use query: prefix
            EmbeddingBackend::Local { .. } => format!("query: {query}"),
            EmbeddingBackend::Api { .. } => query.to_string(),
        };

        self.embed_raw(vec![text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding("No embedding generated".to_string()))
    }

    async fn embed_raw(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        match &self.backend {
            EmbeddingBackend::Local { model } => {
                let model = Arc::clone(model);
                let batch_size = self.batch_size;
                tokio::task::spawn_blocking(move || {
                    let mut model = model.lock().map_err(|e| {
                        AppError::Embedding(format!("Embedding model lock poisoned: {e}"))
                    })?;
                    model
                        .embed(texts, Some(batch_size))
                        .map_err(|e| AppError::Embedding(e.to_string()))
                })
                .await
                .map_err(|e| AppError::Embedding(format!("Embedding worker failed: {e}")))?
            }
            EmbeddingBackend::Api { client } => {
                let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
                client.embed(&refs).await
            }
        }
    }
}

fn resolve_embedding_model(model_name: &str) -> EmbeddingModel {
    match model_name {
        "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
        "BAAI/bge-base-en-v1.5" | "bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
        "BAAI/bge-large-en-v1.5" | "bge-large-en-v1.5" => EmbeddingModel::BGELargeENV15,
        "all-MiniLM-L6-v2" | "sentence-transformers/all-MiniLM-L6-v2" => {
            EmbeddingModel::AllMiniLML6V2
        }
        "nomic-embed-text-v1.5" | "nomic-ai/nomic-embed-text-v1.5" => {
            EmbeddingModel::NomicEmbedTextV15
        }
        other => {
            tracing::warn!("Unknown local embedding model '{}', using bge-small-en-v1.5", other);
            EmbeddingModel::BGESmallENV15
        }
    }
}

fn build_model(embedding_model: EmbeddingModel) -> Result<TextEmbedding> {
    TextEmbedding::try_new(InitOptions::new(embedding_model).with_show_download_progress(true))
        .map_err(|e| AppError::Embedding(e.to_string()))
}
