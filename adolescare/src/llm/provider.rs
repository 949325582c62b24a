use crate::config::{parse_llm_provider_model, LlmConfig};
use crate::error::{AppError, Result};
use crate::llm::api::LlmApiClient;

/// Where completions are sent, decided from the `provider/model` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    /// Cohere through its OpenAI compatibility API.
    Cohere,
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

impl LlmBackend {
    /// `None` when the prefix is unknown and no endpoint is configured.
    fn detect(config: &LlmConfig) -> Option<Self> {
        let (provider, _) = parse_llm_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "openai" => LlmBackend::OpenAI,
            "openrouter" => LlmBackend::OpenRouter,
            "ollama" => LlmBackend::Ollama,
            "lmstudio" => LlmBackend::LmStudio,
            "cohere" => LlmBackend::Cohere,
            _ => LlmBackend::OpenAICompatible {
                base_url: config.base_url.clone()?,
            },
        };
        Some(backend)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LlmBackend::OpenAI => "openai",
            LlmBackend::OpenRouter => "openrouter",
            LlmBackend::Ollama => "ollama",
            LlmBackend::LmStudio => "lmstudio",
            LlmBackend::Cohere => "cohere",
            LlmBackend::OpenAICompatible { .. } => "openai-compatible",
            LlmBackend::Unavailable { .. } => "unavailable",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
}

impl CompletionOptions {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
        }
    }
}

/// Chat model shared by answering and title generation.
///
/// An unavailable provider still constructs; every call then fails with
/// [`AppError::LlmUnavailable`], which the API maps to 503.
#[derive(Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    model: Option<String>,
    client: Option<LlmApiClient>,
}

impl LlmProvider {
    pub fn new(config: &LlmConfig) -> Self {
        let Some(backend) = LlmBackend::detect(config) else {
            return Self::unavailable(&format!("Unknown provider in model: {}", config.model));
        };

        match LlmApiClient::new(config) {
            Ok(client) => {
                tracing::info!(provider = backend.name(), model = %config.model, "LLM configured");
                Self {
                    backend,
                    model: Some(config.model.clone()),
                    client: Some(client),
                }
            }
            Err(e) => Self::unavailable(&e.to_string()),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            model: None,
            client: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    /// Configured `provider/model` string, if a client was built.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub async fn complete(
        &self,
        prompt: &str,
        options: Option<&CompletionOptions>,
    ) -> Result<String> {
        let Some(client) = &self.client else {
            let reason = match &self.backend {
                LlmBackend::Unavailable { reason } => reason.clone(),
                _ => "No LLM client configured".to_string(),
            };
            return Err(AppError::LlmUnavailable(reason));
        };

        client.complete(prompt, options).await
    }
}
