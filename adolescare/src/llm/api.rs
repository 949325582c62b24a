use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse,
    },
    Client,
};

use crate::{
    config::{default_base_url, parse_llm_provider_model, LlmConfig},
    error::{AppError, Result},
    llm::provider::CompletionOptions,
    retry::{with_retries, Failure},
};

#[derive(Debug, Clone)]
struct ApiConfig {
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout_secs: u64,
    max_retries: u32,
}

/// Chat-completion client for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct LlmApiClient {
    client: Client<OpenAIConfig>,
    config: ApiConfig,
}

impl LlmApiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_config = ApiConfig::from_llm_config(config);

        let (provider, _) = parse_llm_provider_model(&config.model);
        let keyless = matches!(
            provider.to_lowercase().as_str(),
            "ollama" | "local" | "lmstudio"
        );
        if !keyless && api_config.api_key.is_none() {
            return Err(AppError::LlmUnavailable(format!(
                "API key required for LLM provider '{provider}'"
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api_config.timeout_secs))
            .build()
            .map_err(|error| AppError::Llm(format!("Failed to create LLM HTTP client: {error}")))?;

        // async-openai retries 5xx and 429 internally; `complete` owns retries instead.
        let no_internal_retries = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        let client = Client::with_config(
            OpenAIConfig::new()
                .with_api_base(api_config.base_url.clone())
                .with_api_key(api_config.api_key.clone().unwrap_or_default()),
        )
        .with_http_client(http_client)
        .with_backoff(no_internal_retries);

        Ok(Self {
            client,
            config: api_config,
        })
    }

    /// Send `prompt` as a single user message and return the reply text.
    pub async fn complete(
        &self,
        prompt: &str,
        options: Option<&CompletionOptions>,
    ) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(AppError::Validation("Prompt cannot be empty".to_string()));
        }

        let request = self.build_request(prompt, options)?;

        let response = with_retries(self.config.max_retries, "chat completion", || async {
            self.client
                .chat()
                .create(request.clone())
                .await
                .map_err(classify_error)
        })
        .await?;

        reply_text(response)
    }

    fn build_request(
        &self,
        prompt: &str,
        options: Option<&CompletionOptions>,
    ) -> Result<CreateChatCompletionRequest> {
        let messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|error| AppError::Validation(format!("Invalid user prompt: {error}")))?
                .into()];

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(self.config.model.clone()).messages(messages);

        if let Some(temperature) = options.and_then(|o| o.temperature) {
            request.temperature(temperature);
        }

        request.build().map_err(|error| {
            AppError::Validation(format!("Invalid LLM completion request: {error}"))
        })
    }
}

fn reply_text(response: CreateChatCompletionResponse) -> Result<String> {
    let Some(choice) = response.choices.into_iter().next() else {
        return Err(AppError::Llm("LLM response contained no choices".to_string()));
    };

    match choice.message.content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AppError::Llm(
            "LLM response contained empty content".to_string(),
        )),
    }
}

/// Map an async-openai failure onto the crate error and decide whether
/// another attempt is worthwhile. Throttling and credential errors are final.
fn classify_error(error: OpenAIError) -> Failure {
    match error {
        OpenAIError::Reqwest(err) => match err.status() {
            Some(reqwest::StatusCode::TOO_MANY_REQUESTS) => {
                Failure::Fatal(AppError::LlmRateLimit { retry_after: None })
            }
            Some(reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN) => {
                Failure::Fatal(AppError::ApiAuth(format!("LLM authentication failed: {err}")))
            }
            Some(status) if !status.is_server_error() => {
                Failure::Fatal(AppError::Llm(format!("LLM request failed: {err}")))
            }
            // 5xx, timeouts and connection errors
            _ => Failure::Transient(AppError::Llm(format!("LLM request failed: {err}"))),
        },
        OpenAIError::ApiError(api_error) => classify_api_error(api_error),
        OpenAIError::JSONDeserialize(err) => {
            Failure::Fatal(AppError::Llm(format!("Failed to parse LLM response: {err}")))
        }
        OpenAIError::InvalidArgument(message) => Failure::Fatal(AppError::Validation(message)),
        other => Failure::Fatal(AppError::Llm(other.to_string())),
    }
}

fn classify_api_error(api_error: ApiError) -> Failure {
    let message = api_error.message.to_lowercase();
    let kind = api_error.r#type.as_deref().unwrap_or_default().to_lowercase();
    let code = api_error.code.as_deref().unwrap_or_default().to_lowercase();

    let throttled = message.contains("rate limit")
        || message.contains("too many requests")
        || kind.contains("rate_limit")
        || code.contains("rate_limit")
        || code == "insufficient_quota";
    if throttled {
        return Failure::Fatal(AppError::LlmRateLimit { retry_after: None });
    }

    let rejected_credentials = message.contains("unauthorized")
        || message.contains("forbidden")
        || message.contains("invalid api key")
        || code.contains("invalid_api_key")
        || kind.contains("authentication");
    if rejected_credentials {
        return Failure::Fatal(AppError::ApiAuth(format!(
            "LLM authentication failed: {api_error}"
        )));
    }

    // Bodies without a type or code are what 5xx responses produce.
    let untyped = api_error.r#type.is_none() && api_error.code.is_none();
    let error = AppError::Llm(format!("LLM API error: {api_error}"));
    if untyped {
        Failure::Transient(error)
    } else {
        Failure::Fatal(error)
    }
}

impl ApiConfig {
    fn from_llm_config(config: &LlmConfig) -> Self {
        let (provider, model) = parse_llm_provider_model(&config.model);

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(provider).to_string());

        // a bare model name against a custom endpoint is sent as-is
        let model = if provider.eq_ignore_ascii_case("local") {
            config.model.clone()
        } else {
            model.to_string()
        };

        Self {
            base_url,
            api_key: config.api_key.clone(),
            model,
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        }
    }
}
