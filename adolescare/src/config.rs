use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// First non-empty value among the given variables.
fn env_first(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| env::var(var).ok())
        .find(|val| !val.trim().is_empty())
}

/// Parse `DOCUMENT_PATHS`: comma-separated list of PDF paths.
fn parse_document_paths() -> Vec<String> {
    match env::var("DOCUMENT_PATHS") {
        Ok(val) if !val.trim().is_empty() => val
            .split(',')
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(String::from)
            .collect(),
        _ => DEFAULT_DOCUMENTS.iter().map(|p| p.to_string()).collect(),
    }
}

/// The corpus shipped with the service.
pub const DEFAULT_DOCUMENTS: &[&str] = &[
    "documents/dswd_teenage_pregnancy_guidelines.pdf",
    "documents/module_on_reproductive_health.pdf",
    "documents/operational_guidance_2014_eng_clinical_standards_manual_family_planning.pdf",
    "documents/POPCOMXII_AHDModule_Preventing_Teenage_Pregnancy.pdf",
    "documents/sexual_and_reproductive_health_and_rights_of_young_people_in_asia_and_the_pacific.pdf",
    "documents/sexual_and_reproductive_health_of_adolescents_and_youth_in_the_philippines.pdf",
    "documents/teenage_pregnancy.pdf",
    "documents/teenpreg.pdf",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub documents: DocumentsConfig,
    pub index: IndexConfig,
    pub embeddings: EmbeddingsConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DocumentsConfig {
    pub paths: Vec<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub path: String,
    pub top_k: usize,
    /// When set, retrieval drops chunks scoring below this cosine similarity.
    pub score_threshold: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub batch_size: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

/// LLM configuration for chat/completion models
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub temperature: f32,
    /// Sampling temperature for tip titles.
    pub title_temperature: f32,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub tips_path: String,
    pub insights_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("ADOLESCARE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("ADOLESCARE_PORT", 8000),
            },
            documents: DocumentsConfig {
                paths: parse_document_paths(),
                chunk_size: parse_env_or("CHUNK_SIZE", 1000),
                chunk_overlap: parse_env_or("CHUNK_OVERLAP", 200),
            },
            index: IndexConfig {
                path: env::var("VECTORSTORE_PATH")
                    .unwrap_or_else(|_| "vectorstore.index".to_string()),
                top_k: parse_env_or("RETRIEVAL_TOP_K", 3),
                score_threshold: parse_env_opt("RETRIEVAL_SCORE_THRESHOLD"),
            },
            embeddings: EmbeddingsConfig {
                model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "cohere/embed-english-v3.0".to_string()),
                api_key: env_first(&["EMBEDDING_API_KEY", "COHERE_API_KEY"]),
                base_url: env::var("EMBEDDING_BASE_URL").ok(),
                batch_size: parse_env_or("EMBEDDING_BATCH_SIZE", 96),
                timeout_secs: parse_env_or("EMBEDDING_TIMEOUT", 60),
                max_retries: parse_env_or("EMBEDDING_MAX_RETRIES", 0),
            },
            llm: LlmConfig {
                model: env::var("LLM_MODEL")
                    .unwrap_or_else(|_| "cohere/command-r-plus".to_string()),
                api_key: env_first(&["LLM_API_KEY", "COHERE_API_KEY"]),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 60),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 0),
                temperature: parse_env_or("LLM_TEMPERATURE", 0.0),
                title_temperature: parse_env_or("LLM_TITLE_TEMPERATURE", 0.2),
            },
            cache: CacheConfig {
                tips_path: env::var("TIP_CACHE_FILE").unwrap_or_else(|_| "tips.json".to_string()),
                insights_path: env::var("INSIGHT_CACHE_FILE")
                    .unwrap_or_else(|_| "insights.json".to_string()),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known embedding providers that use OpenAI-compatible APIs
pub const KNOWN_PROVIDERS: &[&str] = &[
    "openai",
    "openrouter",
    "ollama",
    "lmstudio",
    "cohere",
    "local",
];

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio", "cohere"];

/// Parse a model name into (provider, model) tuple.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        // Check if prefix is a known provider
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to local provider
    ("local", model)
}

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}

/// OpenAI-compatible base URL for a provider name.
pub fn default_base_url(provider: &str) -> &'static str {
    match provider.to_lowercase().as_str() {
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "lmstudio" => "http://localhost:1234/v1",
        "cohere" => "https://api.cohere.ai/compatibility/v1",
        _ => "https://api.openai.com/v1",
    }
}
