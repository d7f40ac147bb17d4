use serde::Deserialize;
use std::collections::HashMap;
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

/// Parse `AUTH_DEV_TOKENS` env var.
/// Format: comma-separated `token:subject` pairs, e.g. `local-dev:user-abc,ci:user-ci`
fn parse_dev_tokens() -> HashMap<String, String> {
    match env::var("AUTH_DEV_TOKENS") {
        Ok(val) if !val.is_empty() => val
            .split(',')
            .filter_map(|pair| {
                let mut parts = pair.splitn(2, ':');
                let token = parts.next()?.trim();
                let subject = parts.next()?.trim();
                if token.is_empty() || subject.is_empty() {
                    tracing::warn!(
                        "Invalid dev token pair '{}' in AUTH_DEV_TOKENS, skipping",
                        pair
                    );
                    None
                } else {
                    Some((token.to_string(), subject.to_string()))
                }
            })
            .collect(),
        _ => HashMap::new(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub pipeline: PipelineConfig,
    pub classifier: Option<ClassifierConfig>,
    pub llm: Option<LlmConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
}

/// Identity provider configuration.
///
/// Token verification is delegated to an external provider: either an
/// OIDC-style userinfo endpoint (`AUTH_USERINFO_URL`) or a static table of
/// development tokens (`AUTH_DEV_TOKENS`). When neither is set, all
/// protected routes reject with 401.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub userinfo_url: Option<String>,
    pub dev_tokens: HashMap<String, String>,
    pub timeout_secs: u64,
}

/// Emotion classification service configuration. Present iff
/// `CLASSIFIER_API_KEY` is set; without it every note settles to the
/// neutral fallback vector.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    pub url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    pub max_input_chars: usize,
}

/// LLM configuration for memory summarization and advice generation.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Thresholds and cadence for the note -> memory -> advice pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Notes batched into one memory summary.
    pub notes_per_memory: u32,
    /// Most recent memories included in advice context.
    pub memories_for_context: u32,
    /// Most recent notes included in advice context.
    pub recent_notes_for_context: u32,
    /// Notes since the last advice required before a new one may be generated.
    pub advice_note_threshold: u32,
    pub classify_poll_interval_secs: u64,
    pub advice_poll_interval_secs: u64,
    /// Pending notes picked up per classification pass.
    pub classify_batch_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("SOLACE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("SOLACE_PORT", 3000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:solace.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
            },
            auth: AuthConfig {
                userinfo_url: env::var("AUTH_USERINFO_URL").ok(),
                dev_tokens: parse_dev_tokens(),
                timeout_secs: parse_env_or("AUTH_TIMEOUT", 10),
            },
            pipeline: PipelineConfig {
                notes_per_memory: parse_env_or("NOTES_PER_MEMORY", 3),
                memories_for_context: parse_env_or("MEMORIES_FOR_CONTEXT", 5),
                recent_notes_for_context: parse_env_or("RECENT_NOTES_FOR_CONTEXT", 3),
                advice_note_threshold: parse_env_or("ADVICE_NOTE_THRESHOLD", 3),
                classify_poll_interval_secs: parse_env_or("CLASSIFY_POLL_INTERVAL_SECS", 5),
                advice_poll_interval_secs: parse_env_or("ADVICE_POLL_INTERVAL_SECS", 5),
                classify_batch_size: parse_env_or("CLASSIFY_BATCH_SIZE", 25),
            },
            classifier: env::var("CLASSIFIER_API_KEY").ok().map(|api_key| {
                ClassifierConfig {
                    url: env::var("CLASSIFIER_URL").unwrap_or_else(|_| {
                        "https://api-inference.huggingface.co/models/j-hartmann/emotion-english-distilroberta-base"
                            .to_string()
                    }),
                    api_key,
                    timeout_secs: parse_env_or("CLASSIFIER_TIMEOUT", 30),
                    max_retries: parse_env_or("CLASSIFIER_MAX_RETRIES", 3),
                    retry_delay_secs: parse_env_or("CLASSIFIER_RETRY_DELAY_SECS", 45),
                    max_input_chars: parse_env_or("CLASSIFIER_MAX_INPUT_CHARS", 500),
                }
            }),
            llm: env::var("LLM_MODEL").ok().map(|model| LlmConfig {
                model,
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 30),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 3),
                temperature: parse_env_or("LLM_TEMPERATURE", 0.7),
                max_tokens: parse_env_or("LLM_MAX_TOKENS", 200),
            }),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

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
