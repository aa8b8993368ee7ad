use std::env;

const DEFAULT_LLM_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_LLM_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_SEARCH_ENDPOINT: &str = "https://google.serper.dev/search";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} not set. Get one at {hint}")]
    MissingKey {
        var: &'static str,
        hint: &'static str,
    },

    #[error("invalid endpoint in {var}: {source}")]
    InvalidEndpoint {
        var: &'static str,
        source: url::ParseError,
    },
}

#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: ApiKey,
    pub endpoint: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: ApiKey,
    pub endpoint: String,
}

/// Service credentials and endpoints, read from the environment:
/// - `GEMINI_API_KEY` (required), `GEMINI_MODEL`, `GEMINI_ENDPOINT`
/// - `SERPER_API_KEY` (required), `SERPER_ENDPOINT`
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub search: SearchConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let llm_key = var("GEMINI_API_KEY").ok_or(ConfigError::MissingKey {
            var: "GEMINI_API_KEY",
            hint: "https://aistudio.google.com/apikey",
        })?;
        let search_key = var("SERPER_API_KEY").ok_or(ConfigError::MissingKey {
            var: "SERPER_API_KEY",
            hint: "https://serper.dev",
        })?;

        let llm_endpoint = endpoint(
            "GEMINI_ENDPOINT",
            var("GEMINI_ENDPOINT").as_deref(),
            DEFAULT_LLM_ENDPOINT,
        )?;
        let search_endpoint = endpoint(
            "SERPER_ENDPOINT",
            var("SERPER_ENDPOINT").as_deref(),
            DEFAULT_SEARCH_ENDPOINT,
        )?;

        Ok(Self {
            llm: LlmConfig {
                api_key: ApiKey::new(llm_key),
                endpoint: llm_endpoint,
                model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            },
            search: SearchConfig {
                api_key: ApiKey::new(search_key),
                endpoint: search_endpoint,
            },
        })
    }
}

fn endpoint(
    var: &'static str,
    value: Option<&str>,
    default: &str,
) -> Result<String, ConfigError> {
    let raw = value.unwrap_or(default);
    url::Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { var, source })?;
    Ok(raw.trim_end_matches('/').to_string())
}
