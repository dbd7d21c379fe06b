// ABOUTME: Process settings read from environment variables.
// ABOUTME: Only the assistant path requires GEMINI_API_KEY; everything else has a default.

use std::time::Duration;

use smartyshop_assistant::{AssistantClient, AssistantError, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use smartyshop_scrapers::{HttpFetcher, ScrapeError, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "GEMINI_MODEL";
pub const ENV_ENDPOINT: &str = "GEMINI_ENDPOINT";
pub const ENV_USER_AGENT: &str = "SMARTYSHOP_USER_AGENT";
pub const ENV_TIMEOUT_SECS: &str = "SMARTYSHOP_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("{name} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { name: &'static str, value: String },

    #[error("could not build the page fetcher")]
    Fetcher(#[source] ScrapeError),

    #[error("could not build the assistant client")]
    Assistant(#[source] AssistantError),
}

#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`. Empty values count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let timeout = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => parse_timeout(ENV_TIMEOUT_SECS, &raw)?,
            None => defaults.timeout,
        };

        Ok(Self {
            api_key: get(ENV_API_KEY),
            model: get(ENV_MODEL).unwrap_or(defaults.model),
            endpoint: get(ENV_ENDPOINT).unwrap_or(defaults.endpoint),
            user_agent: get(ENV_USER_AGENT).unwrap_or(defaults.user_agent),
            timeout,
        })
    }

    /// The API key, or the error the assistant path reports at startup.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    pub fn http_fetcher(&self) -> Result<HttpFetcher, ConfigError> {
        HttpFetcher::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ConfigError::Fetcher)
    }

    pub fn assistant_client(&self) -> Result<AssistantClient, ConfigError> {
        AssistantClient::builder()
            .api_key(self.require_api_key()?)
            .model(&self.model)
            .endpoint(&self.endpoint)
            .timeout(self.timeout)
            .build()
            .map_err(ConfigError::Assistant)
    }
}

fn parse_timeout(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            name,
            value: raw.to_string(),
        }),
    }
}
