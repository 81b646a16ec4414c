//! Process configuration resolved once at startup

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";
pub const DEFAULT_MODEL: &str = "grok-4-latest";
pub const DEFAULT_PORT: u16 = 8000;
/// Sessions untouched for this many minutes are dropped
pub const DEFAULT_SESSION_IDLE_MINUTES: u32 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("XAI_API_KEY is not set. Configure it before starting the server.")]
    MissingApiKey,
    #[error("Invalid {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Configuration for the server and the completion gateway
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub port: u16,
    pub session_idle_minutes: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("XAI_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        let port = match get("CIVICS_PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: "CIVICS_PORT",
                    value,
                })?,
            None => DEFAULT_PORT,
        };

        let session_idle_minutes = match get("CIVICS_SESSION_IDLE_MINUTES") {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "CIVICS_SESSION_IDLE_MINUTES",
                    value,
                })?,
            None => DEFAULT_SESSION_IDLE_MINUTES,
        };

        Ok(Self {
            api_key,
            base_url: get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            port,
            session_idle_minutes,
        })
    }
}
