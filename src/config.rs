//! Process configuration, read once at startup.

use secrecy::SecretString;

use crate::server::DEFAULT_MAX_IMAGE_CHARS;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub bind: String,
    pub max_image_chars: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("ATELIER_API_KEY")
            .map_err(|_| ConfigError::MissingVar("ATELIER_API_KEY"))?;
        let max_image_chars = match std::env::var("ATELIER_MAX_IMAGE_CHARS") {
            Ok(raw) => raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidVar("ATELIER_MAX_IMAGE_CHARS", e.to_string())
            })?,
            Err(_) => DEFAULT_MAX_IMAGE_CHARS,
        };
        Ok(Self {
            api_key: SecretString::from(api_key),
            base_url: env_or("ATELIER_BASE_URL", DEFAULT_BASE_URL),
            model: env_or("ATELIER_MODEL", DEFAULT_MODEL),
            bind: env_or("ATELIER_BIND", DEFAULT_BIND),
            max_image_chars,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
