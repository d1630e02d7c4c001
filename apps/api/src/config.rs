use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Everything has a default; Redis and the LLM key are optional and switch the
/// service to its in-memory store and offline generator when absent.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub redis_url: Option<String>,
    pub store_key_prefix: String,
    pub anthropic_api_key: Option<String>,
    pub persist_debounce: Duration,
    pub generation_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            port: optional("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            redis_url: optional("REDIS_URL"),
            store_key_prefix: lookup("STORE_KEY_PREFIX")
                .unwrap_or_else(|| "resume-editor:".to_string()),
            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            persist_debounce: Duration::from_millis(
                optional("PERSIST_DEBOUNCE_MS")
                    .unwrap_or_else(|| "3000".to_string())
                    .parse::<u64>()
                    .context("PERSIST_DEBOUNCE_MS must be a whole number of milliseconds")?,
            ),
            generation_timeout: Duration::from_secs(
                optional("GENERATION_TIMEOUT_SECS")
                    .unwrap_or_else(|| "60".to_string())
                    .parse::<u64>()
                    .context("GENERATION_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
        })
    }
}
