use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub company_api_url: String,
    pub port: u16,
    pub rust_log: String,
    pub autosave_debounce: Duration,
    pub company_cache_ttl: Duration,
    pub company_quota_cooldown: Duration,
    pub preset_store_path: String,
    pub session_idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            company_api_url: require_env("COMPANY_API_URL")?,
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            autosave_debounce: Duration::from_millis(optional_env("AUTOSAVE_DEBOUNCE_MS", 800)?),
            company_cache_ttl: Duration::from_secs(optional_env("COMPANY_CACHE_TTL_SECS", 3600)?),
            company_quota_cooldown: Duration::from_secs(optional_env(
                "COMPANY_QUOTA_COOLDOWN_SECS",
                600,
            )?),
            preset_store_path: std::env::var("PRESET_STORE_PATH")
                .unwrap_or_else(|_| "presets.json".to_string()),
            session_idle_timeout: Duration::from_secs(optional_env("SESSION_IDLE_SECS", 1800)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
