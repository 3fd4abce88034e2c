use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default, so the service starts with no env at all.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Per-document extraction deadline in milliseconds.
    pub extraction_timeout_ms: u64,
    /// Multipart body size cap in bytes.
    pub max_upload_bytes: usize,
    /// Optional path to a JSON file overriding the built-in matching config.
    pub matching_config: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_parsed("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            extraction_timeout_ms: env_parsed("EXTRACTION_TIMEOUT_MS", 10_000)?,
            max_upload_bytes: env_parsed("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            matching_config: std::env::var("MATCHING_CONFIG").ok().map(PathBuf::from),
        })
    }
}

fn env_parsed<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
