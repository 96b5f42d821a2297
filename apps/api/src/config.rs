use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Optional at startup. A missing key only fails the first generation call.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: match optional_env("MAX_UPLOAD_BYTES") {
                Some(raw) => raw
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a positive integer")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads a variable, treating an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
