use anyhow::{Context, Result};

/// Application configuration loaded from environment variables, built once at
/// startup and passed by reference. No module reads the environment directly.
///
/// Store credentials are optional: their absence silently disables the
/// persistence gateway. The LLM key is also optional at startup, but its
/// absence is a fatal configuration error at generation time.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_api_url: optional_env("OPENAI_API_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads an environment variable, treating blank values as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
