use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Client configuration loaded from environment variables.
/// Fails at startup if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the recruitment service, e.g. `https://host/functions/v1/server`.
    pub api_base_url: String,
    /// Public anonymous key used as bearer for registration and sign-in.
    pub anon_key: String,
    pub session_dir: PathBuf,
    pub download_dir: PathBuf,
    pub http_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: require_env("RECRUIT_API_URL")?
                .trim_end_matches('/')
                .to_string(),
            anon_key: std::env::var("RECRUIT_ANON_KEY").unwrap_or_default(),
            session_dir: std::env::var("RECRUIT_SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".recruit")),
            download_dir: std::env::var("RECRUIT_DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            http_timeout_secs: std::env::var("RECRUIT_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("RECRUIT_HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
