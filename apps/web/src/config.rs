use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub webdriver_url: String,
    pub login_url: String,
    pub post_login_url: String,
    pub leads_api_url: String,
    pub leads_origin: String,
    pub session_cookie_name: String,
    pub login_timeout: Duration,
    pub cookie_settle: Duration,
    pub default_industry: String,
    pub default_location: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: env_or("GEMINI_MODEL", "gemma-3-27b-it"),
            gemini_api_base: env_or(
                "GEMINI_API_BASE",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            webdriver_url: env_or("WEBDRIVER_URL", "http://localhost:9515"),
            login_url: env_or("LOGIN_URL", "https://app.saasquatchleads.com/auth"),
            post_login_url: env_or("POST_LOGIN_URL", "https://app.saasquatchleads.com/"),
            leads_api_url: env_or(
                "LEADS_API_URL",
                "https://data.saasquatchleads.com/api/lead_scrape",
            ),
            leads_origin: env_or("LEADS_ORIGIN", "https://app.saasquatchleads.com"),
            session_cookie_name: env_or("SESSION_COOKIE_NAME", "session"),
            login_timeout: Duration::from_secs(parse_env("LOGIN_TIMEOUT_SECS", 15)?),
            cookie_settle: Duration::from_secs(parse_env("COOKIE_SETTLE_SECS", 3)?),
            default_industry: env_or("DEFAULT_INDUSTRY", "Software"),
            default_location: env_or("DEFAULT_LOCATION", "New York"),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
