//! Application settings loaded from the environment.

use std::str::FromStr;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub newsapi_key: String,
    pub openai_api_key: String,
    pub newsapi_base_url: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub max_tokens: u32,
    pub daily_budget: f64,
    pub bind_addr: String,
}

impl Config {
    /// Load settings. The two API keys are required; everything else has a
    /// sensible default.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            newsapi_key: require("NEWSAPI_KEY")?,
            openai_api_key: require("OPENAI_API_KEY")?,
            newsapi_base_url: env_or("NEWSAPI_BASE_URL", "https://newsapi.org/v2"),
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            openai_model: env_or("OPENAI_MODEL", "gpt-3.5-turbo"),
            max_tokens: parse_or("MAX_TOKENS", 150)?,
            daily_budget: parse_or("DAILY_BUDGET", 1.0)?,
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8000"),
        })
    }
}

fn require(key: &str) -> anyhow::Result<String> {
    std::env::var(key).with_context(|| format!("missing required environment variable {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}")),
        Err(_) => Ok(default),
    }
}
