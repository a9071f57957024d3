//! News digest API server entry point.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use news_digest::api::{serve, AppState};
use news_digest::config::Config;
use news_digest::cost::CostConfig;
use news_digest::llm::OpenAiClient;
use news_digest::news::NewsFetcher;
use news_digest::summarizer::{Summarizer, SummarizerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let model = Arc::new(OpenAiClient::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    )?);
    let summarizer = Summarizer::new(
        model,
        SummarizerConfig {
            max_tokens: config.max_tokens,
            cost: CostConfig {
                daily_budget: config.daily_budget,
                ..CostConfig::default()
            },
            ..SummarizerConfig::default()
        },
    );
    let fetcher = NewsFetcher::new(config.newsapi_key.clone(), config.newsapi_base_url.clone())?;

    let state = Arc::new(AppState {
        fetcher,
        summarizer,
    });
    serve(state, &config.bind_addr).await
}
