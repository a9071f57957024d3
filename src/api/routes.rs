//! Route handlers and server wiring.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::news::NewsFetcher;
use crate::summarizer::Summarizer;

use super::types::{
    CostMetricsResponse, DigestResponse, HealthResponse, SummarizedArticle, SystemStatusResponse,
};

/// Shared state behind every handler.
pub struct AppState {
    pub fetcher: NewsFetcher,
    pub summarizer: Summarizer,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/news/:topic", get(get_news))
        .route("/cost-metrics", get(cost_metrics))
        .route("/system-status", get(system_status))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(state: Arc<AppState>, bind_addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("listening on {bind_addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "News Digest API is running",
    })
}

async fn get_news(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
) -> Json<DigestResponse> {
    let articles = state.fetcher.fetch_articles(&topic).await;
    let article_count = articles.len();

    let mut summarized = Vec::new();
    let mut skipped_count = 0;
    for article in articles {
        match state.summarizer.summarize(&article).await {
            Some(ai_summary) => summarized.push(SummarizedArticle {
                article,
                ai_summary,
            }),
            None => skipped_count += 1,
        }
    }

    let cost_metrics = state.summarizer.cost_metrics().await;
    Json(DigestResponse {
        topic,
        article_count,
        summarized_count: summarized.len(),
        skipped_count,
        cost_metrics,
        articles: summarized,
    })
}

async fn cost_metrics(State(state): State<Arc<AppState>>) -> Json<CostMetricsResponse> {
    Json(CostMetricsResponse {
        cost: state.summarizer.cost_metrics().await,
        resilience: state.summarizer.resilience_status().await,
    })
}

async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatusResponse> {
    Json(SystemStatusResponse {
        status: "healthy",
        timestamp: Utc::now(),
        cost_metrics: state.summarizer.cost_metrics().await,
        resilience_metrics: state.summarizer.resilience_status().await,
        version: env!("CARGO_PKG_VERSION"),
    })
}
