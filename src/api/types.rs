//! Response types for the HTTP API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cost::CostMetrics;
use crate::models::Article;
use crate::resilience::CircuitStatus;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// An article that survived the pipeline, with its summary attached.
#[derive(Debug, Serialize)]
pub struct SummarizedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub ai_summary: String,
}

/// Response for `GET /news/{topic}`.
#[derive(Debug, Serialize)]
pub struct DigestResponse {
    pub topic: String,
    pub article_count: usize,
    pub summarized_count: usize,
    /// Articles skipped for cost, quality, duplication, or upstream failure.
    pub skipped_count: usize,
    pub cost_metrics: CostMetrics,
    pub articles: Vec<SummarizedArticle>,
}

/// Response for `GET /cost-metrics`.
#[derive(Debug, Serialize)]
pub struct CostMetricsResponse {
    #[serde(flatten)]
    pub cost: CostMetrics,
    pub resilience: CircuitStatus,
}

/// Response for `GET /system-status`.
#[derive(Debug, Serialize)]
pub struct SystemStatusResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub cost_metrics: CostMetrics,
    pub resilience_metrics: CircuitStatus,
    pub version: &'static str,
}
