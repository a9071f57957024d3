//! HTTP API for the news digest service.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /news/{topic}` - Fetch and summarize articles for a topic
//! - `GET /cost-metrics` - Current spend and circuit-breaker status
//! - `GET /system-status` - Combined health, cost, and resilience snapshot

mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
