//! AI-powered news digest service.
//!
//! Fetches articles for a topic, filters and deduplicates them, summarizes
//! the survivors with a language model under a hard daily spending cap, and
//! serves the result over a small HTTP API.
//!
//! # Core pieces
//! - [`cache`]: time-bounded summary cache
//! - [`cost`]: admission control and spend metering
//! - [`resilience`]: retries, backoff, and a circuit breaker around the LLM
//! - [`summarizer`]: the pipeline tying the three together

pub mod api;
pub mod cache;
pub mod config;
pub mod cost;
pub mod llm;
pub mod models;
pub mod news;
pub mod resilience;
pub mod summarizer;
