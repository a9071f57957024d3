//! Cost controller - decides whether an article is worth spending money on
//! and meters cumulative spend against a rolling daily budget.
//!
//! # Admission order
//! 1. Window rollover (a new calendar day resets spend and dedup tracking)
//! 2. Duplicate check (already summarized this window)
//! 3. Budget check (daily cap reached)
//! 4. Quality gate (too little text, or clickbait title)
//!
//! Rollover runs first so the first article of a new day is judged against
//! the fresh window rather than yesterday's exhausted one.

use std::collections::HashSet;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::models::Article;

/// Minimum characters of content-or-description worth paying to summarize.
const MIN_CONTENT_LENGTH: usize = 200;

/// Title markers that disqualify an article outright.
const CLICKBAIT_MARKERS: [&str; 4] = ["SHOCKING", "YOU WON'T BELIEVE", "GURU", "SECRET"];

/// Budget and pricing knobs. Rates are per 1K tokens.
#[derive(Debug, Clone)]
pub struct CostConfig {
    pub daily_budget: f64,
    pub input_cost_per_1k: f64,
    pub output_cost_per_1k: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            daily_budget: 1.0,
            input_cost_per_1k: 0.0015,
            output_cost_per_1k: 0.0020,
        }
    }
}

/// Mutable budget window. Guarded by one mutex so a concurrent batch of
/// summarizations cannot race the check-then-spend sequence past the cap.
struct BudgetState {
    daily_spent: f64,
    window_start: NaiveDate,
    processed_keys: HashSet<String>,
}

/// Snapshot of the current window for the monitoring endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CostMetrics {
    pub daily_spent: f64,
    pub daily_budget: f64,
    pub remaining_budget: f64,
    pub window_start: NaiveDate,
}

pub struct CostController {
    config: CostConfig,
    state: Mutex<BudgetState>,
}

impl CostController {
    pub fn new(config: CostConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BudgetState {
                daily_spent: 0.0,
                window_start: Local::now().date_naive(),
                processed_keys: HashSet::new(),
            }),
        }
    }

    /// Should we spend money summarizing this article?
    pub async fn should_process(&self, article: &Article) -> bool {
        let mut state = self.state.lock().await;
        Self::roll_window(&mut state, Local::now().date_naive());

        if state.processed_keys.contains(&article.url) {
            info!("skipping duplicate article: {}", article.short_title());
            return false;
        }

        if state.daily_spent >= self.config.daily_budget {
            warn!(
                "daily budget exceeded: ${:.4}/{}",
                state.daily_spent, self.config.daily_budget
            );
            return false;
        }

        if !Self::passes_quality_gate(article) {
            info!("skipping low-quality article: {}", article.short_title());
            return false;
        }

        true
    }

    /// Charge the window for one completed call and mark the article
    /// processed, as a single step so the dedup entry can never be skipped.
    pub async fn commit_usage(&self, identity: &str, prompt_tokens: u64, completion_tokens: u64) {
        let prompt_cost = prompt_tokens as f64 / 1000.0 * self.config.input_cost_per_1k;
        let completion_cost = completion_tokens as f64 / 1000.0 * self.config.output_cost_per_1k;
        let total_cost = prompt_cost + completion_cost;

        let mut state = self.state.lock().await;
        Self::roll_window(&mut state, Local::now().date_naive());
        state.daily_spent += total_cost;
        state.processed_keys.insert(identity.to_string());

        info!(
            "api cost: ${:.6} (prompt: {}, completion: {})",
            total_cost, prompt_tokens, completion_tokens
        );
        info!(
            "daily total: ${:.4}/{}",
            state.daily_spent, self.config.daily_budget
        );
    }

    pub async fn metrics(&self) -> CostMetrics {
        let mut state = self.state.lock().await;
        Self::roll_window(&mut state, Local::now().date_naive());
        CostMetrics {
            daily_spent: round4(state.daily_spent),
            daily_budget: self.config.daily_budget,
            remaining_budget: round4(self.config.daily_budget - state.daily_spent),
            window_start: state.window_start,
        }
    }

    fn roll_window(state: &mut BudgetState, today: NaiveDate) {
        if today > state.window_start {
            state.daily_spent = 0.0;
            state.processed_keys.clear();
            state.window_start = today;
            info!("daily budget reset");
        }
    }

    fn passes_quality_gate(article: &Article) -> bool {
        if article.usable_text().chars().count() < MIN_CONTENT_LENGTH {
            debug!("article below minimum content length: {}", article.short_title());
            return false;
        }
        let title_upper = article.title.to_uppercase();
        if CLICKBAIT_MARKERS.iter().any(|m| title_upper.contains(m)) {
            debug!("clickbait title: {}", article.short_title());
            return false;
        }
        true
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
