//! Summarization pipeline.
//!
//! Orchestrates the cache, the cost controller, and the resilience layer
//! around the LLM call:
//!
//! cache lookup -> admission check -> resilient model call -> cache write
//! and usage commit.
//!
//! A cache hit short-circuits before admission, so an already-summarized
//! article is served even when the budget is exhausted. Every failure mode
//! degrades to `None`; callers only ever see summary-or-absent.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cache::TtlCache;
use crate::cost::{CostConfig, CostController, CostMetrics};
use crate::llm::{CompletionRequest, SummaryModel};
use crate::models::Article;
use crate::resilience::{CircuitStatus, ResilienceConfig, ResilienceManager};

/// Character budget for article content inside the prompt.
const CONTENT_CHAR_BUDGET: usize = 2500;

/// Summaries stay cached for a week.
const SUMMARY_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const TEMPERATURE: f64 = 0.3;

const SYSTEM_PROMPT: &str = "You are a professional news summarizer. Create concise 2-3 sentence summaries that:
- Capture the main facts and key points
- Maintain neutral, objective tone
- Highlight significance or implications
- Avoid editorializing or adding opinions
- Use clear, accessible language";

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub max_tokens: u32,
    pub cost: CostConfig,
    pub resilience: ResilienceConfig,
    pub cache_ttl: Duration,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_tokens: 150,
            cost: CostConfig::default(),
            resilience: ResilienceConfig::default(),
            cache_ttl: SUMMARY_TTL,
        }
    }
}

pub struct Summarizer {
    model: Arc<dyn SummaryModel>,
    cost: CostController,
    resilience: ResilienceManager,
    cache: TtlCache,
    max_tokens: u32,
}

impl Summarizer {
    pub fn new(model: Arc<dyn SummaryModel>, config: SummarizerConfig) -> Self {
        Self {
            model,
            cost: CostController::new(config.cost),
            resilience: ResilienceManager::new(config.resilience),
            cache: TtlCache::new(config.cache_ttl),
            max_tokens: config.max_tokens,
        }
    }

    /// Summarize one article, or report it skipped (`None`). The reason for
    /// a skip (duplicate, budget, quality, circuit open, upstream error) is
    /// visible in the logs only.
    pub async fn summarize(&self, article: &Article) -> Option<String> {
        if let Some(cached) = self.cache.get(&article.url) {
            info!("cache hit for article: {}", article.short_title());
            return Some(cached);
        }

        if !self.cost.should_process(article).await {
            return None;
        }

        let request = self.build_request(article);
        info!("summarizing article: {}", article.short_title());

        let model = Arc::clone(&self.model);
        let completion = self
            .resilience
            .execute(|| {
                let model = Arc::clone(&model);
                let request = request.clone();
                async move { model.complete(&request).await }
            })
            .await?;

        let summary = completion.text.trim().to_string();
        self.cache.set(&article.url, summary.clone());
        self.cost
            .commit_usage(
                &article.url,
                completion.usage.prompt_tokens,
                completion.usage.completion_tokens,
            )
            .await;

        Some(summary)
    }

    pub async fn cost_metrics(&self) -> CostMetrics {
        self.cost.metrics().await
    }

    pub async fn resilience_status(&self) -> CircuitStatus {
        self.resilience.status().await
    }

    fn build_request(&self, article: &Article) -> CompletionRequest {
        let mut parts = vec![format!("TITLE: {}", article.title)];
        if let Some(description) = &article.description {
            parts.push(format!("DESCRIPTION: {description}"));
        }
        if let Some(content) = &article.content {
            parts.push(format!(
                "CONTENT: {}",
                truncate_at_sentence(content, CONTENT_CHAR_BUDGET)
            ));
        }
        let content = parts.join("\n\n");

        CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: format!(
                "Please analyze the following news content and provide a concise 2-3 sentence summary.\n\n\
                 Focus on:\n\
                 - The main event or discovery\n\
                 - Key facts and figures\n\
                 - Potential impact or significance\n\
                 - Any notable quotes or statements\n\n\
                 Write in clear, neutral journalistic style.\n\n\
                 CONTENT:\n{content}\n\nSUMMARY:"
            ),
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
        }
    }
}

/// Truncate to at most `max_chars` characters, preferring to cut at the
/// last sentence boundary (`.`, `?`, `!`) inside the window. Falls back to
/// a hard cut marked with an ellipsis.
fn truncate_at_sentence(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_chars).collect();
    let sentence_end = ['.', '?', '!']
        .iter()
        .filter_map(|c| truncated.rfind(*c))
        .max();

    match sentence_end {
        Some(idx) if idx > 0 => format!("{}..", &truncated[..=idx]),
        _ => format!("{truncated}..."),
    }
}
