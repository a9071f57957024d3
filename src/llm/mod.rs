//! LLM client module.
//!
//! A trait-based abstraction over summary-capable language models, with an
//! OpenAI-compatible chat-completions client as the primary implementation.

mod error;
mod openai;

pub use error::{classify_http_status, LlmError};
pub use openai::OpenAiClient;

use async_trait::async_trait;

/// Token usage reported by the upstream provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// A successful completion with its metered usage.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

/// One completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Trait for models that can produce a completion.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}
