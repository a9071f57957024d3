//! Error taxonomy for LLM calls.
//!
//! The resilience layer retries only what this module classifies as
//! transient: rate limits and server-side errors. Everything else aborts
//! the attempt loop.

use thiserror::Error;

use crate::resilience::{FailureClass, UpstreamError};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("rate limited by upstream")]
    RateLimited,

    #[error("upstream server error (status {0})")]
    Server(u16),

    #[error("upstream client error (status {0})")]
    Client(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response from upstream: {0}")]
    InvalidResponse(String),
}

impl UpstreamError for LlmError {
    fn classify(&self) -> FailureClass {
        match self {
            Self::RateLimited | Self::Server(_) => FailureClass::Transient,
            Self::Client(_) | Self::Network(_) | Self::InvalidResponse(_) => {
                FailureClass::Permanent
            }
        }
    }
}

/// Map a non-success HTTP status onto the taxonomy.
pub fn classify_http_status(status: u16) -> LlmError {
    match status {
        429 => LlmError::RateLimited,
        s if s >= 500 => LlmError::Server(s),
        s => LlmError::Client(s),
    }
}
