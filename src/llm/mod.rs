pub mod chat;

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }
}

/// Why a remote API call did not produce a usable answer.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No usable API key configured")]
    MissingCredential,

    #[error("Authentication rejected ({status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Remote API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Remote API returned no choices")]
    EmptyResponse,

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl LlmError {
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => LlmError::Authentication { status, message },
            429 => LlmError::RateLimited(message),
            _ => LlmError::Status { status, message },
        }
    }

    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Network(e) => !e.is_decode() && !e.is_builder(),
            LlmError::RateLimited(_) => true,
            LlmError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
