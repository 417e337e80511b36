//! Generative service error types.

use climahealth_core::NetworkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
