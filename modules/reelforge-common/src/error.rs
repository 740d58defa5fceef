use std::time::Duration;

use thiserror::Error;

/// Uniform error taxonomy for provider adapters. Every provider-specific
/// HTTP status and body shape is translated into one of these variants;
/// retryability is a property of the variant, not the provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Bad or missing credential. A configuration problem; retrying
    /// cannot change the outcome.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// Provider billing or credit exhausted.
    #[error("provider credits exhausted: {0}")]
    QuotaExhausted(String),

    /// Provider rejected the request parameters.
    #[error("provider rejected request: {0}")]
    InvalidRequest(String),

    /// Provider rate limit hit. Retryable after a short delay.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Transient provider-side failure (5xx, connect failure).
    #[error("provider unavailable (status {status}): {message}")]
    Unavailable { status: u16, message: String },

    /// Local per-call deadline exceeded.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Provider returned a success status but an unusable payload.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Only rate limits, transient provider failures, and timeouts are
    /// worth a second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited(_)
                | ProviderError::Unavailable { .. }
                | ProviderError::Timeout(_)
        )
    }

    /// Translate a non-success HTTP status plus response body into the
    /// taxonomy. Adapters refine this where a vendor deviates.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => ProviderError::Auth(message),
            402 => ProviderError::QuotaExhausted(message),
            400 | 422 => ProviderError::InvalidRequest(message),
            429 => ProviderError::RateLimited(message),
            _ => ProviderError::Unavailable { status, message },
        }
    }

    /// Rank used to pick the most actionable error out of a batch: a
    /// credential or billing problem tells the user more than a generic
    /// network failure.
    pub fn severity_rank(&self) -> u8 {
        match self {
            ProviderError::Auth(_) => 0,
            ProviderError::QuotaExhausted(_) => 1,
            ProviderError::InvalidRequest(_) => 2,
            ProviderError::RateLimited(_) => 3,
            ProviderError::MalformedResponse(_) => 4,
            ProviderError::Timeout(_) => 5,
            ProviderError::Unavailable { .. } => 6,
        }
    }
}
