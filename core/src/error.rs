//! Error types for the HTTP request pipeline

use thiserror::Error;

/// Errors that can occur while performing an HTTP request on behalf of a tool call
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// The supplied URL is not a well-formed absolute URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A parameter violated the declared tool input shape
    #[error("Invalid parameter: {0}")]
    InvalidParams(String),

    /// A single attempt exceeded its deadline
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured per-attempt timeout in milliseconds
        timeout_ms: u64,
    },

    /// The request failed at the transport level (DNS, connect, TLS, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Every attempt failed; wraps the error from the last one
    #[error("All {attempts} attempts failed: {last}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error from the final attempt
        last: Box<RequestError>,
    },
}

impl RequestError {
    /// Stable key for the error-count histogram.
    ///
    /// Deliberately free of per-request detail (URLs, durations) so repeated
    /// failures of the same kind aggregate under one entry. Exhausted retries
    /// count under the root cause, not the wrapper.
    #[must_use]
    pub fn stat_key(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid url",
            Self::InvalidParams(_) => "invalid parameters",
            Self::Timeout { .. } => "timeout",
            Self::Network(_) => "network error",
            Self::RetriesExhausted { last, .. } => last.stat_key(),
        }
    }

    /// Whether another attempt could change the outcome.
    ///
    /// Validation failures are final; transport and deadline failures are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Network(_))
    }
}
