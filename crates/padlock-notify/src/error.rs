//! Error types for the notification client.

use thiserror::Error;

/// Errors constructing a [`NotifyClient`](crate::NotifyClient).
///
/// Request failures are not errors; they are reported as
/// [`NotifyOutcome::Error`](crate::NotifyOutcome::Error).
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Base URL missing or not http(s)
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// API key cannot be sent as a header value
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(String),
}
