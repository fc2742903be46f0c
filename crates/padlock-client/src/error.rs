//! Error types for lock client operations.

use padlock_transport::TransportError;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while running a lock session.
///
/// The public [`LockClient`](crate::LockClient) operations only ever return
/// [`Validation`](ClientError::Validation) and [`Timeout`](ClientError::Timeout);
/// transport-level failures are absorbed into an absent result.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed key, password, address or frame, detected before any I/O
    #[error("Validation error: {0}")]
    Validation(#[from] padlock_core::Error),

    /// A command or the notification handshake got no answer in time
    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout {
        operation: &'static str,
        duration_ms: u64,
    },

    /// The radio link failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The peripheral refused a step of the session setup
    #[error("Session aborted: {0}")]
    Aborted(String),
}

impl ClientError {
    /// Create a new timeout error.
    pub fn timeout(operation: &'static str, duration: std::time::Duration) -> Self {
        Self::Timeout {
            operation,
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Create a new aborted error.
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted(reason.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether the error comes from the link rather than the caller's input
    /// or the clock.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Aborted(_))
    }
}
