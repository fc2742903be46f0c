use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("Invalid AES key: {0}")]
    InvalidKey(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid device address: {0}")]
    InvalidAddress(String),

    // Protocol errors
    #[error("Invalid frame length: expected {expected} bytes, got {actual}")]
    InvalidFrameLength { expected: usize, actual: usize },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_length_message() {
        let error = Error::InvalidFrameLength {
            expected: 16,
            actual: 15,
        };
        assert_eq!(
            error.to_string(),
            "Invalid frame length: expected 16 bytes, got 15"
        );
    }

    #[test]
    fn test_state_transition_message() {
        let error = Error::InvalidStateTransition {
            from: "Closed".to_string(),
            to: "Ready".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid state transition from Closed to Ready"
        );
    }
}
