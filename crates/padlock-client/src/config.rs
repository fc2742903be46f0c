//! Client configuration.
//!
//! ```
//! use padlock_client::ClientConfig;
//!
//! let config: ClientConfig = toml::from_str(r#"
//!     aes_key = "000102030405060708090a0b0c0d0e0f"
//!     response_timeout_ms = 8000
//! "#).unwrap();
//!
//! assert_eq!(config.response_timeout().as_millis(), 8000);
//! assert_eq!(config.subscribe_timeout().as_millis(), 3000);
//! ```

use padlock_core::constants::{
    DEFAULT_RESPONSE_TIMEOUT_MS, DEFAULT_SUBSCRIBE_TIMEOUT_MS, DEFAULT_UNSUBSCRIBE_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Configuration for [`LockClient`](crate::LockClient).
///
/// Missing fields take their defaults when deserializing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// AES-128 key as 32 hex characters
    pub aes_key: String,

    /// Budget from command write to response
    pub response_timeout_ms: u64,

    /// Window for the enable-notifications acknowledgement
    pub subscribe_timeout_ms: u64,

    /// Window for the disable-notifications acknowledgement during teardown
    pub unsubscribe_timeout_ms: u64,
}

impl ClientConfig {
    /// Configuration with `aes_key` and default timeouts.
    pub fn new(aes_key: impl Into<String>) -> Self {
        Self {
            aes_key: aes_key.into(),
            ..Self::default()
        }
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    pub fn subscribe_timeout(&self) -> Duration {
        Duration::from_millis(self.subscribe_timeout_ms)
    }

    pub fn unsubscribe_timeout(&self) -> Duration {
        Duration::from_millis(self.unsubscribe_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            aes_key: String::new(),
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            subscribe_timeout_ms: DEFAULT_SUBSCRIBE_TIMEOUT_MS,
            unsubscribe_timeout_ms: DEFAULT_UNSUBSCRIBE_TIMEOUT_MS,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("aes_key", &"<redacted>")
            .field("response_timeout_ms", &self.response_timeout_ms)
            .field("subscribe_timeout_ms", &self.subscribe_timeout_ms)
            .field("unsubscribe_timeout_ms", &self.unsubscribe_timeout_ms)
            .finish()
    }
}
