//! Notification sink configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Default whole-request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 20_000;

/// Where and as whom lock events are reported.
///
/// # Example
///
/// ```
/// use padlock_notify::NotifyConfig;
///
/// let config: NotifyConfig = toml::from_str(r#"
///     base_url = "https://backoffice.example.com/"
///     api_key = "sk_test_123"
///     user_id = "42"
/// "#).unwrap();
///
/// assert_eq!(config.connect_timeout().as_secs(), 10);
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Base URL of the back office, with or without trailing slash
    pub base_url: String,

    /// Value of the `X-API-Key` header
    pub api_key: String,

    /// User the events are attributed to
    pub user_id: String,

    pub connect_timeout_ms: u64,

    /// Budget for the whole request, connect included
    pub request_timeout_ms: u64,
}

impl NotifyConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            user_id: "1".to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}
