//! Back-office notification client.

use crate::config::NotifyConfig;
use crate::error::NotifyError;
use padlock_core::{DeviceAddress, DeviceStatus, LockState};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Status code reported when no HTTP response was received at all.
pub const NO_RESPONSE_CODE: i32 = -1;

/// Which event is being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockEvent {
    Unlocked,
    Locked,
}

impl LockEvent {
    /// Final path segment of the endpoint.
    pub fn path(&self) -> &'static str {
        match self {
            LockEvent::Unlocked => "unlock",
            LockEvent::Locked => "lock",
        }
    }

    /// Whether `status` is the outcome this event reports.
    ///
    /// Only a lock that actually ended up in the requested state is reported.
    pub fn confirmed_by(&self, status: &DeviceStatus) -> bool {
        matches!(
            (self, status.state),
            (LockEvent::Unlocked, LockState::Unlocked) | (LockEvent::Locked, LockState::Locked)
        )
    }
}

impl fmt::Display for LockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// JSON body of a lock event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockEventBody {
    pub user_id: String,
    pub device_id: String,
    pub battery_percent: u8,
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// 2xx response
    Ok,
    /// Non-2xx response, or [`NO_RESPONSE_CODE`] when the request never got one
    Error { code: i32, message: Option<String> },
}

impl NotifyOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, NotifyOutcome::Ok)
    }
}

impl fmt::Display for NotifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyOutcome::Ok => f.write_str("ok"),
            NotifyOutcome::Error {
                code,
                message: Some(message),
            } => write!(f, "error {}: {}", code, message),
            NotifyOutcome::Error {
                code,
                message: None,
            } => write!(f, "error {}", code),
        }
    }
}

/// Reports lock events to the back office.
///
/// # Example
///
/// ```no_run
/// use padlock_core::{DeviceAddress, DeviceStatus, LockState};
/// use padlock_notify::{LockEvent, NotifyClient, NotifyConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = NotifyClient::new(&NotifyConfig {
///     base_url: "https://backoffice.example.com".to_string(),
///     api_key: "sk_test_123".to_string(),
///     ..NotifyConfig::default()
/// })?;
///
/// let address: DeviceAddress = "F1:03:32:02:00:78".parse()?;
/// let status = DeviceStatus::new(LockState::Unlocked, Some(87));
/// let outcome = client.notify(LockEvent::Unlocked, &address, &status).await;
/// println!("Back office: {}", outcome);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NotifyClient {
    base_url: String,
    user_id: String,
    client: reqwest::Client,
}

impl NotifyClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an http(s) URL, the API key is
    /// not a valid header value, or the HTTP client cannot be built.
    pub fn new(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(NotifyError::InvalidUrl(config.base_url.clone()));
        }

        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| NotifyError::InvalidApiKey(e.to_string()))?;
        api_key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| NotifyError::Http(e.to_string()))?;

        debug!(%base_url, "Notification client ready");
        Ok(Self {
            base_url,
            user_id: config.user_id.clone(),
            client,
        })
    }

    /// Endpoint URL for `event`.
    pub fn endpoint(&self, event: LockEvent) -> String {
        format!("{}/api/lock-devices/{}", self.base_url, event.path())
    }

    /// Request body for a device status. A missing battery reading is sent as 0.
    pub fn body(&self, address: &DeviceAddress, status: &DeviceStatus) -> LockEventBody {
        LockEventBody {
            user_id: self.user_id.clone(),
            device_id: address.to_string(),
            battery_percent: status.battery_percent.unwrap_or(0),
        }
    }

    /// Report `event` for the lock at `address`.
    ///
    /// Never fails: transport problems come back as
    /// `NotifyOutcome::Error { code: -1, .. }`.
    pub async fn notify(
        &self,
        event: LockEvent,
        address: &DeviceAddress,
        status: &DeviceStatus,
    ) -> NotifyOutcome {
        let url = self.endpoint(event);
        let body = self.body(address, status);
        debug!(%url, %event, "Sending lock event");

        let response = match self.client.put(&url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%event, error = %e, "Lock event not delivered");
                return NotifyOutcome::Error {
                    code: NO_RESPONSE_CODE,
                    message: Some(e.to_string()),
                };
            }
        };

        let status_code = response.status();
        if status_code.is_success() {
            info!(%event, status = status_code.as_u16(), "Lock event delivered");
            return NotifyOutcome::Ok;
        }

        let message = response.text().await.ok().filter(|text| !text.is_empty());
        warn!(%event, status = status_code.as_u16(), "Lock event rejected");
        NotifyOutcome::Error {
            code: i32::from(status_code.as_u16()),
            message,
        }
    }

    /// Report a successful unlock.
    pub async fn notify_unlock(&self, address: &DeviceAddress, status: &DeviceStatus) -> NotifyOutcome {
        self.notify(LockEvent::Unlocked, address, status).await
    }

    /// Report a successful lock.
    pub async fn notify_lock(&self, address: &DeviceAddress, status: &DeviceStatus) -> NotifyOutcome {
        self.notify(LockEvent::Locked, address, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn client(base_url: &str) -> NotifyClient {
        NotifyClient::new(&NotifyConfig {
            base_url: base_url.to_string(),
            api_key: "sk_test".to_string(),
            user_id: "7".to_string(),
            ..NotifyConfig::default()
        })
        .unwrap()
    }

    #[rstest]
    #[case("https://backoffice.example.com", LockEvent::Unlocked, "https://backoffice.example.com/api/lock-devices/unlock")]
    #[case("https://backoffice.example.com/", LockEvent::Locked, "https://backoffice.example.com/api/lock-devices/lock")]
    #[case("http://10.0.0.5:8080/base/", LockEvent::Locked, "http://10.0.0.5:8080/base/api/lock-devices/lock")]
    fn test_endpoint(#[case] base: &str, #[case] event: LockEvent, #[case] expected: &str) {
        assert_eq!(client(base).endpoint(event), expected);
    }

    #[rstest]
    #[case("")]
    #[case("backoffice.example.com")]
    #[case("ftp://backoffice.example.com")]
    fn test_invalid_base_url(#[case] base: &str) {
        let result = NotifyClient::new(&NotifyConfig {
            base_url: base.to_string(),
            ..NotifyConfig::default()
        });
        assert!(matches!(result, Err(NotifyError::InvalidUrl(_))));
    }

    #[test]
    fn test_invalid_api_key() {
        let result = NotifyClient::new(&NotifyConfig {
            base_url: "https://backoffice.example.com".to_string(),
            api_key: "line\nbreak".to_string(),
            ..NotifyConfig::default()
        });
        assert!(matches!(result, Err(NotifyError::InvalidApiKey(_))));
    }

    #[test]
    fn test_body_shape() {
        let address = DeviceAddress::new("f1:03:32:02:00:78").unwrap();
        let status = DeviceStatus::new(LockState::Unlocked, None);
        let body = client("https://x.example").body(&address, &status);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "userId": "7",
                "deviceId": "F1:03:32:02:00:78",
                "batteryPercent": 0
            })
        );
    }

    #[rstest]
    #[case(LockEvent::Unlocked, LockState::Unlocked, true)]
    #[case(LockEvent::Unlocked, LockState::Locked, false)]
    #[case(LockEvent::Locked, LockState::Locked, true)]
    #[case(LockEvent::Locked, LockState::Unknown, false)]
    fn test_confirmed_by(#[case] event: LockEvent, #[case] state: LockState, #[case] expected: bool) {
        assert_eq!(event.confirmed_by(&DeviceStatus::new(state, Some(50))), expected);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(NotifyOutcome::Ok.to_string(), "ok");
        assert_eq!(
            NotifyOutcome::Error {
                code: 401,
                message: Some("bad key".to_string())
            }
            .to_string(),
            "error 401: bad key"
        );
        assert_eq!(
            NotifyOutcome::Error {
                code: -1,
                message: None
            }
            .to_string(),
            "error -1"
        );
    }
}
