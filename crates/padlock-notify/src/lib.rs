//! HTTP notification sink for lock events.
//!
//! After a lock or unlock succeeds, the back office is told about it with a
//! single `PUT` request. Delivery is best-effort: the outcome is reported to
//! the caller as a [`NotifyOutcome`] and never changes the lock result.
//!
//! ```text
//! PUT {base_url}/api/lock-devices/unlock
//! X-API-Key: <key>
//! {"userId":"1","deviceId":"F1:03:32:02:00:78","batteryPercent":87}
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{LockEvent, LockEventBody, NotifyClient, NotifyOutcome};
pub use config::NotifyConfig;
pub use error::NotifyError;
