//! Radio transport abstraction for the padlock client.
//!
//! This crate defines what the lock protocol needs from a Bluetooth LE stack
//! and nothing more: connect to an address, discover services, write a
//! characteristic, toggle notifications, and disconnect. Pushed values come
//! back through a [`NotificationSink`], the producer half of the client's
//! response correlator.
//!
//! # Implementations
//!
//! - [`mock::MockTransport`]: a scriptable in-process radio used by tests and
//!   simulations.
//! - `btle::BtleTransport`: the host adapter via `btleplug`, behind the
//!   `btleplug` feature.
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] which uses the
//! [`TransportError`] error type.

pub mod error;
pub mod mock;
pub mod sink;
pub mod traits;

#[cfg(feature = "btleplug")]
pub mod btle;

// Re-export commonly used types for convenience
pub use error::{Result, TransportError};
pub use sink::NotificationSink;
pub use traits::{LockConnection, LockTransport, ServiceDescriptor};

#[cfg(feature = "btleplug")]
pub use btle::{BtleConnection, BtleTransport};
