//! Protocol driver for a Bluetooth LE electronic lock.
//!
//! This crate turns the lock's callback-driven radio protocol into two
//! sequential operations, [`LockClient::unlock`] and [`LockClient::lock`].
//!
//! # Modules
//!
//! - [`correlator`]: single-slot mailboxes matching pushed notifications to
//!   the command waiting for them
//! - [`state_machine`]: validated session lifecycle with bounded history
//! - [`session`]: connect, notification handshake, command exchange, teardown
//! - [`client`]: the public operations
//! - [`config`]: key and timeouts
//!
//! # Example
//!
//! ```no_run
//! use padlock_client::{ClientConfig, LockClient};
//! use padlock_core::DeviceAddress;
//! use padlock_transport::mock::MockTransport;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (transport, _handle) = MockTransport::new();
//! let client = LockClient::new(transport, ClientConfig::new("000102030405060708090a0b0c0d0e0f"))?;
//! let status = client.lock(&"AA:BB:CC:DD:EE:FF".parse::<DeviceAddress>()?).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod correlator;
pub mod error;
pub mod session;
pub mod state_machine;

pub use client::LockClient;
pub use config::ClientConfig;
pub use correlator::{ResponseCorrelator, WaitError};
pub use error::{ClientError, Result};
pub use session::{Session, SessionTimeouts};
pub use state_machine::{SessionState, StateMachine, StateTransition, SubscriptionState};
