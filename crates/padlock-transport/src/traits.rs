//! Transport capability traits.
//!
//! The lock client never talks to a Bluetooth stack directly. It opens a
//! connection through a [`LockTransport`] and drives it through the handful of
//! GATT operations in [`LockConnection`]. Anything the radio pushes back
//! (characteristic notifications, subscription acknowledgements, loss of the
//! link) is delivered
//! into the [`NotificationSink`] handed over at connect time.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT).
//! They are not object-safe; use generic parameters.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::sink::NotificationSink;
use padlock_core::DeviceAddress;
use uuid::Uuid;

/// A GATT service and the characteristics it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub uuid: Uuid,
    pub characteristics: Vec<Uuid>,
}

impl ServiceDescriptor {
    pub fn new(uuid: Uuid, characteristics: Vec<Uuid>) -> Self {
        Self {
            uuid,
            characteristics,
        }
    }

    /// Check whether the service exposes `characteristic`.
    pub fn has_characteristic(&self, characteristic: Uuid) -> bool {
        self.characteristics.contains(&characteristic)
    }
}

/// Factory for connections to lock peripherals.
///
/// # Examples
///
/// ```no_run
/// use padlock_core::DeviceAddress;
/// use padlock_transport::{LockConnection, LockTransport, NotificationSink, Result};
///
/// async fn services<T: LockTransport>(
///     transport: &T,
///     address: &DeviceAddress,
///     sink: NotificationSink,
/// ) -> Result<usize> {
///     let mut connection = transport.connect(address, sink).await?;
///     let count = connection.discover_services().await?.len();
///     connection.disconnect().await?;
///     Ok(count)
/// }
/// ```
pub trait LockTransport: Send + Sync {
    type Connection: LockConnection;

    /// Resolve `address` and establish a link.
    ///
    /// Notifications and subscription acknowledgements for the lifetime of
    /// the returned connection are delivered into `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be resolved or the link cannot
    /// be established.
    async fn connect(
        &self,
        address: &DeviceAddress,
        sink: NotificationSink,
    ) -> Result<Self::Connection>;
}

/// An established link to one lock.
pub trait LockConnection: Send + Sync {
    /// Enumerate the GATT services of the peripheral.
    async fn discover_services(&mut self) -> Result<Vec<ServiceDescriptor>>;

    /// Write `value` to a characteristic.
    ///
    /// Returns `Ok(false)` when the stack refused to queue the write.
    async fn write_characteristic(&mut self, characteristic: Uuid, value: &[u8]) -> Result<bool>;

    /// Enable or disable value-changed delivery for a characteristic.
    ///
    /// The returned flag says whether the descriptor write was queued. The
    /// outcome of the write arrives later through
    /// [`NotificationSink::subscription_ack`].
    async fn set_subscription(&mut self, characteristic: Uuid, enabled: bool) -> Result<bool>;

    /// Release the link. Called at most once per connection.
    async fn disconnect(&mut self) -> Result<()>;

    /// Release the link without waiting.
    ///
    /// Used when the owner is dropped before an orderly [`disconnect`]
    /// could run, for example when the operation future is cancelled. If
    /// `unsubscribe` names a characteristic, notifications on it are disabled
    /// first. The work runs in the background on the current runtime.
    ///
    /// [`disconnect`]: LockConnection::disconnect
    fn abandon(&mut self, unsubscribe: Option<Uuid>);
}
