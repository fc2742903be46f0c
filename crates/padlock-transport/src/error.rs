//! Error types for transport operations.
//!
//! These cover the ways a radio link can fail underneath the lock protocol:
//! no usable adapter, an address that cannot be resolved, a dropped link, and
//! I/O errors reported by the platform stack.

use uuid::Uuid;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while talking to a lock over the radio.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No Bluetooth adapter is present, or it is switched off.
    #[error("Bluetooth unavailable: {message}")]
    Unavailable { message: String },

    /// The address could not be resolved to a reachable peripheral.
    #[error("Device not found: {address}")]
    DeviceNotFound { address: String },

    /// The link is not established or has been dropped.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Link establishment failed.
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    /// GATT service discovery failed.
    #[error("Service discovery failed: {message}")]
    DiscoveryFailed { message: String },

    /// A required characteristic is not exposed by the peripheral.
    #[error("Characteristic not found: {uuid}")]
    CharacteristicNotFound { uuid: Uuid },

    /// Error reported by the platform Bluetooth stack.
    #[cfg(feature = "btleplug")]
    #[error("Bluetooth error: {0}")]
    Btle(#[from] btleplug::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Create a new unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a new device-not-found error.
    pub fn device_not_found(address: impl Into<String>) -> Self {
        Self::DeviceNotFound {
            address: address.into(),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Create a new discovery failed error.
    pub fn discovery_failed(message: impl Into<String>) -> Self {
        Self::DiscoveryFailed {
            message: message.into(),
        }
    }

    /// Create a new characteristic-not-found error.
    pub fn characteristic_not_found(uuid: Uuid) -> Self {
        Self::CharacteristicNotFound { uuid }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
