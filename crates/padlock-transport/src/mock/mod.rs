//! Mock transport for testing and development.
//!
//! This module provides a simulated radio that can be scripted
//! programmatically without requiring a Bluetooth adapter or a real lock.

pub mod lock;

// Re-export commonly used types
pub use lock::{MockConnection, MockTransport, MockTransportHandle, Responder};
