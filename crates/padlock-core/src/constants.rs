//! Core constants for the lock protocol implementation.
//!
//! The lock speaks a fixed-block protocol over a single GATT service:
//!
//! ```text
//! client ──write(AES(frame16))──> 000036f5 (write characteristic)
//! client <──notify(AES(frame16))── 000036f6 (response characteristic)
//! ```
//!
//! Every frame on the wire is exactly one AES-128 block. Responses arrive as
//! notifications, never as the return value of the write, which is why the
//! client needs the notification subscription (CCCD write) to succeed before
//! any command is sent.
//!
//! # Usage
//!
//! ```
//! use padlock_core::constants::*;
//! use std::time::Duration;
//!
//! assert_eq!(FRAME_SIZE, 16);
//! let timeout = Duration::from_millis(DEFAULT_RESPONSE_TIMEOUT_MS);
//! assert_eq!(timeout.as_secs(), 5);
//! ```

use uuid::Uuid;

// ============================================================================
// GATT Layout
// ============================================================================

/// Lock service (`0000fee7-0000-1000-8000-00805f9b34fb`).
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x0000fee7_0000_1000_8000_00805f9b34fb);

/// Characteristic that accepts encrypted command frames.
pub const WRITE_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x000036f5_0000_1000_8000_00805f9b34fb);

/// Characteristic that notifies encrypted response frames.
pub const RESPONSE_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x000036f6_0000_1000_8000_00805f9b34fb);

// ============================================================================
// Frame Layout
// ============================================================================

/// Size of every command and response frame (one AES block).
pub const FRAME_SIZE: usize = 16;

/// Length of the session token issued by the device.
pub const TOKEN_LENGTH: usize = 4;

/// Byte offset of the session token inside a token response.
pub const TOKEN_OFFSET: usize = 3;

/// Byte offset of the status/value byte inside every response.
pub const STATUS_OFFSET: usize = 3;

// ============================================================================
// Credentials
// ============================================================================

/// AES-128 key length in bytes.
pub const AES_KEY_LENGTH: usize = 16;

/// Length of the hexadecimal key representation used in configuration.
pub const AES_KEY_HEX_LENGTH: usize = AES_KEY_LENGTH * 2;

/// Unlock password length (ASCII digits).
pub const PASSWORD_LENGTH: usize = 6;

/// Factory default unlock password.
pub const DEFAULT_PASSWORD: &str = "000000";

// ============================================================================
// Timeout Configuration
// ============================================================================

/// Time allowed between queuing a command write and receiving its response.
///
/// # Value: 5000ms
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 5000;

/// Time allowed for the device to acknowledge enabling notifications.
///
/// # Value: 3000ms
pub const DEFAULT_SUBSCRIBE_TIMEOUT_MS: u64 = 3000;

/// Time allowed for the device to acknowledge disabling notifications.
///
/// Teardown is best-effort, so expiry of this window is ignored.
///
/// # Value: 2000ms
pub const DEFAULT_UNSUBSCRIBE_TIMEOUT_MS: u64 = 2000;

/// Upper bound on a battery reading; larger raw values are clamped.
pub const MAX_BATTERY_PERCENT: u8 = 100;
