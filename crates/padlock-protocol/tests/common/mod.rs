//! Shared helpers for protocol integration tests.
//!
//! Builds plaintext response frames the way the lock firmware does, so tests
//! can exercise the full encrypt, transmit, decrypt, parse path without a
//! device.

#![allow(dead_code)]

use padlock_core::{AesKey, SessionToken};
use padlock_protocol::{Frame, FrameCipher};

/// Key used by every integration test.
pub const TEST_KEY_HEX: &str = "0f1e2d3c4b5a69788796a5b4c3d2e1f0";

pub fn test_key() -> AesKey {
    AesKey::from_hex(TEST_KEY_HEX).expect("Test helper: invalid key hex")
}

pub fn test_cipher() -> FrameCipher {
    FrameCipher::new(&test_key())
}

/// Zero-padded frame starting with `head`.
pub fn response(head: &[u8]) -> Frame {
    let mut bytes = [0u8; 16];
    bytes[..head.len()].copy_from_slice(head);
    Frame::new(bytes)
}

pub fn token_response(token: SessionToken) -> Frame {
    let t = token.as_bytes();
    response(&[0x06, 0x02, 0x01, t[0], t[1], t[2], t[3]])
}

pub fn battery_response(percent: u8) -> Frame {
    response(&[0x02, 0x02, 0x01, percent])
}

pub fn unlock_response(status: u8) -> Frame {
    response(&[0x05, 0x02, 0x01, status])
}

pub fn lock_response(status: u8) -> Frame {
    response(&[0x05, 0x0D, 0x01, status])
}

pub fn lock_state_response(locked: bool) -> Frame {
    response(&[0x05, 0x0F, 0x01, u8::from(locked)])
}
