//! Property-based tests for frame construction and the block transform.

mod common;

use padlock_core::{AesKey, LockState, constants::FRAME_SIZE};
use padlock_protocol::{Frame, FrameCipher, ResponseParser, build_frame};
use proptest::prelude::*;

/// Up to four byte groups of arbitrary length.
fn byte_groups() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..10), 0..5)
}

fn any_frame() -> impl Strategy<Value = Frame> {
    any::<[u8; 16]>().prop_map(Frame::new)
}

proptest! {
    /// Construction succeeds exactly when the groups total 16 bytes, and the
    /// result is their concatenation.
    #[test]
    fn prop_build_frame_total(groups in byte_groups()) {
        let refs: Vec<&[u8]> = groups.iter().map(Vec::as_slice).collect();
        let total: usize = groups.iter().map(Vec::len).sum();

        match build_frame(&refs) {
            Ok(frame) => {
                prop_assert_eq!(total, FRAME_SIZE);
                prop_assert_eq!(frame.as_bytes().to_vec(), groups.concat());
            }
            Err(_) => prop_assert_ne!(total, FRAME_SIZE),
        }
    }

    /// decrypt(encrypt(x)) == x for every key and block.
    #[test]
    fn prop_cipher_roundtrip(key in any::<[u8; 16]>(), frame in any_frame()) {
        let cipher = FrameCipher::new(&AesKey::from_bytes(key));
        prop_assert_eq!(cipher.decrypt(&cipher.encrypt(&frame)), frame);
    }

    /// Battery readings never exceed 100.
    #[test]
    fn prop_battery_clamped(frame in any_frame()) {
        if let Some(percent) = ResponseParser::battery(&frame) {
            prop_assert!(percent <= 100);
        }
    }

    /// Only a lock-state header yields a known state.
    #[test]
    fn prop_lock_state_requires_header(frame in any_frame()) {
        let is_state_header = frame.byte(0) == 0x05 && frame.byte(1) == 0x0F;
        prop_assert_eq!(
            ResponseParser::lock_state(&frame) != LockState::Unknown,
            is_state_header
        );
    }
}
