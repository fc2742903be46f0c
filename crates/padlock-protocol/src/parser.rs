//! Response frame parser for the lock protocol.
//!
//! Every response is a decrypted 16-byte frame whose first two bytes form a
//! type tag and whose fourth byte (offset 3) carries a status or value:
//!
//! ```text
//! 06 02 01 [TOKEN x4] ...     token issued (token at bytes 3..7)
//! 02 02 01 [BATTERY] ...      battery level
//! 05 0D 01 [STATUS] ...       lock result (05 08 on some firmware)
//! 05 02 01 [STATUS] ...       unlock result
//! 05 0F 01 [STATE] ...        lock state (01 = locked)
//! ```
//!
//! Parsing never fails. A frame whose tag does not match the expected answer
//! maps to the negative outcome of the operation (`false`, `None` or
//! [`LockState::Unknown`]).
//!
//! # Examples
//!
//! ```
//! use padlock_core::LockState;
//! use padlock_protocol::{Frame, ResponseParser};
//!
//! let mut bytes = [0u8; 16];
//! bytes[..4].copy_from_slice(&[0x05, 0x0F, 0x01, 0x01]);
//! assert_eq!(ResponseParser::lock_state(&Frame::new(bytes)), LockState::Locked);
//!
//! // Unexpected header
//! bytes[1] = 0x99;
//! assert_eq!(ResponseParser::lock_state(&Frame::new(bytes)), LockState::Unknown);
//! ```

use crate::frame::Frame;
use padlock_core::{
    LockState, SessionToken,
    constants::{MAX_BATTERY_PERCENT, STATUS_OFFSET, TOKEN_LENGTH, TOKEN_OFFSET},
};

/// Status byte value meaning success.
const STATUS_OK: u8 = 0x00;

/// Lock-state byte value meaning the latch is engaged.
const STATE_LOCKED: u8 = 0x01;

/// Response tags (bytes 0 and 1) recognised by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseTag {
    Token,
    Battery,
    Lock,
    /// Alternate lock acknowledgement sent by some firmware revisions.
    LockAlt,
    Unlock,
    LockState,
    /// Any header the protocol does not define.
    Unrecognized(u8, u8),
}

impl ResponseTag {
    /// Classify a frame by its first two bytes.
    pub fn of(frame: &Frame) -> Self {
        match (frame.byte(0), frame.byte(1)) {
            (0x06, 0x02) => ResponseTag::Token,
            (0x02, 0x02) => ResponseTag::Battery,
            (0x05, 0x0D) => ResponseTag::Lock,
            (0x05, 0x08) => ResponseTag::LockAlt,
            (0x05, 0x02) => ResponseTag::Unlock,
            (0x05, 0x0F) => ResponseTag::LockState,
            (a, b) => ResponseTag::Unrecognized(a, b),
        }
    }
}

/// Stateless decoder for the five response layouts.
pub struct ResponseParser;

impl ResponseParser {
    /// Extract the session token from bytes 3..7.
    ///
    /// The device does not echo a distinguishable header for every firmware,
    /// so the token is taken positionally.
    pub fn token(frame: &Frame) -> SessionToken {
        SessionToken::new(frame.array_at::<TOKEN_LENGTH>(TOKEN_OFFSET))
    }

    /// Battery percentage, clamped to 0-100. `None` on any other header.
    pub fn battery(frame: &Frame) -> Option<u8> {
        match ResponseTag::of(frame) {
            ResponseTag::Battery => Some(frame.byte(STATUS_OFFSET).min(MAX_BATTERY_PERCENT)),
            _ => None,
        }
    }

    /// Whether the lock command succeeded.
    pub fn lock_accepted(frame: &Frame) -> bool {
        matches!(
            ResponseTag::of(frame),
            ResponseTag::Lock | ResponseTag::LockAlt
        ) && frame.byte(STATUS_OFFSET) == STATUS_OK
    }

    /// Whether the unlock command succeeded.
    pub fn unlock_accepted(frame: &Frame) -> bool {
        ResponseTag::of(frame) == ResponseTag::Unlock && frame.byte(STATUS_OFFSET) == STATUS_OK
    }

    /// Latch state reported by a lock-state query.
    pub fn lock_state(frame: &Frame) -> LockState {
        match ResponseTag::of(frame) {
            ResponseTag::LockState if frame.byte(STATUS_OFFSET) == STATE_LOCKED => {
                LockState::Locked
            }
            ResponseTag::LockState => LockState::Unlocked,
            _ => LockState::Unknown,
        }
    }
}
