//! Command definitions for the lock protocol.
//!
//! Five commands make up the whole protocol. Each one is a single plaintext
//! frame built from an opcode header, optional credentials, and zero padding:
//!
//! | Command | Layout |
//! |---|---|
//! | `ObtainToken` | `06 01 01 01` + 12 zero |
//! | `QueryBattery` | `02 01 01 01` + token(4) + 8 zero |
//! | `Lock` | `05 0C 01 01` + token(4) + 8 zero |
//! | `Unlock` | `05 01 06` + password(6) + token(4) + 3 zero |
//! | `QueryLockState` | `05 0E 01 01` + token(4) + 8 zero |
//!
//! Every command except `ObtainToken` carries the session token obtained at
//! the start of the session.
//!
//! # Examples
//!
//! ```
//! use padlock_core::SessionToken;
//! use padlock_protocol::{Command, CommandCode};
//!
//! let token = SessionToken::new([0xAA, 0xBB, 0xCC, 0xDD]);
//! let frame = Command::QueryBattery { token }.encode().unwrap();
//!
//! assert_eq!(
//!     frame.as_bytes(),
//!     &[0x02, 0x01, 0x01, 0x01, 0xAA, 0xBB, 0xCC, 0xDD, 0, 0, 0, 0, 0, 0, 0, 0]
//! );
//! assert_eq!(Command::QueryBattery { token }.code(), CommandCode::QueryBattery);
//! ```

use crate::builder::FrameBuilder;
use crate::frame::Frame;
use padlock_core::{Password, Result, SessionToken};
use std::fmt;

/// Opcode header for token acquisition.
pub const OBTAIN_TOKEN_HEADER: [u8; 4] = [0x06, 0x01, 0x01, 0x01];

/// Opcode header for the battery query.
pub const QUERY_BATTERY_HEADER: [u8; 4] = [0x02, 0x01, 0x01, 0x01];

/// Opcode header for the lock command.
pub const LOCK_HEADER: [u8; 4] = [0x05, 0x0C, 0x01, 0x01];

/// Opcode header for the unlock command (third byte is the password length).
pub const UNLOCK_HEADER: [u8; 3] = [0x05, 0x01, 0x06];

/// Opcode header for the lock-state query.
pub const QUERY_LOCK_STATE_HEADER: [u8; 4] = [0x05, 0x0E, 0x01, 0x01];

/// Command kinds, without their payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCode {
    ObtainToken,
    QueryBattery,
    Lock,
    Unlock,
    QueryLockState,
}

impl CommandCode {
    /// Opcode header bytes sent at the start of the frame.
    pub fn header(&self) -> &'static [u8] {
        match self {
            CommandCode::ObtainToken => &OBTAIN_TOKEN_HEADER,
            CommandCode::QueryBattery => &QUERY_BATTERY_HEADER,
            CommandCode::Lock => &LOCK_HEADER,
            CommandCode::Unlock => &UNLOCK_HEADER,
            CommandCode::QueryLockState => &QUERY_LOCK_STATE_HEADER,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CommandCode::ObtainToken => "obtain_token",
            CommandCode::QueryBattery => "query_battery",
            CommandCode::Lock => "lock",
            CommandCode::Unlock => "unlock",
            CommandCode::QueryLockState => "query_lock_state",
        }
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A protocol command with its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ObtainToken,
    QueryBattery { token: SessionToken },
    Lock { token: SessionToken },
    Unlock { token: SessionToken, password: Password },
    QueryLockState { token: SessionToken },
}

impl Command {
    pub fn code(&self) -> CommandCode {
        match self {
            Command::ObtainToken => CommandCode::ObtainToken,
            Command::QueryBattery { .. } => CommandCode::QueryBattery,
            Command::Lock { .. } => CommandCode::Lock,
            Command::Unlock { .. } => CommandCode::Unlock,
            Command::QueryLockState { .. } => CommandCode::QueryLockState,
        }
    }

    /// Build the plaintext frame for this command.
    ///
    /// # Errors
    /// Returns `Error::InvalidFrameLength` if the assembled layout is not 16 bytes.
    pub fn encode(&self) -> Result<Frame> {
        let builder = FrameBuilder::new(self.code().header());
        let builder = match self {
            Command::ObtainToken => builder.zeros(12),
            Command::QueryBattery { token }
            | Command::Lock { token }
            | Command::QueryLockState { token } => builder.token(token).zeros(8),
            Command::Unlock { token, password } => builder
                .password(password)
                .token(token)
                .zeros(3),
        };
        builder.build()
    }
}
