//! Wire protocol of the padlock.
//!
//! Every message in either direction is one 16-byte frame encrypted as a
//! single AES-128 block with the lock's key. This crate builds command
//! frames, applies the block cipher and decodes responses:
//!
//! - [`frame`]: the 16-byte [`Frame`] and its length gate
//! - [`cipher`]: AES-128-ECB over one frame
//! - [`builder`] and [`commands`]: command layouts
//! - [`parser`]: response decoding
//!
//! # Example
//!
//! ```
//! use padlock_core::{AesKey, SessionToken};
//! use padlock_protocol::{Command, FrameCipher};
//!
//! let cipher = FrameCipher::new(&AesKey::from_hex("000102030405060708090a0b0c0d0e0f").unwrap());
//! let token = SessionToken::new([0x01, 0x02, 0x03, 0x04]);
//!
//! let sealed = cipher.encrypt(&Command::QueryLockState { token }.encode().unwrap());
//! assert_eq!(cipher.decrypt(&sealed).byte(0), 0x05);
//! ```

pub mod builder;
pub mod cipher;
pub mod commands;
pub mod frame;
pub mod parser;

pub use builder::{FrameBuilder, build_frame};
pub use cipher::{FrameCipher, decrypt_block, encrypt_block};
pub use commands::{Command, CommandCode};
pub use frame::Frame;
pub use parser::{ResponseParser, ResponseTag};
