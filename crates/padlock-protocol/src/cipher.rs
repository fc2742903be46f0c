//! AES-128-ECB block transform for protocol frames.
//!
//! The lock encrypts every frame as a single AES block with no chaining and
//! no padding. Multi-block messages never occur, so ECB on one block is the
//! whole transform. The one-block precondition is enforced by [`Frame`]:
//! raw notification bytes must pass [`Frame::from_slice`] before they can be
//! decrypted.

use aes::Aes128;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use padlock_core::AesKey;
use std::fmt;

use crate::frame::Frame;

/// Encrypt one frame with `key`.
pub fn encrypt_block(key: &AesKey, plaintext: &Frame) -> Frame {
    FrameCipher::new(key).encrypt(plaintext)
}

/// Decrypt one frame with `key`.
pub fn decrypt_block(key: &AesKey, ciphertext: &Frame) -> Frame {
    FrameCipher::new(key).decrypt(ciphertext)
}

/// Keyed cipher reused for every frame of a client's lifetime.
///
/// # Examples
/// ```
/// use padlock_core::AesKey;
/// use padlock_protocol::{Frame, FrameCipher};
///
/// let key = AesKey::from_hex("2b7e151628aed2a6abf7158809cf4f3c").unwrap();
/// let cipher = FrameCipher::new(&key);
///
/// let plain = Frame::new([0x06, 0x01, 0x01, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
/// let sealed = cipher.encrypt(&plain);
/// assert_ne!(sealed, plain);
/// assert_eq!(cipher.decrypt(&sealed), plain);
/// ```
#[derive(Clone)]
pub struct FrameCipher {
    cipher: Aes128,
}

impl FrameCipher {
    pub fn new(key: &AesKey) -> Self {
        Self {
            cipher: Aes128::new(GenericArray::from_slice(key.as_bytes())),
        }
    }

    pub fn encrypt(&self, plaintext: &Frame) -> Frame {
        let mut block = plaintext.into_bytes();
        self.cipher
            .encrypt_block(GenericArray::from_mut_slice(&mut block));
        Frame::new(block)
    }

    pub fn decrypt(&self, ciphertext: &Frame) -> Frame {
        let mut block = ciphertext.into_bytes();
        self.cipher
            .decrypt_block(GenericArray::from_mut_slice(&mut block));
        Frame::new(block)
    }
}

impl fmt::Debug for FrameCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FrameCipher(AES-128-ECB)")
    }
}
