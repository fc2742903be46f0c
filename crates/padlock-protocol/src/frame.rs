use padlock_core::{Error, Result, constants::FRAME_SIZE};
use std::fmt;

/// A single 16-byte protocol block, plaintext or ciphertext.
///
/// Every command and every response on the wire is exactly one AES block.
/// The length invariant is carried by the type: a `Frame` can only be
/// obtained from a `[u8; 16]` or from a slice that passed the length check.
///
/// # Wire Format
///
/// Plaintext frames share a common header layout:
///
/// ```text
/// byte:  0      1      2      3       4..
///       [type] [sub]  [len]  [status/payload...] [zero padding]
/// ```
///
/// Responses carry their tag in bytes 0 and 1 and the status or value
/// byte at offset 3. Token responses carry the 4-byte session token in
/// bytes 3..7.
///
/// # Examples
/// ```
/// use padlock_protocol::Frame;
///
/// let frame = Frame::from_slice(&[0x06, 0x01, 0x01, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
/// assert_eq!(frame.byte(0), 0x06);
///
/// // Anything that is not exactly one block is rejected.
/// assert!(Frame::from_slice(&[0x06, 0x01]).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame([u8; FRAME_SIZE]);

impl Frame {
    /// Create a frame from an exact-size block.
    pub fn new(bytes: [u8; FRAME_SIZE]) -> Self {
        Frame(bytes)
    }

    /// Create a frame from an arbitrary byte slice.
    ///
    /// # Errors
    /// Returns `Error::InvalidFrameLength` if the slice is not exactly 16 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let block: [u8; FRAME_SIZE] =
            bytes
                .try_into()
                .map_err(|_| Error::InvalidFrameLength {
                    expected: FRAME_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Frame(block))
    }

    /// Get the raw bytes of the frame
    pub fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.0
    }

    /// Consume the frame and return its bytes
    pub fn into_bytes(self) -> [u8; FRAME_SIZE] {
        self.0
    }

    /// Byte at `index`.
    ///
    /// # Panics
    /// Panics if `index >= 16`; callers index with protocol constants only.
    pub fn byte(&self, index: usize) -> u8 {
        self.0[index]
    }

    /// Copy `N` bytes starting at `offset`.
    pub(crate) fn array_at<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.0[offset..offset + N]);
        out
    }

    /// Hex representation, used in trace logs.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; FRAME_SIZE]> for Frame {
    fn from(bytes: [u8; FRAME_SIZE]) -> Self {
        Frame(bytes)
    }
}

impl TryFrom<&[u8]> for Frame {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Frame::from_slice(bytes)
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.to_hex())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}
