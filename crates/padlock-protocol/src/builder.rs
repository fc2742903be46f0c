use crate::frame::Frame;
use padlock_core::{Error, Password, Result, SessionToken, constants::FRAME_SIZE};

/// Concatenate byte groups into one frame.
///
/// The groups must add up to exactly 16 bytes; any other total is a
/// construction error, never silently padded or truncated.
///
/// # Example
/// ```
/// use padlock_protocol::build_frame;
///
/// let frame = build_frame(&[&[0x06, 0x01, 0x01, 0x01], &[0u8; 12]]).unwrap();
/// assert_eq!(frame.byte(0), 0x06);
///
/// assert!(build_frame(&[&[0x06, 0x01, 0x01, 0x01], &[0u8; 11]]).is_err());
/// ```
pub fn build_frame(parts: &[&[u8]]) -> Result<Frame> {
    let total: usize = parts.iter().map(|p| p.len()).sum();
    if total != FRAME_SIZE {
        return Err(Error::InvalidFrameLength {
            expected: FRAME_SIZE,
            actual: total,
        });
    }

    let mut block = [0u8; FRAME_SIZE];
    let mut offset = 0;
    for part in parts {
        block[offset..offset + part.len()].copy_from_slice(part);
        offset += part.len();
    }
    Ok(Frame::new(block))
}

/// Builder for command frames with a fluent API
///
/// Collects header bytes, credentials and padding in wire order and
/// checks the total length once, in [`build`](FrameBuilder::build).
///
/// # Example
/// ```
/// use padlock_core::SessionToken;
/// use padlock_protocol::FrameBuilder;
///
/// let token = SessionToken::new([0xAA, 0xBB, 0xCC, 0xDD]);
/// let frame = FrameBuilder::new(&[0x05, 0x0E, 0x01, 0x01])
///     .token(&token)
///     .zeros(8)
///     .build()
///     .unwrap();
///
/// assert_eq!(&frame.as_bytes()[4..8], &[0xAA, 0xBB, 0xCC, 0xDD]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FrameBuilder {
    bytes: Vec<u8>,
}

impl FrameBuilder {
    /// Start a frame with its opcode header
    pub fn new(header: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(FRAME_SIZE);
        bytes.extend_from_slice(header);
        FrameBuilder { bytes }
    }

    /// Append raw bytes
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Append the session token
    pub fn token(self, token: &SessionToken) -> Self {
        self.bytes(token.as_bytes())
    }

    /// Append the ASCII password digits
    pub fn password(self, password: &Password) -> Self {
        self.bytes(password.as_bytes())
    }

    /// Append `count` zero bytes of padding
    pub fn zeros(mut self, count: usize) -> Self {
        self.bytes.resize(self.bytes.len() + count, 0);
        self
    }

    /// Number of bytes collected so far
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Build the frame
    ///
    /// # Errors
    /// Returns `Error::InvalidFrameLength` unless exactly 16 bytes were collected.
    pub fn build(self) -> Result<Frame> {
        build_frame(&[&self.bytes])
    }
}
