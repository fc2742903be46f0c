use crate::{
    Result,
    constants::{AES_KEY_HEX_LENGTH, AES_KEY_LENGTH, DEFAULT_PASSWORD, PASSWORD_LENGTH, TOKEN_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// AES-128 key shared with the lock.
///
/// Decoded once from its 32-character hexadecimal form and immutable
/// afterwards. The key bytes never appear in `Debug` output.
#[derive(Clone, Copy)]
pub struct AesKey([u8; AES_KEY_LENGTH]);

impl AesKey {
    /// Decode a key from a 32-character hexadecimal string.
    ///
    /// # Errors
    /// Returns `Error::InvalidKey` if the string is not exactly 32 hex characters.
    ///
    /// # Examples
    /// ```
    /// use padlock_core::AesKey;
    ///
    /// let key = AesKey::from_hex("000102030405060708090a0b0c0d0e0f").unwrap();
    /// assert_eq!(key.as_bytes()[15], 0x0f);
    ///
    /// assert!(AesKey::from_hex("0001").is_err());
    /// ```
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        if hex_key.len() != AES_KEY_HEX_LENGTH {
            return Err(Error::InvalidKey(format!(
                "AES key must be {AES_KEY_LENGTH} bytes ({AES_KEY_HEX_LENGTH} hexadecimal characters), got {} characters",
                hex_key.len()
            )));
        }

        let mut bytes = [0u8; AES_KEY_LENGTH];
        hex::decode_to_slice(hex_key, &mut bytes)
            .map_err(|e| Error::InvalidKey(format!("AES key is not hexadecimal: {e}")))?;
        Ok(AesKey(bytes))
    }

    /// Wrap raw key bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; AES_KEY_LENGTH]) -> Self {
        AesKey(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; AES_KEY_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for AesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AesKey(..)")
    }
}

impl std::str::FromStr for AesKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AesKey::from_hex(s)
    }
}

/// Six-digit unlock password.
///
/// # Security
/// Comparison runs in constant time, mirroring how credentials are compared
/// elsewhere in the workspace. `Debug` output is redacted.
#[derive(Clone, Copy, Eq)]
pub struct Password([u8; PASSWORD_LENGTH]);

impl Password {
    /// Validate a password.
    ///
    /// # Errors
    /// Returns `Error::InvalidPassword` unless the input is exactly six ASCII digits.
    ///
    /// # Examples
    /// ```
    /// use padlock_core::Password;
    ///
    /// assert!(Password::new("123456").is_ok());
    /// assert!(Password::new("12345").is_err());
    /// assert!(Password::new("12345a").is_err());
    /// ```
    pub fn new(password: &str) -> Result<Self> {
        let bytes = password.as_bytes();
        if bytes.len() != PASSWORD_LENGTH {
            return Err(Error::InvalidPassword(format!(
                "Password must be {PASSWORD_LENGTH} digits, got {} characters",
                password.chars().count()
            )));
        }
        if !bytes.iter().all(u8::is_ascii_digit) {
            return Err(Error::InvalidPassword(
                "Password must contain ASCII digits only".to_string(),
            ));
        }

        let mut digits = [0u8; PASSWORD_LENGTH];
        digits.copy_from_slice(bytes);
        Ok(Password(digits))
    }

    /// ASCII bytes as sent inside the unlock frame.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; PASSWORD_LENGTH] {
        &self.0
    }
}

impl Default for Password {
    fn default() -> Self {
        let mut digits = [0u8; PASSWORD_LENGTH];
        digits.copy_from_slice(DEFAULT_PASSWORD.as_bytes());
        Password(digits)
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(******)")
    }
}

impl std::str::FromStr for Password {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Password::new(s)
    }
}

/// Four opaque bytes issued by the lock for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken([u8; TOKEN_LENGTH]);

impl SessionToken {
    #[must_use]
    pub const fn new(bytes: [u8; TOKEN_LENGTH]) -> Self {
        SessionToken(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; TOKEN_LENGTH] {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Bluetooth device address (`AA:BB:CC:DD:EE:FF`).
///
/// Input is case-insensitive and normalized to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceAddress(String);

impl DeviceAddress {
    /// Parse and normalize a device address.
    ///
    /// # Errors
    /// Returns `Error::InvalidAddress` unless the input has six colon-separated hex octets.
    pub fn new(address: &str) -> Result<Self> {
        let normalized = address.trim().to_uppercase();
        let octets: Vec<&str> = normalized.split(':').collect();

        let valid = octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.bytes().all(|b| b.is_ascii_hexdigit()));
        if !valid {
            return Err(Error::InvalidAddress(format!(
                "Expected AA:BB:CC:DD:EE:FF, got {address:?}"
            )));
        }

        Ok(DeviceAddress(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for DeviceAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DeviceAddress::new(s)
    }
}

impl TryFrom<String> for DeviceAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        DeviceAddress::new(&value)
    }
}

impl From<DeviceAddress> for String {
    fn from(address: DeviceAddress) -> Self {
        address.0
    }
}

/// Latch state reported by the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Locked,
    Unlocked,
    /// The device answered with an unexpected header.
    Unknown,
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LockState::Locked => "locked",
            LockState::Unlocked => "unlocked",
            LockState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Final result of a successful lock or unlock operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub state: LockState,

    /// Battery charge in percent (0-100), absent if the device did not report it.
    pub battery_percent: Option<u8>,
}

impl DeviceStatus {
    #[must_use]
    pub fn new(state: LockState, battery_percent: Option<u8>) -> Self {
        Self {
            state,
            battery_percent,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.battery_percent {
            Some(battery) => write!(f, "{} (battery {battery}%)", self.state),
            None => write!(f, "{} (battery unknown)", self.state),
        }
    }
}
