//! Public lock operations.
//!
//! [`LockClient`] runs each operation as a complete session: connect, enable
//! notifications, run the command sequence, tear down. Nothing is shared
//! between calls except the transport and the key.
//!
//! # Outcomes
//!
//! | Situation | Result |
//! |---|---|
//! | sequence completed | `Ok(Some(status))` |
//! | link could not be established, or failed mid-way | `Ok(None)` |
//! | `lock` verified as still unlocked | `Ok(None)` |
//! | command or handshake got no answer in time | `Err(ClientError::Timeout)` |
//! | malformed password or key | `Err(ClientError::Validation)` |
//!
//! # Example Usage
//!
//! ```no_run
//! use padlock_client::{ClientConfig, LockClient};
//! use padlock_core::DeviceAddress;
//! use padlock_transport::mock::MockTransport;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (transport, _handle) = MockTransport::new();
//! let client = LockClient::new(transport, ClientConfig::new("000102030405060708090a0b0c0d0e0f"))?;
//!
//! let address: DeviceAddress = "AA:BB:CC:DD:EE:FF".parse()?;
//! match client.unlock(&address, "123456").await? {
//!     Some(status) => println!("Lock is {}", status),
//!     None => println!("Lock unreachable"),
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::ClientConfig;
use crate::error::Result;
use crate::session::{Session, SessionTimeouts};
use padlock_core::{AesKey, DeviceAddress, DeviceStatus, LockState, Password};
use padlock_protocol::{Command, FrameCipher, ResponseParser};
use padlock_transport::{LockConnection, LockTransport};
use tracing::{debug, info, warn};

/// Client for one lock key over one transport.
pub struct LockClient<T: LockTransport> {
    transport: T,
    cipher: FrameCipher,
    timeouts: SessionTimeouts,
}

impl<T: LockTransport> LockClient<T> {
    /// Create a client, decoding the AES key from the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the key is not 32 hex characters.
    pub fn new(transport: T, config: ClientConfig) -> Result<Self> {
        let key = AesKey::from_hex(&config.aes_key)?;
        Ok(Self::with_key(transport, &key, SessionTimeouts::from(&config)))
    }

    /// Create a client from an already decoded key.
    pub fn with_key(transport: T, key: &AesKey, timeouts: SessionTimeouts) -> Self {
        Self {
            transport,
            cipher: FrameCipher::new(key),
            timeouts,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn timeouts(&self) -> SessionTimeouts {
        self.timeouts
    }

    /// Unlock the lock at `address`.
    ///
    /// Runs token, battery and unlock in order. A refused unlock is reported
    /// as `Some` with [`LockState::Locked`].
    ///
    /// # Errors
    ///
    /// - `ClientError::Validation` if `password` is not exactly six ASCII
    ///   digits; no connection is attempted
    /// - `ClientError::Timeout` if the lock stops answering
    pub async fn unlock(
        &self,
        address: &DeviceAddress,
        password: &str,
    ) -> Result<Option<DeviceStatus>> {
        let password = Password::new(password)?;
        info!(%address, "Unlock requested");

        let Some(mut session) = self.open_session(address).await? else {
            return Ok(None);
        };
        let outcome = unlock_sequence(&mut session, password).await;
        session.close().await;

        settle("unlock", address, outcome)
    }

    /// Lock the lock at `address` and verify it.
    ///
    /// Runs token, battery and lock, then queries the lock state. If the
    /// lock still reports itself unlocked the result is `None`, whatever the
    /// lock command answered.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Timeout` if the lock stops answering.
    pub async fn lock(&self, address: &DeviceAddress) -> Result<Option<DeviceStatus>> {
        info!(%address, "Lock requested");

        let Some(mut session) = self.open_session(address).await? else {
            return Ok(None);
        };
        let outcome = lock_sequence(&mut session).await;
        session.close().await;

        settle("lock", address, outcome)
    }

    /// Open a session and enable notifications.
    ///
    /// Transport failures yield `Ok(None)`; the link is already released.
    async fn open_session(
        &self,
        address: &DeviceAddress,
    ) -> Result<Option<Session<T::Connection>>> {
        let opened = Session::open(&self.transport, address, self.cipher.clone(), self.timeouts)
            .await;
        let mut session = match settle("connect", address, opened.map(Some))? {
            Some(session) => session,
            None => return Ok(None),
        };

        if let Err(e) = session.enable_notifications().await {
            session.close().await;
            return settle("enable notifications", address, Err(e));
        }
        Ok(Some(session))
    }
}

async fn unlock_sequence<C: LockConnection>(
    session: &mut Session<C>,
    password: Password,
) -> Result<Option<DeviceStatus>> {
    let token = ResponseParser::token(&session.exchange(Command::ObtainToken).await?);
    debug!("Session token obtained");

    let battery = ResponseParser::battery(&session.exchange(Command::QueryBattery { token }).await?);
    debug!(?battery, "Battery queried");

    let response = session
        .exchange(Command::Unlock { token, password })
        .await?;
    let state = if ResponseParser::unlock_accepted(&response) {
        LockState::Unlocked
    } else {
        LockState::Locked
    };

    info!(address = %session.address(), %state, "Unlock finished");
    Ok(Some(DeviceStatus::new(state, battery)))
}

async fn lock_sequence<C: LockConnection>(
    session: &mut Session<C>,
) -> Result<Option<DeviceStatus>> {
    let token = ResponseParser::token(&session.exchange(Command::ObtainToken).await?);
    debug!("Session token obtained");

    let battery = ResponseParser::battery(&session.exchange(Command::QueryBattery { token }).await?);
    debug!(?battery, "Battery queried");

    let response = session.exchange(Command::Lock { token }).await?;
    let state = if ResponseParser::lock_accepted(&response) {
        LockState::Locked
    } else {
        LockState::Unlocked
    };

    let verified = ResponseParser::lock_state(&session.exchange(Command::QueryLockState { token }).await?);
    if verified == LockState::Unlocked {
        warn!(
            address = %session.address(),
            reported = %state,
            "Lock state check reports unlocked"
        );
        return Ok(None);
    }

    info!(address = %session.address(), %state, %verified, "Lock finished");
    Ok(Some(DeviceStatus::new(state, battery)))
}

/// Absorb transport failures into an absent result.
fn settle<V>(operation: &str, address: &DeviceAddress, outcome: Result<Option<V>>) -> Result<Option<V>> {
    match outcome {
        Err(e) if e.is_transport() => {
            warn!(%address, operation, error = %e, "Operation abandoned");
            Ok(None)
        }
        Err(e) => {
            warn!(%address, operation, error = %e, "Operation failed");
            Err(e)
        }
        ok => ok,
    }
}
