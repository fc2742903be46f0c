//! One connection to one lock, from connect to teardown.
//!
//! A [`Session`] owns the transport connection, the consumer half of the
//! response correlator and the lifecycle state machine. It is created per
//! operation and consumed by [`Session::close`], which disables notifications
//! on a best-effort basis and then disconnects. Setup failures release the
//! link before returning. A session dropped without `close`, because the
//! operation future was cancelled, hands its connection to
//! [`LockConnection::abandon`] so the link is still released.
//!
//! Commands go through [`Session::exchange`], which takes `&mut self`: a
//! second command cannot be written while one is still waiting for its
//! response.

use crate::config::ClientConfig;
use crate::correlator::{ResponseCorrelator, WaitError};
use crate::error::{ClientError, Result};
use crate::state_machine::{SessionState, StateMachine, SubscriptionState};
use padlock_core::{
    DeviceAddress,
    constants::{RESPONSE_CHARACTERISTIC_UUID, SERVICE_UUID, WRITE_CHARACTERISTIC_UUID},
};
use padlock_protocol::{Command, Frame, FrameCipher};
use padlock_transport::{LockConnection, LockTransport, TransportError};
use std::time::Duration;
use tracing::{debug, error, trace, warn};

/// Time windows applied by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeouts {
    pub response: Duration,
    pub subscribe: Duration,
    pub unsubscribe: Duration,
}

impl From<&ClientConfig> for SessionTimeouts {
    fn from(config: &ClientConfig) -> Self {
        Self {
            response: config.response_timeout(),
            subscribe: config.subscribe_timeout(),
            unsubscribe: config.unsubscribe_timeout(),
        }
    }
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

/// An open session with a lock.
pub struct Session<C: LockConnection> {
    address: DeviceAddress,
    connection: C,
    correlator: ResponseCorrelator,
    cipher: FrameCipher,
    timeouts: SessionTimeouts,
    machine: StateMachine,
    subscription: SubscriptionState,
    closed: bool,
}

impl<C: LockConnection> Session<C> {
    /// Connect to `address` and resolve the lock characteristics.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the address cannot be connected, service
    /// discovery fails, or the lock service or one of its characteristics is
    /// missing. The link is released before returning.
    pub async fn open<T>(
        transport: &T,
        address: &DeviceAddress,
        cipher: FrameCipher,
        timeouts: SessionTimeouts,
    ) -> Result<Self>
    where
        T: LockTransport<Connection = C>,
    {
        let (sink, correlator) = ResponseCorrelator::new(RESPONSE_CHARACTERISTIC_UUID);

        debug!(%address, "Connecting");
        let connection = transport.connect(address, sink).await.map_err(|e| {
            warn!(%address, error = %e, "Connect failed");
            ClientError::Transport(e)
        })?;

        let mut session = Self {
            address: address.clone(),
            connection,
            correlator,
            cipher,
            timeouts,
            machine: StateMachine::new(),
            subscription: SubscriptionState::Unsubscribed,
            closed: false,
        };

        if let Err(e) = session.resolve().await {
            session.close().await;
            return Err(e);
        }
        Ok(session)
    }

    async fn resolve(&mut self) -> Result<()> {
        self.advance(SessionState::Discovering)?;

        let services = match self.connection.discover_services().await {
            Ok(services) => services,
            Err(e) => return Err(self.abort(e.into())),
        };

        let Some(service) = services.iter().find(|s| s.uuid == SERVICE_UUID) else {
            return Err(self.abort(TransportError::discovery_failed(format!(
                "service {} not found",
                SERVICE_UUID
            ))
            .into()));
        };

        for characteristic in [WRITE_CHARACTERISTIC_UUID, RESPONSE_CHARACTERISTIC_UUID] {
            if !service.has_characteristic(characteristic) {
                return Err(
                    self.abort(TransportError::characteristic_not_found(characteristic).into())
                );
            }
        }

        debug!(address = %self.address, "Lock characteristics resolved");
        Ok(())
    }

    /// Subscribe to the response characteristic and wait for the
    /// acknowledgement.
    ///
    /// # Errors
    ///
    /// - Transport error if the descriptor write is not queued or the
    ///   acknowledgement is negative
    /// - `ClientError::Timeout` if no acknowledgement arrives in time
    pub async fn enable_notifications(&mut self) -> Result<()> {
        self.advance(SessionState::EnablingNotifications)?;
        self.subscription = SubscriptionState::Subscribing;
        self.correlator.drain_acks();

        match self
            .connection
            .set_subscription(RESPONSE_CHARACTERISTIC_UUID, true)
            .await
        {
            Ok(true) => {}
            Ok(false) => return Err(self.abort(ClientError::aborted("descriptor write not queued"))),
            Err(e) => return Err(self.abort(e.into())),
        }

        match self.correlator.await_ack(self.timeouts.subscribe).await {
            Ok(true) => {
                self.subscription = SubscriptionState::Active;
                self.advance(SessionState::Ready)?;
                debug!(address = %self.address, "Notifications enabled");
                Ok(())
            }
            Ok(false) => Err(self.abort(ClientError::aborted("subscription rejected"))),
            Err(WaitError::TimedOut) => Err(self.abort(ClientError::timeout(
                "enable_notifications",
                self.timeouts.subscribe,
            ))),
            Err(WaitError::Closed) => Err(self.abort(
                TransportError::disconnected(self.address.to_string()).into(),
            )),
        }
    }

    /// Send one command and wait for its decrypted response.
    ///
    /// # Errors
    ///
    /// - `ClientError::Timeout` if no response arrives within the response window
    /// - Transport error if the write fails or is not queued
    pub async fn exchange(&mut self, command: Command) -> Result<Frame> {
        let code = command.code();
        self.advance(SessionState::Executing)?;

        let sealed = match command.encode() {
            Ok(frame) => self.cipher.encrypt(&frame),
            Err(e) => return Err(self.abort(e.into())),
        };

        let stale = self.correlator.drain_responses();
        if stale > 0 {
            debug!(stale, "Discarded stale responses before write");
        }

        trace!(command = %code, frame = %sealed, "Writing command");
        match self
            .connection
            .write_characteristic(WRITE_CHARACTERISTIC_UUID, sealed.as_bytes())
            .await
        {
            Ok(true) => {}
            Ok(false) => return Err(self.abort(ClientError::aborted("write not queued"))),
            Err(e) => {
                error!(command = %code, error = %e, "Write failed");
                return Err(self.abort(e.into()));
            }
        }

        match self.correlator.await_response(self.timeouts.response).await {
            Ok(response) => {
                trace!(command = %code, frame = %response, "Response received");
                self.advance(SessionState::Ready)?;
                Ok(self.cipher.decrypt(&response))
            }
            Err(WaitError::TimedOut) => {
                warn!(
                    command = %code,
                    window_ms = self.timeouts.response.as_millis() as u64,
                    executing_ms = self.machine.time_in_current_state().as_millis() as u64,
                    "No response"
                );
                Err(self.abort(ClientError::timeout(code.name(), self.timeouts.response)))
            }
            Err(WaitError::Closed) => {
                warn!(command = %code, "Link lost while waiting for response");
                Err(self.abort(TransportError::disconnected(self.address.to_string()).into()))
            }
        }
    }

    /// Tear the session down.
    ///
    /// Disables notifications if they were requested, waiting briefly for the
    /// acknowledgement, then disconnects. Failures are logged and ignored.
    /// Returns the state the session ended in.
    pub async fn close(mut self) -> SessionState {
        if *self.machine.current_state() == SessionState::Ready
            && let Err(e) = self.advance(SessionState::DisablingNotifications)
        {
            debug!(error = %e, "Skipping orderly shutdown state");
        }

        if self.subscription.needs_unsubscribe() && self.correlator.link_lost() {
            debug!("Link already lost, not disabling notifications");
            self.subscription = SubscriptionState::Unsubscribed;
        }

        if self.subscription.needs_unsubscribe() {
            self.subscription = SubscriptionState::Unsubscribing;
            self.correlator.drain_acks();

            match self
                .connection
                .set_subscription(RESPONSE_CHARACTERISTIC_UUID, false)
                .await
            {
                Ok(true) => match self.correlator.await_ack(self.timeouts.unsubscribe).await {
                    Ok(ack) => debug!(ack, "Notifications disabled"),
                    Err(e) => debug!(reason = ?e, "No acknowledgement for disabling notifications"),
                },
                Ok(false) => warn!("Disable-notifications write not queued"),
                Err(e) => warn!(error = %e, "Failed to disable notifications"),
            }
            self.subscription = SubscriptionState::Unsubscribed;
        }

        if let Err(e) = self.connection.disconnect().await {
            warn!(address = %self.address, error = %e, "Disconnect failed");
        }

        if *self.machine.current_state() == SessionState::DisablingNotifications
            && let Err(e) = self.advance(SessionState::Closed)
        {
            debug!(error = %e, "Session not marked closed");
        }
        self.closed = true;
        let state = *self.machine.current_state();
        debug!(address = %self.address, %state, "Session closed");
        state
    }

    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    pub fn state(&self) -> SessionState {
        *self.machine.current_state()
    }

    pub fn subscription(&self) -> SubscriptionState {
        self.subscription
    }

    fn advance(&mut self, to: SessionState) -> Result<()> {
        let transition = self.machine.transition_to(to)?;
        trace!(from = %transition.from, to = %transition.to, "Session state change");
        Ok(())
    }

    /// Move to `Aborted` and hand the error back.
    fn abort(&mut self, error: ClientError) -> ClientError {
        if let Err(e) = self.machine.transition_to(SessionState::Aborted) {
            debug!(error = %e, "Session already terminal");
        }
        error
    }
}

impl<C: LockConnection> Drop for Session<C> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        warn!(
            address = %self.address,
            state = %self.machine.current_state(),
            "Session dropped before teardown, releasing link in background"
        );
        let unsubscribe = self
            .subscription
            .needs_unsubscribe()
            .then_some(RESPONSE_CHARACTERISTIC_UUID);
        self.connection.abandon(unsubscribe);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use padlock_core::AesKey;
    use padlock_transport::mock::{MockConnection, MockTransport, MockTransportHandle};

    async fn open_session() -> (Session<MockConnection>, MockTransportHandle) {
        let (transport, handle) = MockTransport::new();
        let key = AesKey::from_hex("4a1f9c03d25e7b6680f4e2a19c3d5b70").unwrap();
        let address = DeviceAddress::new("C8:47:8C:10:20:30").unwrap();
        let session = Session::open(
            &transport,
            &address,
            FrameCipher::new(&key),
            SessionTimeouts::default(),
        )
        .await
        .unwrap();
        (session, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_session_closes_in_order() {
        let (mut session, handle) = open_session().await;
        session.enable_notifications().await.unwrap();
        assert_eq!(session.state(), SessionState::Ready);

        assert_eq!(session.close().await, SessionState::Closed);
        assert_eq!(handle.disconnect_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_session_stays_aborted() {
        let (mut session, handle) = open_session().await;
        handle.set_subscribe_ack(Some(false)).await;
        assert!(session.enable_notifications().await.is_err());
        assert_eq!(session.state(), SessionState::Aborted);

        assert_eq!(session.close().await, SessionState::Aborted);
        assert_eq!(handle.disconnect_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_session_abandons_link() {
        let (mut session, handle) = open_session().await;
        session.enable_notifications().await.unwrap();

        drop(session);
        tokio::task::yield_now().await;
        assert_eq!(handle.disconnect_count().await, 1);
        assert_eq!(
            handle.subscriptions().await,
            vec![
                (RESPONSE_CHARACTERISTIC_UUID, true),
                (RESPONSE_CHARACTERISTIC_UUID, false)
            ]
        );
    }
}
