//! Mock lock transport.
//!
//! A [`MockTransport`] behaves like a radio with one lock in range. Writes to
//! the lock are handed to a scripted responder whose answers are delivered
//! back through the connection's [`NotificationSink`] from a background task,
//! the same way a real stack delivers notifications. The paired
//! [`MockTransportHandle`] scripts failures and records every operation for
//! assertions.

use crate::{
    Result, TransportError,
    sink::NotificationSink,
    traits::{LockConnection, LockTransport, ServiceDescriptor},
};
use padlock_core::{
    DeviceAddress,
    constants::{RESPONSE_CHARACTERISTIC_UUID, SERVICE_UUID, WRITE_CHARACTERISTIC_UUID},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Scripted device behaviour: receives each written value and returns the
/// notification payloads to push back, in order.
pub type Responder = Box<dyn FnMut(&[u8]) -> Vec<Vec<u8>> + Send>;

struct MockState {
    services: Vec<ServiceDescriptor>,
    connect_error: Option<String>,
    discover_error: Option<String>,
    write_queued: bool,
    subscription_queued: bool,
    subscribe_ack: Option<bool>,
    unsubscribe_ack: Option<bool>,
    response_delay: Duration,
    responder: Option<Responder>,
    sink: Option<NotificationSink>,
    link_up: bool,
    connects: usize,
    disconnects: usize,
    writes: Vec<(Uuid, Vec<u8>)>,
    subscriptions: Vec<(Uuid, bool)>,
    deliveries: Vec<bool>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            services: vec![ServiceDescriptor::new(
                SERVICE_UUID,
                vec![WRITE_CHARACTERISTIC_UUID, RESPONSE_CHARACTERISTIC_UUID],
            )],
            connect_error: None,
            discover_error: None,
            write_queued: true,
            subscription_queued: true,
            subscribe_ack: Some(true),
            unsubscribe_ack: Some(true),
            response_delay: Duration::ZERO,
            responder: None,
            sink: None,
            link_up: false,
            connects: 0,
            disconnects: 0,
            writes: Vec::new(),
            subscriptions: Vec::new(),
            deliveries: Vec::new(),
        }
    }
}

/// Mock radio with a single scripted lock in range.
///
/// # Examples
///
/// ```
/// use padlock_core::DeviceAddress;
/// use padlock_transport::mock::MockTransport;
///
/// #[tokio::main]
/// async fn main() {
///     let (transport, handle) = MockTransport::new();
///
///     // Echo every write back as a notification
///     handle.set_responder(|value: &[u8]| vec![value.to_vec()]).await;
///
///     assert_eq!(handle.connect_count().await, 0);
/// }
/// ```
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a mock radio and the handle that scripts it.
    ///
    /// The lock exposes the standard service with both characteristics,
    /// accepts every write and acknowledges every subscription change. It
    /// answers nothing until a responder is installed.
    pub fn new() -> (Self, MockTransportHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            Self {
                state: state.clone(),
            },
            MockTransportHandle { state },
        )
    }
}

impl LockTransport for MockTransport {
    type Connection = MockConnection;

    async fn connect(
        &self,
        address: &DeviceAddress,
        sink: NotificationSink,
    ) -> Result<MockConnection> {
        let mut state = self.state.lock().await;
        if let Some(message) = state.connect_error.clone() {
            debug!(%address, "Mock connect failing");
            return Err(TransportError::connection_failed(message));
        }

        state.connects += 1;
        state.sink = Some(sink.clone());
        state.link_up = true;
        debug!(%address, "Mock connected");

        Ok(MockConnection {
            state: self.state.clone(),
            sink,
            address: address.clone(),
            connected: true,
        })
    }
}

/// Connection produced by [`MockTransport`].
pub struct MockConnection {
    state: Arc<Mutex<MockState>>,
    sink: NotificationSink,
    address: DeviceAddress,
    connected: bool,
}

impl MockConnection {
    fn ensure_connected(&self, state: &MockState) -> Result<()> {
        if self.connected && state.link_up {
            Ok(())
        } else {
            Err(TransportError::disconnected(self.address.to_string()))
        }
    }

    /// Push `payloads` and acknowledgements through the sink from a separate
    /// task, after the configured delay. Whether the sink accepted each
    /// payload is recorded.
    fn deliver(&self, delay: Duration, payloads: Vec<Vec<u8>>, ack: Option<bool>) {
        let sink = self.sink.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if !payloads.is_empty() {
                let accepted: Vec<bool> = payloads
                    .iter()
                    .map(|payload| sink.value_changed(sink.response_characteristic(), payload))
                    .collect();
                state.lock().await.deliveries.extend(accepted);
            }
            if let Some(success) = ack {
                sink.subscription_ack(success);
            }
        });
    }
}

impl LockConnection for MockConnection {
    async fn discover_services(&mut self) -> Result<Vec<ServiceDescriptor>> {
        let state = self.state.lock().await;
        self.ensure_connected(&state)?;
        match &state.discover_error {
            Some(message) => Err(TransportError::discovery_failed(message.clone())),
            None => Ok(state.services.clone()),
        }
    }

    async fn write_characteristic(&mut self, characteristic: Uuid, value: &[u8]) -> Result<bool> {
        let mut state = self.state.lock().await;
        self.ensure_connected(&state)?;
        state.writes.push((characteristic, value.to_vec()));
        if !state.write_queued {
            return Ok(false);
        }

        let payloads = match state.responder.as_mut() {
            Some(responder) => responder(value),
            None => Vec::new(),
        };
        let delay = state.response_delay;
        drop(state);

        if !payloads.is_empty() {
            self.deliver(delay, payloads, None);
        }
        Ok(true)
    }

    async fn set_subscription(&mut self, characteristic: Uuid, enabled: bool) -> Result<bool> {
        let mut state = self.state.lock().await;
        self.ensure_connected(&state)?;
        state.subscriptions.push((characteristic, enabled));
        if !state.subscription_queued {
            return Ok(false);
        }

        let ack = if enabled {
            state.subscribe_ack
        } else {
            state.unsubscribe_ack
        };
        drop(state);

        if ack.is_some() {
            self.deliver(Duration::ZERO, Vec::new(), ack);
        }
        Ok(true)
    }

    async fn disconnect(&mut self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.disconnects += 1;
        state.sink = None;
        state.link_up = false;
        self.connected = false;
        debug!(address = %self.address, "Mock disconnected");
        Ok(())
    }

    fn abandon(&mut self, unsubscribe: Option<Uuid>) {
        if !self.connected {
            return;
        }
        self.connected = false;

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(address = %self.address, "No runtime to release the mock link");
            return;
        };
        let state = self.state.clone();
        let address = self.address.clone();
        runtime.spawn(async move {
            let mut state = state.lock().await;
            if let Some(characteristic) = unsubscribe {
                state.subscriptions.push((characteristic, false));
            }
            state.disconnects += 1;
            state.sink = None;
            state.link_up = false;
            debug!(%address, "Mock link abandoned");
        });
    }
}

/// Handle for scripting and inspecting a [`MockTransport`].
///
/// It can be cloned and shared across tasks.
#[derive(Clone)]
pub struct MockTransportHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockTransportHandle {
    /// Install the scripted device behaviour.
    pub async fn set_responder<F>(&self, responder: F)
    where
        F: FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static,
    {
        self.state.lock().await.responder = Some(Box::new(responder));
    }

    /// Delay every response by `delay`.
    pub async fn set_response_delay(&self, delay: Duration) {
        self.state.lock().await.response_delay = delay;
    }

    /// Replace the advertised GATT services.
    pub async fn set_services(&self, services: Vec<ServiceDescriptor>) {
        self.state.lock().await.services = services;
    }

    /// Make every subsequent connect fail.
    pub async fn fail_connect(&self, message: impl Into<String>) {
        self.state.lock().await.connect_error = Some(message.into());
    }

    /// Make every subsequent service discovery fail.
    pub async fn fail_discovery(&self, message: impl Into<String>) {
        self.state.lock().await.discover_error = Some(message.into());
    }

    /// Whether characteristic writes are queued.
    pub async fn set_write_queued(&self, queued: bool) {
        self.state.lock().await.write_queued = queued;
    }

    /// Whether subscription descriptor writes are queued.
    pub async fn set_subscription_queued(&self, queued: bool) {
        self.state.lock().await.subscription_queued = queued;
    }

    /// Acknowledgement sent after enabling notifications; `None` never answers.
    pub async fn set_subscribe_ack(&self, ack: Option<bool>) {
        self.state.lock().await.subscribe_ack = ack;
    }

    /// Acknowledgement sent after disabling notifications; `None` never answers.
    pub async fn set_unsubscribe_ack(&self, ack: Option<bool>) {
        self.state.lock().await.unsubscribe_ack = ack;
    }

    /// Drop the radio link of the live connection, if any.
    ///
    /// The session is told through its sink and every later operation on the
    /// connection fails. Returns `true` if a link was up.
    pub async fn drop_link(&self) -> bool {
        let mut state = self.state.lock().await;
        if !state.link_up {
            return false;
        }
        state.link_up = false;
        if let Some(sink) = &state.sink {
            sink.link_lost();
        }
        true
    }

    /// Push a raw notification into the live connection, if any.
    ///
    /// Returns `true` if the sink accepted it.
    pub async fn notify(&self, characteristic: Uuid, value: &[u8]) -> bool {
        match &self.state.lock().await.sink {
            Some(sink) => sink.value_changed(characteristic, value),
            None => false,
        }
    }

    pub async fn connect_count(&self) -> usize {
        self.state.lock().await.connects
    }

    pub async fn disconnect_count(&self) -> usize {
        self.state.lock().await.disconnects
    }

    /// Every value written so far, with its characteristic.
    pub async fn writes(&self) -> Vec<(Uuid, Vec<u8>)> {
        self.state.lock().await.writes.clone()
    }

    /// Whether the sink accepted each scripted response, in delivery order.
    pub async fn deliveries(&self) -> Vec<bool> {
        self.state.lock().await.deliveries.clone()
    }

    /// Every subscription change requested so far.
    pub async fn subscriptions(&self) -> Vec<(Uuid, bool)> {
        self.state.lock().await.subscriptions.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn address() -> DeviceAddress {
        DeviceAddress::new("AA:BB:CC:DD:EE:FF").unwrap()
    }

    type Slots = (
        mpsc::Receiver<padlock_protocol::Frame>,
        mpsc::Receiver<bool>,
        mpsc::Receiver<()>,
    );

    fn sink() -> (NotificationSink, Slots) {
        let (response_tx, response_rx) = mpsc::channel(1);
        let (ack_tx, ack_rx) = mpsc::channel(1);
        let (link_tx, link_rx) = mpsc::channel(1);
        (
            NotificationSink::new(RESPONSE_CHARACTERISTIC_UUID, response_tx, ack_tx, link_tx),
            (response_rx, ack_rx, link_rx),
        )
    }

    #[tokio::test]
    async fn test_connect_and_disconnect_counts() {
        let (transport, handle) = MockTransport::new();
        let (sink, _slots) = sink();

        let mut connection = transport.connect(&address(), sink).await.unwrap();
        assert_eq!(handle.connect_count().await, 1);

        connection.disconnect().await.unwrap();
        assert_eq!(handle.disconnect_count().await, 1);
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let (transport, handle) = MockTransport::new();
        handle.fail_connect("out of range").await;
        let (sink, _slots) = sink();

        let result = transport.connect(&address(), sink).await;
        assert!(matches!(result, Err(TransportError::ConnectionFailed { .. })));
        assert_eq!(handle.connect_count().await, 0);
    }

    #[tokio::test]
    async fn test_default_services() {
        let (transport, _handle) = MockTransport::new();
        let (sink, _slots) = sink();

        let mut connection = transport.connect(&address(), sink).await.unwrap();
        let services = connection.discover_services().await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].uuid, SERVICE_UUID);
        assert!(services[0].has_characteristic(RESPONSE_CHARACTERISTIC_UUID));
    }

    #[tokio::test]
    async fn test_responder_answers_through_sink() {
        let (transport, handle) = MockTransport::new();
        handle
            .set_responder(|value: &[u8]| vec![vec![0xEE; 3], value.to_vec()])
            .await;
        let (sink, (mut responses, _acks, _link)) = sink();

        let mut connection = transport.connect(&address(), sink).await.unwrap();
        let queued = connection
            .write_characteristic(WRITE_CHARACTERISTIC_UUID, &[0x42; 16])
            .await
            .unwrap();
        assert!(queued);

        // Short noise is dropped, the echo arrives
        let frame = responses.recv().await.unwrap();
        assert_eq!(frame.as_bytes(), &[0x42; 16]);
        assert_eq!(handle.writes().await.len(), 1);
        assert_eq!(handle.deliveries().await, vec![false, true]);
    }

    #[tokio::test]
    async fn test_write_not_queued() {
        let (transport, handle) = MockTransport::new();
        handle.set_write_queued(false).await;
        let (sink, _slots) = sink();

        let mut connection = transport.connect(&address(), sink).await.unwrap();
        let queued = connection
            .write_characteristic(WRITE_CHARACTERISTIC_UUID, &[0u8; 16])
            .await
            .unwrap();
        assert!(!queued);
    }

    #[tokio::test]
    async fn test_subscription_acknowledged() {
        let (transport, handle) = MockTransport::new();
        handle.set_unsubscribe_ack(Some(false)).await;
        let (sink, (_responses, mut acks, _link)) = sink();

        let mut connection = transport.connect(&address(), sink).await.unwrap();
        assert!(connection
            .set_subscription(RESPONSE_CHARACTERISTIC_UUID, true)
            .await
            .unwrap());
        assert_eq!(acks.recv().await, Some(true));

        assert!(connection
            .set_subscription(RESPONSE_CHARACTERISTIC_UUID, false)
            .await
            .unwrap());
        assert_eq!(acks.recv().await, Some(false));

        assert_eq!(
            handle.subscriptions().await,
            vec![
                (RESPONSE_CHARACTERISTIC_UUID, true),
                (RESPONSE_CHARACTERISTIC_UUID, false)
            ]
        );
    }

    #[tokio::test]
    async fn test_operations_after_disconnect_fail() {
        let (transport, _handle) = MockTransport::new();
        let (sink, _slots) = sink();

        let mut connection = transport.connect(&address(), sink).await.unwrap();
        connection.disconnect().await.unwrap();

        let result = connection
            .write_characteristic(WRITE_CHARACTERISTIC_UUID, &[0u8; 16])
            .await;
        assert!(matches!(result, Err(TransportError::Disconnected { .. })));
    }

    #[tokio::test]
    async fn test_handle_notify_without_connection() {
        let (_transport, handle) = MockTransport::new();
        assert!(!handle.notify(RESPONSE_CHARACTERISTIC_UUID, &[0u8; 16]).await);
    }

    #[tokio::test]
    async fn test_drop_link_signals_session() {
        let (transport, handle) = MockTransport::new();
        let (sink, (_responses, _acks, mut link)) = sink();

        let mut connection = transport.connect(&address(), sink).await.unwrap();
        assert!(handle.drop_link().await);
        assert!(!handle.drop_link().await);
        assert_eq!(link.recv().await, Some(()));

        let result = connection
            .write_characteristic(WRITE_CHARACTERISTIC_UUID, &[0u8; 16])
            .await;
        assert!(matches!(result, Err(TransportError::Disconnected { .. })));

        // Releasing a dead link still counts
        connection.disconnect().await.unwrap();
        assert_eq!(handle.disconnect_count().await, 1);
    }

    #[tokio::test]
    async fn test_abandon_releases_in_background() {
        let (transport, handle) = MockTransport::new();
        let (sink, _slots) = sink();

        let mut connection = transport.connect(&address(), sink).await.unwrap();
        connection.abandon(Some(RESPONSE_CHARACTERISTIC_UUID));
        connection.abandon(Some(RESPONSE_CHARACTERISTIC_UUID));
        tokio::task::yield_now().await;

        assert_eq!(handle.disconnect_count().await, 1);
        assert_eq!(
            handle.subscriptions().await,
            vec![(RESPONSE_CHARACTERISTIC_UUID, false)]
        );
        assert!(!handle.notify(RESPONSE_CHARACTERISTIC_UUID, &[0u8; 16]).await);
    }

    #[tokio::test]
    async fn test_abandon_after_disconnect_is_noop() {
        let (transport, handle) = MockTransport::new();
        let (sink, _slots) = sink();

        let mut connection = transport.connect(&address(), sink).await.unwrap();
        connection.disconnect().await.unwrap();
        connection.abandon(None);
        tokio::task::yield_now().await;

        assert_eq!(handle.disconnect_count().await, 1);
    }
}
