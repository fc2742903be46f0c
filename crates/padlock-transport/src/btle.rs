//! Bluetooth LE transport backed by `btleplug`.
//!
//! The lock is addressed by its MAC address. A peripheral the adapter has
//! already seen is used straight away; otherwise the adapter scans for a
//! bounded period until the address shows up.

use crate::{
    Result, TransportError,
    sink::NotificationSink,
    traits::{LockConnection, LockTransport, ServiceDescriptor},
};
use btleplug::api::{
    Central, CentralEvent, CentralState, Characteristic, Manager as _, Peripheral as _,
    ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use padlock_core::DeviceAddress;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/// Default time spent scanning for an address the adapter has not seen yet.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(10);

const SCAN_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Upper bound on the background unsubscribe of an abandoned connection.
const ABANDON_UNSUBSCRIBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Transport over the host's first Bluetooth adapter.
pub struct BtleTransport {
    adapter: Adapter,
    scan_timeout: Duration,
}

impl BtleTransport {
    /// Open the first Bluetooth adapter.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Unavailable`] if the platform has no
    /// adapter or the adapter is not powered on.
    pub async fn new() -> Result<Self> {
        let manager = Manager::new()
            .await
            .map_err(|e| TransportError::unavailable(e.to_string()))?;
        let adapters = manager
            .adapters()
            .await
            .map_err(|e| TransportError::unavailable(e.to_string()))?;
        let adapter = adapters
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::unavailable("No Bluetooth adapter found"))?;

        let state = adapter
            .adapter_state()
            .await
            .map_err(|e| TransportError::unavailable(e.to_string()))?;
        ensure_powered(state)?;

        info!("Bluetooth adapter ready");
        Ok(Self {
            adapter,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
        })
    }

    /// Set how long to scan for an address that is not cached yet.
    pub fn with_scan_timeout(mut self, scan_timeout: Duration) -> Self {
        self.scan_timeout = scan_timeout;
        self
    }

    async fn cached_peripheral(&self, address: &DeviceAddress) -> Result<Option<Peripheral>> {
        let peripherals = self.adapter.peripherals().await?;
        Ok(peripherals.into_iter().find(|p| {
            p.address()
                .to_string()
                .eq_ignore_ascii_case(address.as_str())
        }))
    }

    async fn find_peripheral(&self, address: &DeviceAddress) -> Result<Peripheral> {
        if let Some(peripheral) = self.cached_peripheral(address).await? {
            return Ok(peripheral);
        }

        debug!(%address, timeout_ms = self.scan_timeout.as_millis() as u64, "Scanning for lock");
        self.adapter.start_scan(ScanFilter::default()).await?;

        let found = tokio::time::timeout(self.scan_timeout, async {
            loop {
                if let Some(peripheral) = self.cached_peripheral(address).await? {
                    return Ok::<_, TransportError>(peripheral);
                }
                tokio::time::sleep(SCAN_POLL_INTERVAL).await;
            }
        })
        .await;

        if let Err(e) = self.adapter.stop_scan().await {
            warn!(error = %e, "Failed to stop scan");
        }

        match found {
            Ok(result) => result,
            Err(_) => Err(TransportError::device_not_found(address.as_str())),
        }
    }
}

impl LockTransport for BtleTransport {
    type Connection = BtleConnection;

    async fn connect(
        &self,
        address: &DeviceAddress,
        sink: NotificationSink,
    ) -> Result<BtleConnection> {
        let peripheral = self.find_peripheral(address).await?;

        peripheral
            .connect()
            .await
            .map_err(|e| TransportError::connection_failed(e.to_string()))?;

        let tasks = match self.start_link_tasks(&peripheral, &sink).await {
            Ok(tasks) => tasks,
            Err(e) => {
                if let Err(e) = peripheral.disconnect().await {
                    warn!(error = %e, "Disconnect after failed setup failed");
                }
                return Err(e);
            }
        };

        info!(%address, "Connected to lock");
        Ok(BtleConnection {
            peripheral,
            sink,
            address: address.clone(),
            tasks,
            released: false,
        })
    }
}

impl BtleTransport {
    /// Spawn the notification forwarder and the link watcher.
    ///
    /// Both report loss of the link to `sink`: the forwarder when the
    /// notification stream ends, the watcher when the adapter announces the
    /// peripheral's disconnection.
    async fn start_link_tasks(
        &self,
        peripheral: &Peripheral,
        sink: &NotificationSink,
    ) -> Result<Vec<JoinHandle<()>>> {
        let mut notifications = peripheral.notifications().await?;
        let mut events = self.adapter.events().await?;

        let forward_sink = sink.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(notification) = notifications.next().await {
                trace!(
                    characteristic = %notification.uuid,
                    len = notification.value.len(),
                    "Notification received"
                );
                forward_sink.value_changed(notification.uuid, &notification.value);
            }
            debug!("Notification stream ended");
            forward_sink.link_lost();
        });

        let id = peripheral.id();
        let watch_sink = sink.clone();
        let watcher = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let CentralEvent::DeviceDisconnected(lost) = event
                    && lost == id
                {
                    warn!("Lock dropped the link");
                    watch_sink.link_lost();
                    break;
                }
            }
        });

        Ok(vec![forwarder, watcher])
    }
}

/// Reject an adapter that is not powered on.
fn ensure_powered(state: CentralState) -> Result<()> {
    match state {
        CentralState::PoweredOn => Ok(()),
        other => Err(TransportError::unavailable(format!(
            "Bluetooth adapter is not powered on ({other:?})"
        ))),
    }
}

/// Live link to a lock peripheral.
pub struct BtleConnection {
    peripheral: Peripheral,
    sink: NotificationSink,
    address: DeviceAddress,
    tasks: Vec<JoinHandle<()>>,
    released: bool,
}

impl BtleConnection {
    fn characteristic(&self, uuid: Uuid) -> Option<Characteristic> {
        self.peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == uuid)
    }

    fn stop_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl LockConnection for BtleConnection {
    async fn discover_services(&mut self) -> Result<Vec<ServiceDescriptor>> {
        self.peripheral
            .discover_services()
            .await
            .map_err(|e| TransportError::discovery_failed(e.to_string()))?;

        Ok(self
            .peripheral
            .services()
            .into_iter()
            .map(|service| {
                ServiceDescriptor::new(
                    service.uuid,
                    service.characteristics.iter().map(|c| c.uuid).collect(),
                )
            })
            .collect())
    }

    async fn write_characteristic(&mut self, characteristic: Uuid, value: &[u8]) -> Result<bool> {
        let Some(target) = self.characteristic(characteristic) else {
            warn!(%characteristic, "Write to unknown characteristic");
            return Ok(false);
        };

        self.peripheral
            .write(&target, value, WriteType::WithResponse)
            .await?;
        Ok(true)
    }

    async fn set_subscription(&mut self, characteristic: Uuid, enabled: bool) -> Result<bool> {
        let Some(target) = self.characteristic(characteristic) else {
            warn!(%characteristic, "Subscription change on unknown characteristic");
            return Ok(false);
        };

        // The descriptor write completes asynchronously; report the outcome
        // through the sink like any other radio callback.
        let peripheral = self.peripheral.clone();
        let sink = self.sink.clone();
        tokio::spawn(async move {
            let result = if enabled {
                peripheral.subscribe(&target).await
            } else {
                peripheral.unsubscribe(&target).await
            };
            if let Err(e) = &result {
                warn!(error = %e, enabled, "Subscription descriptor write failed");
            }
            sink.subscription_ack(result.is_ok());
        });
        Ok(true)
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.stop_tasks();
        self.released = true;
        self.peripheral.disconnect().await?;
        info!(address = %self.address, "Disconnected from lock");
        Ok(())
    }

    fn abandon(&mut self, unsubscribe: Option<Uuid>) {
        self.stop_tasks();
        if self.released {
            return;
        }
        self.released = true;

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(address = %self.address, "No runtime to release the link");
            return;
        };
        let target = unsubscribe.and_then(|uuid| self.characteristic(uuid));
        let peripheral = self.peripheral.clone();
        let address = self.address.clone();
        runtime.spawn(async move {
            if let Some(target) = target {
                match tokio::time::timeout(
                    ABANDON_UNSUBSCRIBE_TIMEOUT,
                    peripheral.unsubscribe(&target),
                )
                .await
                {
                    Ok(Ok(())) => debug!(%address, "Notifications disabled"),
                    Ok(Err(e)) => warn!(%address, error = %e, "Failed to disable notifications"),
                    Err(_) => warn!(%address, "Timed out disabling notifications"),
                }
            }
            match peripheral.disconnect().await {
                Ok(()) => info!(%address, "Abandoned link released"),
                Err(e) => warn!(%address, error = %e, "Disconnect failed"),
            }
        });
    }
}

impl Drop for BtleConnection {
    fn drop(&mut self) {
        self.abandon(None);
    }
}
