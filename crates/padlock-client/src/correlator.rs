//! Consumer half of the response correlator.
//!
//! Notifications arrive through the transport's delivery context, while the
//! session runs strictly sequentially. Two single-slot channels bridge the
//! gap: one for response frames, one for subscription acknowledgements. The
//! producer half is the [`NotificationSink`] handed to the transport.
//!
//! A wait consumes exactly one value, times out, or ends early because the
//! transport reported loss of the link. Link loss is sticky: every later
//! wait of the session fails at once. Dropping the correlator closes all
//! slots, so anything the radio delivers afterwards is discarded by the sink.

use padlock_protocol::Frame;
use padlock_transport::NotificationSink;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use uuid::Uuid;

/// Capacity of each mailbox.
const SLOT_CAPACITY: usize = 1;

/// Why a wait ended without a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    /// The window elapsed.
    TimedOut,
    /// The link dropped or the transport released its sink.
    Closed,
}

#[derive(Debug)]
struct LinkSignal {
    receiver: mpsc::Receiver<()>,
    lost: bool,
}

enum Woken<T> {
    Value(Option<T>),
    LinkLost,
}

/// Wait on `slot` until a value arrives, the link drops or `window` elapses.
async fn wait_for<T>(
    slot: &mut mpsc::Receiver<T>,
    link: &mut LinkSignal,
    window: Duration,
) -> Result<T, WaitError> {
    if link.lost {
        return Err(WaitError::Closed);
    }

    let woken = tokio::time::timeout(window, async {
        tokio::select! {
            biased;
            value = slot.recv() => Woken::Value(value),
            _ = link.receiver.recv() => Woken::LinkLost,
        }
    })
    .await;

    match woken {
        Ok(Woken::Value(Some(value))) => Ok(value),
        Ok(Woken::Value(None)) => Err(WaitError::Closed),
        Ok(Woken::LinkLost) => {
            debug!("Wait ended by link loss");
            link.lost = true;
            Err(WaitError::Closed)
        }
        Err(_) => Err(WaitError::TimedOut),
    }
}

/// Receiving side of a session's response and acknowledgement mailboxes.
#[derive(Debug)]
pub struct ResponseCorrelator {
    responses: mpsc::Receiver<Frame>,
    acks: mpsc::Receiver<bool>,
    link: LinkSignal,
}

impl ResponseCorrelator {
    /// Create the mailbox pair for one session.
    ///
    /// Only notifications on `response_characteristic` are accepted by the
    /// returned sink.
    pub fn new(response_characteristic: Uuid) -> (NotificationSink, Self) {
        let (response_tx, responses) = mpsc::channel(SLOT_CAPACITY);
        let (ack_tx, acks) = mpsc::channel(SLOT_CAPACITY);
        let (link_tx, link) = mpsc::channel(SLOT_CAPACITY);
        (
            NotificationSink::new(response_characteristic, response_tx, ack_tx, link_tx),
            Self {
                responses,
                acks,
                link: LinkSignal {
                    receiver: link,
                    lost: false,
                },
            },
        )
    }

    /// Discard stale frames left in the response slot.
    ///
    /// Returns how many were discarded.
    pub fn drain_responses(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(frame) = self.responses.try_recv() {
            trace!(frame = %frame, "Discarding stale response");
            drained += 1;
        }
        drained
    }

    /// Discard stale subscription acknowledgements.
    pub fn drain_acks(&mut self) -> usize {
        let mut drained = 0;
        while self.acks.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }

    /// Wait up to `window` for the next response frame.
    pub async fn await_response(&mut self, window: Duration) -> Result<Frame, WaitError> {
        wait_for(&mut self.responses, &mut self.link, window).await
    }

    /// Wait up to `window` for the next subscription acknowledgement.
    pub async fn await_ack(&mut self, window: Duration) -> Result<bool, WaitError> {
        wait_for(&mut self.acks, &mut self.link, window).await
    }

    /// Whether the transport reported loss of the link.
    pub fn link_lost(&self) -> bool {
        self.link.lost
    }
}
