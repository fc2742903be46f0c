//! Producer half of the response correlator.
//!
//! The radio stack calls into a [`NotificationSink`] from its own delivery
//! context. Every deposit is non-blocking: a value that does not fit into
//! its single-slot mailbox, or that arrives after the receiving session is
//! gone, is dropped. Loss of the link is signalled through a third slot so a
//! pending wait ends immediately instead of running out its window.

use padlock_protocol::Frame;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use uuid::Uuid;

/// Deposit side of the per-session response and acknowledgement mailboxes.
#[derive(Debug, Clone)]
pub struct NotificationSink {
    response_characteristic: Uuid,
    responses: mpsc::Sender<Frame>,
    acks: mpsc::Sender<bool>,
    link: mpsc::Sender<()>,
}

impl NotificationSink {
    /// Create a sink that feeds `responses` with frames arriving on
    /// `response_characteristic`, `acks` with subscription outcomes and
    /// `link` with a signal when the connection drops.
    pub fn new(
        response_characteristic: Uuid,
        responses: mpsc::Sender<Frame>,
        acks: mpsc::Sender<bool>,
        link: mpsc::Sender<()>,
    ) -> Self {
        Self {
            response_characteristic,
            responses,
            acks,
            link,
        }
    }

    /// Characteristic whose notifications are accepted as responses.
    pub fn response_characteristic(&self) -> Uuid {
        self.response_characteristic
    }

    /// Deliver a value-changed notification.
    ///
    /// Returns `true` if the value was accepted into the response slot.
    /// Values from other characteristics, values that are not exactly one
    /// frame long, and values arriving while the slot is occupied are dropped.
    pub fn value_changed(&self, characteristic: Uuid, value: &[u8]) -> bool {
        if characteristic != self.response_characteristic {
            trace!(%characteristic, len = value.len(), "Ignoring notification from other characteristic");
            return false;
        }

        let Ok(frame) = Frame::from_slice(value) else {
            trace!(len = value.len(), "Ignoring notification with wrong length");
            return false;
        };

        match self.responses.try_send(frame) {
            Ok(()) => {
                trace!(frame = %frame, "Response deposited");
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                trace!("Response slot occupied, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                trace!("Session gone, dropping late frame");
                false
            }
        }
    }

    /// Deliver the outcome of a subscription descriptor write.
    ///
    /// Returns `true` if the acknowledgement was accepted.
    pub fn subscription_ack(&self, success: bool) -> bool {
        let accepted = self.acks.try_send(success).is_ok();
        if !accepted {
            trace!(success, "Dropping subscription acknowledgement");
        }
        accepted
    }

    /// Report that the radio link dropped.
    ///
    /// Returns `true` if this is the first report the session receives.
    pub fn link_lost(&self) -> bool {
        let first = self.link.try_send(()).is_ok();
        if first {
            debug!("Link loss reported to session");
        }
        first
    }
}
