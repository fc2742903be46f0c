//! Session lifecycle state machine.
//!
//! Every lock operation walks one session through a fixed lifecycle:
//!
//! - `Connecting` → `Discovering` → `EnablingNotifications` → `Ready`
//! - `Ready` → `Executing` → `Ready` (once per command)
//! - `Ready` → `DisablingNotifications` → `Closed`
//! - any non-terminal state → `Aborted`
//!
//! `Closed` and `Aborted` are terminal. Teardown of an aborted session still
//! releases the link but leaves the state at `Aborted`.
//!
//! # Examples
//!
//! ```
//! use padlock_client::{SessionState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! assert_eq!(machine.current_state(), &SessionState::Connecting);
//!
//! machine.transition_to(SessionState::Discovering).unwrap();
//! assert!(machine.transition_to(SessionState::Executing).is_err());
//!
//! machine.transition_to(SessionState::Aborted).unwrap();
//! assert!(machine.current_state().is_terminal());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use padlock_core::{Error, Result};

/// Maximum number of state transitions to keep in history.
///
/// A lock operation takes at most ten transitions.
const MAX_HISTORY_SIZE: usize = 32;

/// Lifecycle states of a lock session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Resolving the address and establishing the link.
    Connecting,

    /// Enumerating services and resolving the lock characteristics.
    Discovering,

    /// Waiting for the subscription descriptor write to be acknowledged.
    EnablingNotifications,

    /// Notifications active, no command in flight.
    Ready,

    /// One command written, waiting for its response.
    Executing,

    /// Teardown in progress.
    DisablingNotifications,

    /// Torn down after a complete sequence.
    Closed,

    /// Failed; absorbing.
    Aborted,
}

impl SessionState {
    /// Check if a transition to `target` is allowed.
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        matches!(
            (self, target),
            (SessionState::Connecting, SessionState::Discovering)
                | (SessionState::Discovering, SessionState::EnablingNotifications)
                | (SessionState::EnablingNotifications, SessionState::Ready)
                | (
                    SessionState::Ready,
                    SessionState::Executing | SessionState::DisablingNotifications
                )
                | (SessionState::Executing, SessionState::Ready)
                | (SessionState::DisablingNotifications, SessionState::Closed)
                | (
                    SessionState::Connecting
                        | SessionState::Discovering
                        | SessionState::EnablingNotifications
                        | SessionState::Ready
                        | SessionState::Executing,
                    SessionState::Aborted
                )
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Closed | SessionState::Aborted)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Connecting => "Connecting",
            SessionState::Discovering => "Discovering",
            SessionState::EnablingNotifications => "EnablingNotifications",
            SessionState::Ready => "Ready",
            SessionState::Executing => "Executing",
            SessionState::DisablingNotifications => "DisablingNotifications",
            SessionState::Closed => "Closed",
            SessionState::Aborted => "Aborted",
        };
        f.write_str(name)
    }
}

/// Notification subscription state of the response characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    #[default]
    Unsubscribed,
    Subscribing,
    Active,
    Unsubscribing,
}

impl SubscriptionState {
    /// Whether teardown has to disable notifications.
    pub fn needs_unsubscribe(&self) -> bool {
        matches!(
            self,
            SubscriptionState::Subscribing | SubscriptionState::Active
        )
    }
}

/// A single recorded state transition.
#[derive(Debug, Clone)]
pub struct StateTransition {
    pub from: SessionState,
    pub to: SessionState,
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: SessionState, to: SessionState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }
}

/// Validating state machine with bounded history.
///
/// # Examples
///
/// ```
/// use padlock_client::{SessionState, StateMachine};
///
/// let mut machine = StateMachine::new();
/// machine.transition_to(SessionState::Discovering).unwrap();
/// machine.transition_to(SessionState::EnablingNotifications).unwrap();
/// machine.transition_to(SessionState::Ready).unwrap();
///
/// assert_eq!(machine.history().len(), 3);
/// ```
#[derive(Debug)]
pub struct StateMachine {
    current_state: SessionState,
    state_entered_at: Instant,
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// Create a state machine in the `Connecting` state.
    pub fn new() -> Self {
        Self {
            current_state: SessionState::Connecting,
            state_entered_at: Instant::now(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn current_state(&self) -> &SessionState {
        &self.current_state
    }

    /// Time spent in the current state.
    pub fn time_in_current_state(&self) -> Duration {
        self.state_entered_at.elapsed()
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the transition is not
    /// allowed from the current state. The state is left unchanged.
    pub fn transition_to(&mut self, new_state: SessionState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.current_state = new_state;
        self.state_entered_at = transition.timestamp;

        self.history.push_back(transition.clone());
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }

        Ok(transition)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
