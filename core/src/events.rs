//! Transition events exposed to the presentation layer.
//!
//! Every successful lifecycle operation yields one transition event. The
//! event is both returned to the caller and published on an in-process
//! broadcast channel; it is the sole channel by which lists, counters and
//! alerts learn of changes. The core carries no UI vocabulary.

use crate::types::{RequestId, RequestStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A committed status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEvent {
    /// The request that moved.
    pub request_id: RequestId,
    /// Status before the transition; `None` for submission.
    pub from_status: Option<RequestStatus>,
    /// Status after the transition.
    pub to_status: RequestStatus,
    /// When the transition was committed.
    pub timestamp: DateTime<Utc>,
}

/// Default capacity of the broadcast channel behind a [`TransitionBus`].
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// In-process fan-out of transition events.
///
/// Publishing is fire-and-forget: events are only delivered to currently
/// registered subscribers, and having none is not an error. The stores
/// remain the source of truth; the bus exists for presentation-side
/// consumers.
#[derive(Debug, Clone)]
pub struct TransitionBus {
    sender: broadcast::Sender<TransitionEvent>,
}

impl TransitionBus {
    /// Create a bus with the given channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a bus with [`DEFAULT_BUS_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    /// Subscribe to transition events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.sender.subscribe()
    }

    /// Publish a committed transition.
    pub fn publish(&self, event: TransitionEvent) {
        // send only fails when there are no subscribers; that is fine.
        let _ = self.sender.send(event);
    }
}

impl Default for TransitionBus {
    fn default() -> Self {
        Self::new()
    }
}
