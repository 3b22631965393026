//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans out [`BulkActionNotice`]s to every subscriber (toast
//! presenters, CLI printers, audit sinks). It is designed to be shared via
//! `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use elecmate_core::bulk::{BulkActionKind, BulkResultKind};
use elecmate_core::types::UserId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// BulkActionNotice
// ---------------------------------------------------------------------------

/// Summary of one settled bulk action.
///
/// Constructed via [`BulkActionNotice::new`] and enriched with
/// [`with_actor`](BulkActionNotice::with_actor),
/// [`with_counts`](BulkActionNotice::with_counts) and
/// [`with_payload`](BulkActionNotice::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkActionNotice {
    pub action: BulkActionKind,

    pub result: BulkResultKind,

    /// Human-readable summary line.
    pub message: String,

    /// Id of the user whose session ran the action, when known.
    pub actor_user_id: Option<UserId>,

    pub succeeded: usize,

    pub failed: usize,

    /// Free-form JSON payload carrying action-specific data.
    pub payload: serde_json::Value,

    /// When the action settled (UTC).
    pub timestamp: DateTime<Utc>,
}

impl BulkActionNotice {
    /// Create a notice with zero counts and an empty payload.
    pub fn new(action: BulkActionKind, result: BulkResultKind, message: impl Into<String>) -> Self {
        Self {
            action,
            result,
            message: message.into(),
            actor_user_id: None,
            succeeded: 0,
            failed: 0,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_actor(mut self, user_id: impl Into<UserId>) -> Self {
        self.actor_user_id = Some(user_id.into());
        self
    }

    pub fn with_counts(mut self, succeeded: usize, failed: usize) -> Self {
        self.succeeded = succeeded;
        self.failed = failed;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use elecmate_core::bulk::{BulkActionKind, BulkResultKind};
/// use elecmate_events::bus::{BulkActionNotice, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(BulkActionNotice::new(
///     BulkActionKind::Delete,
///     BulkResultKind::Success,
///     "Deleted 2 reports",
/// ));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<BulkActionNotice>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed notices are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notice to all current subscribers.
    ///
    /// If there are no active subscribers the notice is dropped.
    pub fn publish(&self, notice: BulkActionNotice) {
        tracing::debug!(
            action = %notice.action,
            succeeded = notice.succeeded,
            failed = notice.failed,
            "Publishing bulk action notice"
        );
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(notice);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BulkActionNotice> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
