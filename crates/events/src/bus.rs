//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`DomainEvent`]s. It is
//! shared via `Arc<EventBus>` across the application; publishing happens
//! only after the owning transaction has committed.

use chrono::{DateTime, Utc};
use muster_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A student submitted a signup; notifies the organizer.
pub const EVENT_SIGNUP_SUBMITTED: &str = "signup.submitted";

/// An organizer approved or rejected a signup; notifies the student.
pub const EVENT_SIGNUP_DECIDED: &str = "signup.decided";

/// A student checked out; notifies the organizer that a review is due.
pub const EVENT_CHECKOUT_PENDING: &str = "attendance.checkout_pending";

/// An organizer finalized a review; notifies the student.
pub const EVENT_REVIEW_COMPLETED: &str = "review.completed";

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred in the attendance workflow.
///
/// Constructed via [`DomainEvent::new`] and enriched with the builder
/// methods [`with_signup`](DomainEvent::with_signup),
/// [`with_actor`](DomainEvent::with_actor), and
/// [`with_payload`](DomainEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Dot-separated event name, e.g. `"signup.submitted"`.
    pub kind: String,

    /// The user this event should reach.
    pub recipient_user_id: DbId,

    /// The activity the event happened on.
    pub activity_id: Option<DbId>,

    /// The signup the event happened on.
    pub signup_id: Option<DbId>,

    /// The user whose action triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// Create a new event with the required kind and recipient.
    ///
    /// All optional fields default to `None` / empty object.
    pub fn new(kind: impl Into<String>, recipient_user_id: DbId) -> Self {
        Self {
            kind: kind.into(),
            recipient_user_id,
            activity_id: None,
            signup_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the signup (and its activity) the event is about.
    pub fn with_signup(mut self, activity_id: DbId, signup_id: DbId) -> Self {
        self.activity_id = Some(activity_id);
        self.signup_id = Some(signup_id);
        self
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DomainEvent`].
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped:
    /// notifications are best-effort by contract.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
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
