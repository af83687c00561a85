//! Muster event bus and notification infrastructure.
//!
//! State changes in the attendance workflow are announced here *after*
//! their transaction commits:
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] -- the canonical event envelope.
//! - [`NotificationDispatcher`] -- background service that turns events
//!   into notification rows, best-effort.
//!
//! A dispatch failure is logged and dropped; it can never undo a committed
//! attendance or points change.

pub mod bus;
pub mod dispatcher;

pub use bus::{DomainEvent, EventBus};
pub use dispatcher::NotificationDispatcher;
