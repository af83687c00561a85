//! Best-effort notification dispatch.
//!
//! [`NotificationDispatcher`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and writes one notification row per received
//! [`DomainEvent`]. It runs as a long-lived background task, entirely
//! outside the transactions that produced the events: an insert failure is
//! logged and the event dropped, never propagated back to the workflow.

use muster_db::models::notification::CreateNotification;
use muster_db::repositories::NotificationRepo;
use muster_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::DomainEvent;

/// Background service that persists domain events as user notifications.
pub struct NotificationDispatcher;

impl NotificationDispatcher {
    /// Run the dispatch loop.
    ///
    /// Subscribes to the event bus via the provided `receiver` and persists
    /// every event it receives. The loop exits when the channel is closed
    /// (i.e. the [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::dispatch(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            kind = %event.kind,
                            recipient_user_id = event.recipient_user_id,
                            "Failed to dispatch notification"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Notification dispatcher lagged, some notifications were not delivered"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event as a notification row for its recipient.
    async fn dispatch(pool: &DbPool, event: &DomainEvent) -> Result<(), sqlx::Error> {
        let payload = serde_json::json!({
            "activity_id": event.activity_id,
            "signup_id": event.signup_id,
            "actor_user_id": event.actor_user_id,
            "detail": event.payload,
        });

        let notification = NotificationRepo::insert(
            pool,
            &CreateNotification {
                user_id: event.recipient_user_id,
                kind: event.kind.clone(),
                payload,
            },
        )
        .await?;

        tracing::debug!(
            notification_id = notification.id,
            kind = %event.kind,
            recipient_user_id = event.recipient_user_id,
            "Notification dispatched"
        );
        Ok(())
    }
}
