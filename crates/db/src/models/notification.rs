use muster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notifications` table.
///
/// Rows are written best-effort by the notification dispatcher after the
/// owning transaction commits; rendering the payload into user-facing text
/// is the notification front end's concern.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub kind: String,
    pub payload: serde_json::Value,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// DTO for inserting a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub kind: String,
    pub payload: serde_json::Value,
}
