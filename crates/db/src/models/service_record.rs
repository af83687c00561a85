use muster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `service_records` table: the immutable audit snapshot
/// written exactly once per finalized signup.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceRecord {
    pub id: DbId,
    pub signup_id: DbId,
    pub user_id: DbId,
    pub activity_id: DbId,
    pub duration_minutes: i32,
    pub rating: i32,
    pub evaluation: Option<String>,
    pub description: Option<String>,
    pub points_earned: i64,
    pub created_at: Timestamp,
}

/// DTO for materializing a record at first finalization.
#[derive(Debug, Clone, Deserialize)]
pub struct NewServiceRecord {
    pub signup_id: DbId,
    pub user_id: DbId,
    pub activity_id: DbId,
    pub duration_minutes: i32,
    pub rating: i32,
    /// The organizer's written evaluation.
    pub evaluation: Option<String>,
    /// The student's own evaluation, carried over from check-out.
    pub description: Option<String>,
    pub points_earned: i64,
}
