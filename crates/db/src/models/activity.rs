use muster_core::status::ActivityStatus;
use muster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `activities` table.
///
/// This service reads activities (organizer, reward points, status, time
/// window); activity CRUD itself belongs to the catalog service.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Activity {
    pub id: DbId,
    pub organizer_id: DbId,
    pub title: String,
    pub location: Option<String>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub registration_deadline: Option<Timestamp>,
    pub points: i32,
    pub status: ActivityStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting an activity (seeding and tests).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateActivity {
    pub organizer_id: DbId,
    pub title: String,
    pub location: Option<String>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub registration_deadline: Option<Timestamp>,
    pub points: i32,
    pub status: ActivityStatus,
}
