//! Repository for the `activities` table.
//!
//! The attendance service only reads activities (organizer, points,
//! status, time window); the insert exists for seeding and tests.

use muster_core::types::DbId;
use sqlx::PgPool;

use crate::models::activity::{Activity, CreateActivity};

/// Column list for activities queries.
const ACTIVITY_COLUMNS: &str = "id, organizer_id, title, location, start_time, end_time, \
    registration_deadline, points, status, created_at, updated_at";

pub struct ActivityRepo;

impl ActivityRepo {
    /// Find an activity by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = $1");
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert an activity, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateActivity) -> Result<Activity, sqlx::Error> {
        let query = format!(
            "INSERT INTO activities
                (organizer_id, title, location, start_time, end_time,
                 registration_deadline, points, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {ACTIVITY_COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(input.organizer_id)
            .bind(&input.title)
            .bind(&input.location)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.registration_deadline)
            .bind(input.points)
            .bind(input.status)
            .fetch_one(pool)
            .await
    }
}
