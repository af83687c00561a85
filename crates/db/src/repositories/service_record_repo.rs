//! Repository for the `service_records` table.
//!
//! Insertion happens only inside the review transaction; the unique index
//! on `signup_id` backs the one-record-per-signup invariant.

use muster_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::service_record::{NewServiceRecord, ServiceRecord};

/// Column list for service record queries.
const RECORD_COLUMNS: &str = "id, signup_id, user_id, activity_id, duration_minutes, \
    rating, evaluation, description, points_earned, created_at";

pub struct ServiceRecordRepo;

impl ServiceRecordRepo {
    /// Materialize the record for a first finalization, inside an open
    /// transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        input: &NewServiceRecord,
    ) -> Result<ServiceRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO service_records
                (signup_id, user_id, activity_id, duration_minutes,
                 rating, evaluation, description, points_earned)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {RECORD_COLUMNS}"
        );
        sqlx::query_as::<_, ServiceRecord>(&query)
            .bind(input.signup_id)
            .bind(input.user_id)
            .bind(input.activity_id)
            .bind(input.duration_minutes)
            .bind(input.rating)
            .bind(&input.evaluation)
            .bind(&input.description)
            .bind(input.points_earned)
            .fetch_one(conn)
            .await
    }

    /// Find a record by id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ServiceRecord>, sqlx::Error> {
        let query = format!("SELECT {RECORD_COLUMNS} FROM service_records WHERE id = $1");
        sqlx::query_as::<_, ServiceRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The record for one signup, if it was ever finalized.
    pub async fn find_by_signup(
        pool: &PgPool,
        signup_id: DbId,
    ) -> Result<Option<ServiceRecord>, sqlx::Error> {
        let query = format!("SELECT {RECORD_COLUMNS} FROM service_records WHERE signup_id = $1");
        sqlx::query_as::<_, ServiceRecord>(&query)
            .bind(signup_id)
            .fetch_optional(pool)
            .await
    }

    /// Number of records held by one signup.
    pub async fn count_for_signup(pool: &PgPool, signup_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM service_records WHERE signup_id = $1")
                .bind(signup_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// A user's records, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ServiceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM service_records
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ServiceRecord>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count for [`list_for_user`](Self::list_for_user).
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM service_records WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}
