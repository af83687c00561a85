//! Repository for the `signups` table and its projections.
//!
//! Attendance flag flips are single conditional UPDATEs so concurrent
//! requests against the same row serialize on the store's per-row update
//! semantics: exactly one caller observes `rows_affected = 1`.

use muster_core::status::{ReviewStatus, SignupStatus};
use muster_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::signup::{
    CreateSignup, PendingAttendeeRow, ReviewSearchFilter, Signup, SignupListFilter,
    SignupReviewRow,
};

/// Column list for signups queries.
const SIGNUP_COLUMNS: &str = "id, activity_id, user_id, status, reason, reject_reason, \
    signed_in, signed_out, sign_in_time, sign_out_time, \
    student_rating, student_evaluation, teacher_rating, teacher_evaluation, \
    teacher_rating_confirmed_at, created_at, updated_at";

/// Column list for the review projection (prefixed, joined with users and
/// activities).
const REVIEW_ROW_COLUMNS: &str = "s.id AS signup_id, s.activity_id, a.title AS activity_title, \
    s.user_id AS student_id, u.name AS student_name, u.username AS student_no, \
    s.sign_in_time, s.sign_out_time, s.student_rating, s.student_evaluation, \
    s.teacher_rating, s.teacher_evaluation, s.teacher_rating_confirmed_at";

pub struct SignupRepo;

impl SignupRepo {
    /// Insert a pending signup, returning the created row.
    ///
    /// The unique constraint on (activity_id, user_id) backs the
    /// at-most-one-signup rule under races.
    pub async fn create(pool: &PgPool, input: &CreateSignup) -> Result<Signup, sqlx::Error> {
        let query = format!(
            "INSERT INTO signups (activity_id, user_id, reason)
             VALUES ($1, $2, $3)
             RETURNING {SIGNUP_COLUMNS}"
        );
        sqlx::query_as::<_, Signup>(&query)
            .bind(input.activity_id)
            .bind(input.user_id)
            .bind(&input.reason)
            .fetch_one(pool)
            .await
    }

    /// Find a signup by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Signup>, sqlx::Error> {
        let query = format!("SELECT {SIGNUP_COLUMNS} FROM signups WHERE id = $1");
        sqlx::query_as::<_, Signup>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user's signup for one activity.
    pub async fn find_by_activity_and_user(
        pool: &PgPool,
        activity_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Signup>, sqlx::Error> {
        let query = format!(
            "SELECT {SIGNUP_COLUMNS} FROM signups WHERE activity_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, Signup>(&query)
            .bind(activity_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a signup already exists for (activity, user).
    pub async fn exists(
        pool: &PgPool,
        activity_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM signups WHERE activity_id = $1 AND user_id = $2)",
        )
        .bind(activity_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Move a pending signup to a decided status, storing the rejection
    /// reason when present. Returns `false` when the signup was not pending
    /// (already decided, or concurrently decided).
    pub async fn decide(
        pool: &PgPool,
        id: DbId,
        status: SignupStatus,
        reject_reason: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE signups
             SET status = $2, reject_reason = $3, updated_at = now()
             WHERE id = $1 AND status = 'PENDING'",
        )
        .bind(id)
        .bind(status)
        .bind(reject_reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip the signed-in flag. Returns `false` when already signed in, so
    /// exactly one of two concurrent check-ins by the same student wins.
    pub async fn mark_signed_in(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE signups
             SET signed_in = TRUE, sign_in_time = now(), updated_at = now()
             WHERE id = $1 AND signed_in = FALSE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip the signed-out flag and store the optional self-rating and
    /// evaluation. Returns `false` when the window was not open (not signed
    /// in, or already signed out).
    pub async fn mark_signed_out(
        pool: &PgPool,
        id: DbId,
        student_rating: Option<i32>,
        student_evaluation: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE signups
             SET signed_out = TRUE,
                 sign_out_time = now(),
                 student_rating = COALESCE($2, student_rating),
                 student_evaluation = COALESCE($3, student_evaluation),
                 updated_at = now()
             WHERE id = $1 AND signed_in = TRUE AND signed_out = FALSE",
        )
        .bind(id)
        .bind(student_rating)
        .bind(student_evaluation)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a signup (pre-check-in cancellation only; callers enforce
    /// the state rules).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM signups WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Load a signup with a row lock, inside an open transaction.
    ///
    /// The review path reads the previous rating and the finalization flag
    /// under this lock so a concurrent review cannot interleave between
    /// the read and the write.
    pub async fn lock_for_review(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Signup>, sqlx::Error> {
        let query = format!("SELECT {SIGNUP_COLUMNS} FROM signups WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Signup>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Write the review fields, inside an open transaction.
    pub async fn apply_review(
        conn: &mut PgConnection,
        id: DbId,
        teacher_rating: i32,
        teacher_evaluation: Option<&str>,
        confirmed_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE signups
             SET teacher_rating = $2,
                 teacher_evaluation = $3,
                 teacher_rating_confirmed_at = $4,
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(teacher_rating)
        .bind(teacher_evaluation)
        .bind(confirmed_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// A student's own signups, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        status: Option<SignupStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Signup>, sqlx::Error> {
        let query = format!(
            "SELECT {SIGNUP_COLUMNS} FROM signups
             WHERE user_id = $1
               AND ($2::signup_status IS NULL OR status = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Signup>(&query)
            .bind(user_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count for [`list_for_user`](Self::list_for_user).
    pub async fn count_for_user(
        pool: &PgPool,
        user_id: DbId,
        status: Option<SignupStatus>,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM signups
             WHERE user_id = $1
               AND ($2::signup_status IS NULL OR status = $2)",
        )
        .bind(user_id)
        .bind(status)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Signups for one activity with optional status / attendance-flag
    /// filters, newest first.
    pub async fn list_for_activity(
        pool: &PgPool,
        activity_id: DbId,
        filter: &SignupListFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Signup>, sqlx::Error> {
        let query = format!(
            "SELECT {SIGNUP_COLUMNS} FROM signups
             WHERE activity_id = $1
               AND ($2::signup_status IS NULL OR status = $2)
               AND ($3::boolean IS NULL OR signed_in = $3)
               AND ($4::boolean IS NULL OR signed_out = $4)
             ORDER BY created_at DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Signup>(&query)
            .bind(activity_id)
            .bind(filter.status)
            .bind(filter.signed_in)
            .bind(filter.signed_out)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count for [`list_for_activity`](Self::list_for_activity).
    pub async fn count_for_activity(
        pool: &PgPool,
        activity_id: DbId,
        filter: &SignupListFilter,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM signups
             WHERE activity_id = $1
               AND ($2::signup_status IS NULL OR status = $2)
               AND ($3::boolean IS NULL OR signed_in = $3)
               AND ($4::boolean IS NULL OR signed_out = $4)",
        )
        .bind(activity_id)
        .bind(filter.status)
        .bind(filter.signed_in)
        .bind(filter.signed_out)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Approved students who have not checked in yet, by signup age.
    pub async fn pending_check_in(
        pool: &PgPool,
        activity_id: DbId,
    ) -> Result<Vec<PendingAttendeeRow>, sqlx::Error> {
        sqlx::query_as::<_, PendingAttendeeRow>(
            "SELECT s.id AS signup_id, s.user_id, u.name, u.username, s.sign_in_time
             FROM signups s
             JOIN users u ON u.id = s.user_id
             WHERE s.activity_id = $1
               AND s.status = 'APPROVED'
               AND s.signed_in = FALSE
             ORDER BY s.created_at ASC",
        )
        .bind(activity_id)
        .fetch_all(pool)
        .await
    }

    /// Checked-in students who have not checked out yet, most recent
    /// check-in first.
    pub async fn pending_check_out(
        pool: &PgPool,
        activity_id: DbId,
    ) -> Result<Vec<PendingAttendeeRow>, sqlx::Error> {
        sqlx::query_as::<_, PendingAttendeeRow>(
            "SELECT s.id AS signup_id, s.user_id, u.name, u.username, s.sign_in_time
             FROM signups s
             JOIN users u ON u.id = s.user_id
             WHERE s.activity_id = $1
               AND s.status = 'APPROVED'
               AND s.signed_in = TRUE
               AND s.signed_out = FALSE
             ORDER BY s.sign_in_time DESC",
        )
        .bind(activity_id)
        .fetch_all(pool)
        .await
    }

    /// The organizer's review queue: signed-out approved signups across
    /// their activities, newest sign-out first.
    pub async fn search_reviews(
        pool: &PgPool,
        organizer_id: DbId,
        filter: &ReviewSearchFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SignupReviewRow>, sqlx::Error> {
        let query = format!(
            "SELECT {REVIEW_ROW_COLUMNS}
             FROM signups s
             JOIN activities a ON a.id = s.activity_id
             JOIN users u ON u.id = s.user_id
             WHERE a.organizer_id = $1
               AND s.status = 'APPROVED'
               AND s.signed_out = TRUE
               AND ($2::bigint IS NULL OR s.activity_id = $2)
               AND ($3::boolean IS NULL
                    OR ($3 AND (s.teacher_rating IS NULL OR s.teacher_rating_confirmed_at IS NULL))
                    OR (NOT $3 AND s.teacher_rating IS NOT NULL AND s.teacher_rating_confirmed_at IS NOT NULL))
               AND ($4::text IS NULL
                    OR u.name ILIKE '%' || $4 || '%'
                    OR u.username ILIKE '%' || $4 || '%')
             ORDER BY s.sign_out_time DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, SignupReviewRow>(&query)
            .bind(organizer_id)
            .bind(filter.activity_id)
            .bind(Self::pending_only(filter.review_status))
            .bind(&filter.keyword)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count for [`search_reviews`](Self::search_reviews).
    pub async fn count_reviews(
        pool: &PgPool,
        organizer_id: DbId,
        filter: &ReviewSearchFilter,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*)
             FROM signups s
             JOIN activities a ON a.id = s.activity_id
             JOIN users u ON u.id = s.user_id
             WHERE a.organizer_id = $1
               AND s.status = 'APPROVED'
               AND s.signed_out = TRUE
               AND ($2::bigint IS NULL OR s.activity_id = $2)
               AND ($3::boolean IS NULL
                    OR ($3 AND (s.teacher_rating IS NULL OR s.teacher_rating_confirmed_at IS NULL))
                    OR (NOT $3 AND s.teacher_rating IS NOT NULL AND s.teacher_rating_confirmed_at IS NOT NULL))
               AND ($4::text IS NULL
                    OR u.name ILIKE '%' || $4 || '%'
                    OR u.username ILIKE '%' || $4 || '%')",
        )
        .bind(organizer_id)
        .bind(filter.activity_id)
        .bind(Self::pending_only(filter.review_status))
        .bind(&filter.keyword)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Map the review-status filter onto the tri-state SQL parameter:
    /// `Some(true)` pending only, `Some(false)` reviewed only, `None` all.
    fn pending_only(review_status: Option<ReviewStatus>) -> Option<bool> {
        review_status.map(|status| status == ReviewStatus::Pending)
    }
}
