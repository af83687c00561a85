//! Signup rows and the projections built over them.

use muster_core::attendance::AttendanceState;
use muster_core::status::{ReviewStatus, SignupStatus};
use muster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `signups` table -- the anchor entity of the attendance
/// workflow. Created at signup time, mutated at approval, check-in,
/// check-out, and review; deleted only via pre-check-in cancellation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Signup {
    pub id: DbId,
    pub activity_id: DbId,
    pub user_id: DbId,
    pub status: SignupStatus,
    pub reason: Option<String>,
    pub reject_reason: Option<String>,
    pub signed_in: bool,
    pub signed_out: bool,
    pub sign_in_time: Option<Timestamp>,
    pub sign_out_time: Option<Timestamp>,
    pub student_rating: Option<i32>,
    pub student_evaluation: Option<String>,
    pub teacher_rating: Option<i32>,
    pub teacher_evaluation: Option<String>,
    pub teacher_rating_confirmed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Signup {
    /// The slice of this row the attendance guards operate on.
    pub fn attendance_state(&self) -> AttendanceState {
        AttendanceState {
            status: self.status,
            signed_in: self.signed_in,
            signed_out: self.signed_out,
        }
    }

    /// Whether this review would be the first finalization.
    pub fn is_unfinalized(&self) -> bool {
        self.teacher_rating_confirmed_at.is_none()
    }
}

/// DTO for creating a signup.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSignup {
    pub activity_id: DbId,
    pub user_id: DbId,
    pub reason: Option<String>,
}

/// Filters for an organizer's signup listing on one activity.
#[derive(Debug, Clone, Default)]
pub struct SignupListFilter {
    pub status: Option<SignupStatus>,
    pub signed_in: Option<bool>,
    pub signed_out: Option<bool>,
}

/// Filters for the review search projection.
#[derive(Debug, Clone, Default)]
pub struct ReviewSearchFilter {
    pub activity_id: Option<DbId>,
    /// Matches student name or student number, case-insensitively.
    pub keyword: Option<String>,
    pub review_status: Option<ReviewStatus>,
}

/// One row of the organizer's review queue: a signed-out signup joined
/// with its student and activity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SignupReviewRow {
    pub signup_id: DbId,
    pub activity_id: DbId,
    pub activity_title: String,
    pub student_id: DbId,
    pub student_name: String,
    pub student_no: String,
    pub sign_in_time: Option<Timestamp>,
    pub sign_out_time: Option<Timestamp>,
    pub student_rating: Option<i32>,
    pub student_evaluation: Option<String>,
    pub teacher_rating: Option<i32>,
    pub teacher_evaluation: Option<String>,
    pub teacher_rating_confirmed_at: Option<Timestamp>,
}

impl SignupReviewRow {
    /// Pending until both the rating and its confirmation are stored.
    pub fn review_status(&self) -> ReviewStatus {
        ReviewStatus::derive(self.teacher_rating, self.teacher_rating_confirmed_at)
    }
}

/// One roster row: a student still owing a check-in or check-out.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingAttendeeRow {
    pub signup_id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub username: String,
    pub sign_in_time: Option<Timestamp>,
}
