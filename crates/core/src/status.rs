//! Status sum types for activities, signups, and the review queue.
//!
//! Each enum maps to a PostgreSQL enum type of the same name; the database
//! values use SCREAMING_SNAKE_CASE to match the wire representation.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Lifecycle status of an activity.
///
/// Only `Published` activities accept signups; check-in/out tokens can be
/// issued while `Published` or `Ongoing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    Draft,
    PendingApproval,
    Published,
    Ongoing,
    Completed,
    Cancelled,
    Rejected,
}

impl ActivityStatus {
    /// Whether attendance tokens may be issued for an activity in this state.
    pub fn allows_attendance(self) -> bool {
        match self {
            ActivityStatus::Published | ActivityStatus::Ongoing => true,
            ActivityStatus::Draft
            | ActivityStatus::PendingApproval
            | ActivityStatus::Completed
            | ActivityStatus::Cancelled
            | ActivityStatus::Rejected => false,
        }
    }
}

/// Approval status of a signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "signup_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignupStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// Which side of the attendance window a check token opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignAction {
    CheckIn,
    CheckOut,
}

impl SignAction {
    pub fn as_str(self) -> &'static str {
        match self {
            SignAction::CheckIn => "check_in",
            SignAction::CheckOut => "check_out",
        }
    }
}

impl std::str::FromStr for SignupStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(SignupStatus::Pending),
            "APPROVED" => Ok(SignupStatus::Approved),
            "REJECTED" => Ok(SignupStatus::Rejected),
            "CANCELLED" => Ok(SignupStatus::Cancelled),
            other => Err(format!("unknown signup status '{other}'")),
        }
    }
}

/// Derived review state of a signed-out signup.
///
/// A signup counts as reviewed only once both the rating and the
/// confirmation timestamp are present; a rating without confirmation is
/// still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Pending,
    Reviewed,
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ReviewStatus::Pending),
            "REVIEWED" => Ok(ReviewStatus::Reviewed),
            other => Err(format!("unknown review status '{other}'")),
        }
    }
}

impl ReviewStatus {
    /// Derive the review status from the stored rating and confirmation.
    pub fn derive(teacher_rating: Option<i32>, confirmed_at: Option<Timestamp>) -> Self {
        match (teacher_rating, confirmed_at) {
            (Some(_), Some(_)) => ReviewStatus::Reviewed,
            _ => ReviewStatus::Pending,
        }
    }
}
