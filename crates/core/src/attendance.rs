//! Attendance state-transition guards.
//!
//! The signup rows themselves live in the db crate; these functions
//! validate transitions over the fields that matter so every call site
//! fails with the same typed error for the same bad state.

use crate::error::CoreError;
use crate::status::SignupStatus;
use crate::types::Timestamp;

/// The slice of a signup the attendance guards operate on.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceState {
    pub status: SignupStatus,
    pub signed_in: bool,
    pub signed_out: bool,
}

/// A student may check in once, on an approved signup.
pub fn ensure_can_check_in(state: AttendanceState) -> Result<(), CoreError> {
    ensure_approved(state.status)?;
    if state.signed_in {
        return Err(CoreError::AlreadySignedIn);
    }
    Ok(())
}

/// A student may check out once, after checking in.
pub fn ensure_can_check_out(state: AttendanceState) -> Result<(), CoreError> {
    ensure_approved(state.status)?;
    if !state.signed_in {
        return Err(CoreError::NotSignedIn);
    }
    if state.signed_out {
        return Err(CoreError::AlreadySignedOut);
    }
    Ok(())
}

/// A review requires a completed attendance window: checked in and out.
pub fn ensure_reviewable(state: AttendanceState) -> Result<(), CoreError> {
    if !state.signed_in {
        return Err(CoreError::NotSignedIn);
    }
    if !state.signed_out {
        return Err(CoreError::NotSignedOut);
    }
    Ok(())
}

fn ensure_approved(status: SignupStatus) -> Result<(), CoreError> {
    match status {
        SignupStatus::Approved => Ok(()),
        SignupStatus::Pending | SignupStatus::Rejected | SignupStatus::Cancelled => {
            Err(CoreError::SignupNotApproved)
        }
    }
}

/// Attended minutes between check-in and check-out, floored at zero.
pub fn duration_minutes(sign_in: Timestamp, sign_out: Timestamp) -> i32 {
    (sign_out - sign_in).num_minutes().max(0) as i32
}

/// A teacher rating must sit in the 1–5 band.
pub fn validate_rating(rating: i32) -> Result<(), CoreError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "rating must be between 1 and 5, got {rating}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    fn approved(signed_in: bool, signed_out: bool) -> AttendanceState {
        AttendanceState {
            status: SignupStatus::Approved,
            signed_in,
            signed_out,
        }
    }

    #[test]
    fn check_in_requires_approved_signup() {
        for status in [
            SignupStatus::Pending,
            SignupStatus::Rejected,
            SignupStatus::Cancelled,
        ] {
            let state = AttendanceState {
                status,
                signed_in: false,
                signed_out: false,
            };
            assert_matches!(ensure_can_check_in(state), Err(CoreError::SignupNotApproved));
        }
        assert!(ensure_can_check_in(approved(false, false)).is_ok());
    }

    #[test]
    fn second_check_in_is_rejected() {
        assert_matches!(
            ensure_can_check_in(approved(true, false)),
            Err(CoreError::AlreadySignedIn)
        );
    }

    #[test]
    fn check_out_before_check_in_is_rejected() {
        assert_matches!(
            ensure_can_check_out(approved(false, false)),
            Err(CoreError::NotSignedIn)
        );
    }

    #[test]
    fn second_check_out_is_rejected() {
        assert_matches!(
            ensure_can_check_out(approved(true, true)),
            Err(CoreError::AlreadySignedOut)
        );
        assert!(ensure_can_check_out(approved(true, false)).is_ok());
    }

    #[test]
    fn review_requires_full_attendance_window() {
        assert_matches!(
            ensure_reviewable(approved(false, false)),
            Err(CoreError::NotSignedIn)
        );
        assert_matches!(
            ensure_reviewable(approved(true, false)),
            Err(CoreError::NotSignedOut)
        );
        assert!(ensure_reviewable(approved(true, true)).is_ok());
    }

    #[test]
    fn duration_is_floored_at_zero() {
        let now = Utc::now();
        assert_eq!(duration_minutes(now, now + Duration::minutes(90)), 90);
        assert_eq!(duration_minutes(now, now - Duration::minutes(5)), 0);
    }

    #[test]
    fn rating_band_is_one_to_five() {
        for rating in 1..=5 {
            assert!(validate_rating(rating).is_ok());
        }
        assert_matches!(validate_rating(0), Err(CoreError::Validation(_)));
        assert_matches!(validate_rating(6), Err(CoreError::Validation(_)));
    }
}
