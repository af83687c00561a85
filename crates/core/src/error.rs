use crate::types::DbId;

/// Domain error taxonomy for attendance and settlement operations.
///
/// Every variant maps to exactly one HTTP error code in the api crate;
/// none of them is retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// The caller has no signup for the activity a token points at.
    #[error("No signup found for this activity")]
    SignupNotFound,

    /// The signup exists but was never approved (or was rejected/cancelled).
    #[error("Signup has not been approved")]
    SignupNotApproved,

    /// Approve/reject attempted on a signup that is no longer pending.
    #[error("Signup is not in a pending state")]
    SignupStatusInvalid,

    /// Duplicate signup for the same (activity, user) pair.
    #[error("Already signed up for this activity")]
    AlreadySignedUp,

    /// The activity is not accepting signups (wrong status, deadline
    /// passed, or already started).
    #[error("Registration closed: {0}")]
    RegistrationClosed(&'static str),

    #[error("Already checked in")]
    AlreadySignedIn,

    #[error("Already checked out")]
    AlreadySignedOut,

    #[error("Not checked in yet")]
    NotSignedIn,

    #[error("Not checked out yet")]
    NotSignedOut,

    /// Token absent from the store, malformed, or issued for another action.
    #[error("Check token is invalid")]
    TokenInvalid,

    #[error("Check token has expired")]
    TokenExpired,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable machine-readable code, used in HTTP error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::SignupNotFound => "SIGNUP_NOT_FOUND",
            CoreError::SignupNotApproved => "SIGNUP_NOT_APPROVED",
            CoreError::SignupStatusInvalid => "SIGNUP_STATUS_INVALID",
            CoreError::AlreadySignedUp => "ALREADY_SIGNED_UP",
            CoreError::RegistrationClosed(_) => "REGISTRATION_CLOSED",
            CoreError::AlreadySignedIn => "ALREADY_SIGNED_IN",
            CoreError::AlreadySignedOut => "ALREADY_SIGNED_OUT",
            CoreError::NotSignedIn => "NOT_SIGNED_IN",
            CoreError::NotSignedOut => "NOT_SIGNED_OUT",
            CoreError::TokenInvalid => "TOKEN_INVALID",
            CoreError::TokenExpired => "TOKEN_EXPIRED",
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::Unauthorized(_) => "UNAUTHORIZED",
            CoreError::Forbidden(_) => "FORBIDDEN",
            CoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
