//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not meet the minimum requirement, enforcing authorization at the type
//! level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use muster_core::error::CoreError;
use muster_core::roles::{ROLE_ADMIN, ROLE_STUDENT, ROLE_TEACHER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `teacher` or `admin` role. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn organizer_only(RequireTeacher(user): RequireTeacher) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireTeacher(pub AuthUser);

impl FromRequestParts<AppState> for RequireTeacher {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_TEACHER && user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Teacher or Admin role required".into(),
            )));
        }
        Ok(RequireTeacher(user))
    }
}

/// Requires the `student` or `admin` role. Rejects with 403 otherwise.
pub struct RequireStudent(pub AuthUser);

impl FromRequestParts<AppState> for RequireStudent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_STUDENT && user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Student role required".into(),
            )));
        }
        Ok(RequireStudent(user))
    }
}
