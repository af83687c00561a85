pub mod check;
pub mod notification;
pub mod points;
pub mod records;
pub mod review;
pub mod signup;

use muster_core::error::CoreError;
use muster_db::models::activity::Activity;
use muster_db::repositories::ActivityRepo;
use muster_db::DbPool;
use muster_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Load an activity and verify the caller organizes it (admins pass).
///
/// The ownership boundary for every organizer-side operation: token
/// issuance, signup decisions, rosters, and review.
pub(crate) async fn ensure_activity_organizer(
    pool: &DbPool,
    activity_id: DbId,
    user: &AuthUser,
) -> AppResult<Activity> {
    let activity = ActivityRepo::find_by_id(pool, activity_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Activity",
            id: activity_id,
        }))?;

    if !user.is_admin() && activity.organizer_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the activity organizer may do this".into(),
        )));
    }

    Ok(activity)
}
