//! Handlers for in-app notifications.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use muster_core::error::CoreError;
use muster_core::types::DbId;
use muster_db::repositories::NotificationRepo;
use muster_db::{clamp_limit, clamp_offset};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// GET /api/v1/notifications/mine
///
/// The caller's notifications, newest first.
pub async fn my_notifications(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);

    let rows = NotificationRepo::list_for_user(&state.pool, user.user_id, limit, offset).await?;
    let total = NotificationRepo::count_for_user(&state.pool, user.user_id).await?;

    Ok(Json(PageResponse {
        data: rows,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/notifications/{notification_id}/read
///
/// Mark one of the caller's notifications as read.
pub async fn mark_read(
    user: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !NotificationRepo::mark_read(&state.pool, notification_id, user.user_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id: notification_id,
        }));
    }
    Ok(Json(DataResponse { data: () }))
}
