//! Handlers for service records: the immutable audit trail of finalized
//! attendance.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use muster_core::error::CoreError;
use muster_core::types::DbId;
use muster_db::repositories::{ActivityRepo, ServiceRecordRepo};
use muster_db::{clamp_limit, clamp_offset};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// GET /api/v1/records/mine
///
/// The caller's service records, newest first.
pub async fn my_records(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);

    let rows = ServiceRecordRepo::list_for_user(&state.pool, user.user_id, limit, offset).await?;
    let total = ServiceRecordRepo::count_for_user(&state.pool, user.user_id).await?;

    Ok(Json(PageResponse {
        data: rows,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/records/{record_id}
///
/// One service record, visible to its owner, the activity's organizer,
/// and admins.
pub async fn get_record(
    user: AuthUser,
    State(state): State<AppState>,
    Path(record_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = ServiceRecordRepo::find_by_id(&state.pool, record_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ServiceRecord",
            id: record_id,
        }))?;

    if record.user_id != user.user_id && !user.is_admin() {
        let organizes = ActivityRepo::find_by_id(&state.pool, record.activity_id)
            .await?
            .is_some_and(|activity| activity.organizer_id == user.user_id);
        if !organizes {
            return Err(AppError::Core(CoreError::Forbidden(
                "Not allowed to view this record".into(),
            )));
        }
    }

    Ok(Json(DataResponse { data: record }))
}
