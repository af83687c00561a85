//! Handlers for the points ledger.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use muster_db::repositories::LedgerRepo;
use muster_db::{clamp_limit, clamp_offset};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// Total points summary for one user.
#[derive(Debug, Serialize)]
pub struct PointsTotal {
    pub total: i64,
}

/// GET /api/v1/points/mine
///
/// The caller's total points: the sum over their ledger entries.
pub async fn my_points(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let total = LedgerRepo::total_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse {
        data: PointsTotal { total },
    }))
}

/// GET /api/v1/points/mine/ledger
///
/// The caller's ledger entries, newest first.
pub async fn my_ledger(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);

    let rows = LedgerRepo::list_for_user(&state.pool, user.user_id, limit, offset).await?;
    let total = LedgerRepo::count_for_user(&state.pool, user.user_id).await?;

    Ok(Json(PageResponse {
        data: rows,
        total,
        limit,
        offset,
    }))
}
