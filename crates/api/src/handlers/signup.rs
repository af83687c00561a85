//! Handlers for the signup lifecycle: create, approve/reject, cancel,
//! and the student/organizer listings.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use muster_core::error::CoreError;
use muster_core::status::{ActivityStatus, SignupStatus};
use muster_core::types::DbId;
use muster_db::models::signup::{CreateSignup, SignupListFilter};
use muster_db::repositories::{ActivityRepo, SignupRepo};
use muster_db::{clamp_limit, clamp_offset};
use muster_events::bus::{EVENT_SIGNUP_DECIDED, EVENT_SIGNUP_SUBMITTED};
use muster_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::handlers::ensure_activity_organizer;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireStudent, RequireTeacher};
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// Request body for creating a signup.
#[derive(Debug, Deserialize)]
pub struct SignupCreateRequest {
    pub activity_id: DbId,
    pub reason: Option<String>,
}

/// Request body for rejecting a signup.
#[derive(Debug, Deserialize, Default)]
pub struct SignupRejectRequest {
    pub reason: Option<String>,
}

/// Query parameters for the student's own signup listing.
#[derive(Debug, Deserialize)]
pub struct MySignupsParams {
    /// A signup status name (e.g. `PENDING`); anything else is a bad request.
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for an organizer's per-activity signup listing.
#[derive(Debug, Deserialize)]
pub struct ActivitySignupsParams {
    /// A signup status name (e.g. `PENDING`); anything else is a bad request.
    pub status: Option<String>,
    pub signed_in: Option<bool>,
    pub signed_out: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Parse an optional signup-status query value.
fn parse_status(status: Option<&str>) -> AppResult<Option<SignupStatus>> {
    status
        .map(|s| s.parse::<SignupStatus>())
        .transpose()
        .map_err(AppError::BadRequest)
}

/// POST /api/v1/signups
///
/// Sign the calling student up for a published activity.
pub async fn create_signup(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Json(input): Json<SignupCreateRequest>,
) -> AppResult<impl IntoResponse> {
    let activity = ActivityRepo::find_by_id(&state.pool, input.activity_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Activity",
            id: input.activity_id,
        }))?;

    if activity.status != ActivityStatus::Published {
        return Err(AppError::Core(CoreError::RegistrationClosed(
            "activity is not open for registration",
        )));
    }

    let now = Utc::now();
    if let Some(deadline) = activity.registration_deadline {
        if deadline < now {
            return Err(AppError::Core(CoreError::RegistrationClosed(
                "registration deadline has passed",
            )));
        }
    }
    if activity.start_time < now {
        return Err(AppError::Core(CoreError::RegistrationClosed(
            "activity has already started",
        )));
    }

    if SignupRepo::exists(&state.pool, activity.id, user.user_id).await? {
        return Err(AppError::Core(CoreError::AlreadySignedUp));
    }

    let reason = input
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    // The unique constraint still backs this up if two requests race past
    // the existence check.
    let signup = SignupRepo::create(
        &state.pool,
        &CreateSignup {
            activity_id: activity.id,
            user_id: user.user_id,
            reason: reason.clone(),
        },
    )
    .await?;

    tracing::info!(
        user_id = user.user_id,
        activity_id = activity.id,
        signup_id = signup.id,
        "Signup created"
    );

    state.event_bus.publish(
        DomainEvent::new(EVENT_SIGNUP_SUBMITTED, activity.organizer_id)
            .with_signup(activity.id, signup.id)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({ "reason": reason })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: signup })))
}

/// POST /api/v1/signups/{signup_id}/approve
///
/// Approve a pending signup on an activity the caller organizes.
pub async fn approve_signup(
    RequireTeacher(user): RequireTeacher,
    State(state): State<AppState>,
    Path(signup_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    decide_signup(state, signup_id, user, SignupStatus::Approved, None).await
}

/// POST /api/v1/signups/{signup_id}/reject
///
/// Reject a pending signup, with an optional reason for the student.
pub async fn reject_signup(
    RequireTeacher(user): RequireTeacher,
    State(state): State<AppState>,
    Path(signup_id): Path<DbId>,
    Json(input): Json<SignupRejectRequest>,
) -> AppResult<impl IntoResponse> {
    let reason = input
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    decide_signup(state, signup_id, user, SignupStatus::Rejected, reason).await
}

async fn decide_signup(
    state: AppState,
    signup_id: DbId,
    user: AuthUser,
    status: SignupStatus,
    reject_reason: Option<String>,
) -> AppResult<impl IntoResponse> {
    let signup = SignupRepo::find_by_id(&state.pool, signup_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Signup",
            id: signup_id,
        }))?;

    ensure_activity_organizer(&state.pool, signup.activity_id, &user).await?;

    // Conditional update: only a still-pending signup can be decided, no
    // matter how the reads above interleaved.
    if !SignupRepo::decide(&state.pool, signup_id, status, reject_reason.as_deref()).await? {
        return Err(AppError::Core(CoreError::SignupStatusInvalid));
    }

    let approved = status == SignupStatus::Approved;
    tracing::info!(
        user_id = user.user_id,
        signup_id,
        approved,
        "Signup decided"
    );

    state.event_bus.publish(
        DomainEvent::new(EVENT_SIGNUP_DECIDED, signup.user_id)
            .with_signup(signup.activity_id, signup_id)
            .with_actor(user.user_id)
            .with_payload(serde_json::json!({
                "approved": approved,
                "reason": reject_reason,
            })),
    );

    let signup = SignupRepo::find_by_id(&state.pool, signup_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Signup",
            id: signup_id,
        }))?;

    Ok(Json(DataResponse { data: signup }))
}

/// DELETE /api/v1/signups/{signup_id}
///
/// Cancel the caller's own pending signup, before the activity starts.
pub async fn cancel_signup(
    user: AuthUser,
    State(state): State<AppState>,
    Path(signup_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let signup = SignupRepo::find_by_id(&state.pool, signup_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Signup",
            id: signup_id,
        }))?;

    if signup.user_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the signup owner may cancel it".into(),
        )));
    }

    if signup.status != SignupStatus::Pending {
        return Err(AppError::Core(CoreError::SignupStatusInvalid));
    }

    if let Some(activity) = ActivityRepo::find_by_id(&state.pool, signup.activity_id).await? {
        if activity.start_time < Utc::now() {
            return Err(AppError::Core(CoreError::RegistrationClosed(
                "activity has already started",
            )));
        }
    }

    SignupRepo::delete(&state.pool, signup_id).await?;

    tracing::info!(user_id = user.user_id, signup_id, "Signup cancelled");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/signups/mine
///
/// The calling student's signups, newest first.
pub async fn my_signups(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<MySignupsParams>,
) -> AppResult<impl IntoResponse> {
    let status = parse_status(params.status.as_deref())?;
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);

    let rows =
        SignupRepo::list_for_user(&state.pool, user.user_id, status, limit, offset).await?;
    let total = SignupRepo::count_for_user(&state.pool, user.user_id, status).await?;

    Ok(Json(PageResponse {
        data: rows,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/activities/{activity_id}/signups
///
/// Signups for one of the caller's activities, with optional status and
/// attendance-flag filters.
pub async fn activity_signups(
    RequireTeacher(user): RequireTeacher,
    State(state): State<AppState>,
    Path(activity_id): Path<DbId>,
    Query(params): Query<ActivitySignupsParams>,
) -> AppResult<impl IntoResponse> {
    ensure_activity_organizer(&state.pool, activity_id, &user).await?;

    let filter = SignupListFilter {
        status: parse_status(params.status.as_deref())?,
        signed_in: params.signed_in,
        signed_out: params.signed_out,
    };
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);

    let rows =
        SignupRepo::list_for_activity(&state.pool, activity_id, &filter, limit, offset).await?;
    let total = SignupRepo::count_for_activity(&state.pool, activity_id, &filter).await?;

    Ok(Json(PageResponse {
        data: rows,
        total,
        limit,
        offset,
    }))
}
