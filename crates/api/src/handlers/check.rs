//! Handlers for check-in/check-out tokens and attendance marking.
//!
//! Organizers project a short-lived token as a scannable code; every
//! student in the room presents the same token. The token authenticates
//! the window, the signup row's flags make each student's check-in and
//! check-out idempotent.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use muster_core::attendance;
use muster_core::error::CoreError;
use muster_core::status::SignAction;
use muster_core::types::DbId;
use muster_db::repositories::{ActivityRepo, SignupRepo};
use muster_events::bus::EVENT_CHECKOUT_PENDING;
use muster_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::handlers::ensure_activity_organizer;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireStudent, RequireTeacher};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for student check-in.
#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub token: String,
}

/// Request body for student check-out, with optional self-assessment.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckOutRequest {
    pub token: String,
    #[validate(range(min = 1, max = 5))]
    pub student_rating: Option<i32>,
    pub student_evaluation: Option<String>,
}

/// POST /api/v1/checkin/token/{activity_id}
///
/// Issue a check-in token for an activity the caller organizes.
pub async fn create_check_in_token(
    RequireTeacher(user): RequireTeacher,
    State(state): State<AppState>,
    Path(activity_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    issue_token(state, activity_id, user, SignAction::CheckIn).await
}

/// POST /api/v1/checkout/token/{activity_id}
///
/// Issue a check-out token for an activity the caller organizes.
pub async fn create_check_out_token(
    RequireTeacher(user): RequireTeacher,
    State(state): State<AppState>,
    Path(activity_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    issue_token(state, activity_id, user, SignAction::CheckOut).await
}

async fn issue_token(
    state: AppState,
    activity_id: DbId,
    user: AuthUser,
    action: SignAction,
) -> AppResult<impl IntoResponse> {
    let activity = ensure_activity_organizer(&state.pool, activity_id, &user).await?;

    if !activity.status.allows_attendance() {
        return Err(AppError::Core(CoreError::Validation(
            "Activity is not open for attendance".into(),
        )));
    }

    let record = state
        .token_issuer
        .issue(activity.id, action, state.config.check_token_ttl_mins);

    tracing::info!(
        user_id = user.user_id,
        activity_id,
        action = action.as_str(),
        expires_at = %record.expires_at,
        "Issued attendance token"
    );

    Ok(Json(DataResponse { data: record }))
}

/// POST /api/v1/checkin
///
/// Mark the calling student as present, against a live check-in token.
pub async fn check_in(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Json(input): Json<CheckInRequest>,
) -> AppResult<impl IntoResponse> {
    let token = state.token_issuer.consume(&input.token, SignAction::CheckIn)?;

    let signup = SignupRepo::find_by_activity_and_user(&state.pool, token.activity_id, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::SignupNotFound))?;

    attendance::ensure_can_check_in(signup.attendance_state())?;

    // Conditional flip: if a concurrent request already won, report the
    // same state error the guard would have.
    if !SignupRepo::mark_signed_in(&state.pool, signup.id).await? {
        return Err(AppError::Core(CoreError::AlreadySignedIn));
    }

    tracing::info!(
        user_id = user.user_id,
        activity_id = token.activity_id,
        signup_id = signup.id,
        "Student checked in"
    );

    let signup = SignupRepo::find_by_id(&state.pool, signup.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Signup",
            id: signup.id,
        }))?;

    Ok(Json(DataResponse { data: signup }))
}

/// POST /api/v1/checkout
///
/// Mark the calling student as departed, against a live check-out token,
/// recording the optional self-rating and evaluation. Fires a best-effort
/// "review due" notification to the organizer.
pub async fn check_out(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Json(input): Json<CheckOutRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let token = state.token_issuer.consume(&input.token, SignAction::CheckOut)?;

    let signup = SignupRepo::find_by_activity_and_user(&state.pool, token.activity_id, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::SignupNotFound))?;

    attendance::ensure_can_check_out(signup.attendance_state())?;

    let evaluation = input
        .student_evaluation
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    if !SignupRepo::mark_signed_out(&state.pool, signup.id, input.student_rating, evaluation).await? {
        return Err(AppError::Core(CoreError::AlreadySignedOut));
    }

    tracing::info!(
        user_id = user.user_id,
        activity_id = token.activity_id,
        signup_id = signup.id,
        "Student checked out"
    );

    // The organizer learns a review is due; delivery is best-effort and
    // never blocks the committed check-out.
    if let Some(activity) = ActivityRepo::find_by_id(&state.pool, token.activity_id).await? {
        state.event_bus.publish(
            DomainEvent::new(EVENT_CHECKOUT_PENDING, activity.organizer_id)
                .with_signup(activity.id, signup.id)
                .with_actor(user.user_id)
                .with_payload(serde_json::json!({
                    "student_evaluation": evaluation,
                })),
        );
    }

    let signup = SignupRepo::find_by_id(&state.pool, signup.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Signup",
            id: signup.id,
        }))?;

    Ok(Json(DataResponse { data: signup }))
}

/// GET /api/v1/checkin/{activity_id}/pending
///
/// Approved students who have not checked in yet.
pub async fn list_pending_check_in(
    RequireTeacher(user): RequireTeacher,
    State(state): State<AppState>,
    Path(activity_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_activity_organizer(&state.pool, activity_id, &user).await?;
    let rows = SignupRepo::pending_check_in(&state.pool, activity_id).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/checkout/{activity_id}/pending
///
/// Checked-in students who have not checked out yet.
pub async fn list_pending_check_out(
    RequireTeacher(user): RequireTeacher,
    State(state): State<AppState>,
    Path(activity_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_activity_organizer(&state.pool, activity_id, &user).await?;
    let rows = SignupRepo::pending_check_out(&state.pool, activity_id).await?;
    Ok(Json(DataResponse { data: rows }))
}
