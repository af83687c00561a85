//! Handlers for the organizer review workflow.
//!
//! A review finalizes one student's attendance: confirm the rating, cut
//! the immutable service record (first time only), and settle points.
//! The signup mutation, record insert, and ledger insert share one
//! transaction; the student notification fires only after commit.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use muster_core::attendance;
use muster_core::error::CoreError;
use muster_core::settlement::{self, Settlement};
use muster_core::status::ReviewStatus;
use muster_core::types::DbId;
use muster_db::models::ledger::SOURCE_SERVICE_AWARD;
use muster_db::models::service_record::NewServiceRecord;
use muster_db::models::signup::{ReviewSearchFilter, SignupReviewRow};
use muster_db::repositories::{LedgerRepo, ServiceRecordRepo, SignupRepo};
use muster_db::{clamp_limit, clamp_offset};
use muster_events::bus::EVENT_REVIEW_COMPLETED;
use muster_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::handlers::ensure_activity_organizer;
use crate::middleware::rbac::RequireTeacher;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// Request body for the review endpoint.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub teacher_rating: i32,
    pub teacher_evaluation: Option<String>,
}

/// Query parameters for the review search.
#[derive(Debug, Deserialize)]
pub struct ReviewSearchParams {
    pub activity_id: Option<DbId>,
    pub keyword: Option<String>,
    /// `PENDING` or `REVIEWED`; anything else is a bad request.
    pub review_status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One review-queue item with its derived status.
#[derive(Debug, Serialize)]
pub struct ReviewItem {
    #[serde(flatten)]
    pub row: SignupReviewRow,
    pub review_status: ReviewStatus,
}

/// PATCH /api/v1/review/{signup_id}
///
/// Confirm (or adjust) the rating for a signed-out signup. The first
/// confirmation materializes the service record and grants the award;
/// later adjustments settle only positive deltas.
pub async fn review_signup(
    RequireTeacher(user): RequireTeacher,
    State(state): State<AppState>,
    Path(signup_id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<impl IntoResponse> {
    attendance::validate_rating(input.teacher_rating)?;

    let evaluation = input
        .teacher_evaluation
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut tx = state.pool.begin().await?;

    // Row lock: the previous rating and the finalization flag are read
    // under the same lock that covers the write, so concurrent reviews
    // serialize.
    let signup = SignupRepo::lock_for_review(&mut *tx, signup_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Signup",
            id: signup_id,
        }))?;

    let activity = ensure_activity_organizer(&state.pool, signup.activity_id, &user).await?;

    attendance::ensure_reviewable(signup.attendance_state())?;

    let first_finalization = signup.is_unfinalized();
    let previous_rating = signup.teacher_rating;
    let now = Utc::now();

    SignupRepo::apply_review(&mut *tx, signup_id, input.teacher_rating, evaluation, now).await?;

    if first_finalization {
        let sign_in_time = signup.sign_in_time.ok_or_else(|| {
            AppError::InternalError("signed-in signup is missing its sign-in time".into())
        })?;
        let sign_out_time = signup.sign_out_time.ok_or_else(|| {
            AppError::InternalError("signed-out signup is missing its sign-out time".into())
        })?;

        ServiceRecordRepo::insert(
            &mut *tx,
            &NewServiceRecord {
                signup_id,
                user_id: signup.user_id,
                activity_id: signup.activity_id,
                duration_minutes: attendance::duration_minutes(sign_in_time, sign_out_time),
                rating: input.teacher_rating,
                evaluation: evaluation.map(str::to_string),
                description: signup.student_evaluation.clone(),
                points_earned: settlement::award_points(activity.points, input.teacher_rating),
            },
        )
        .await?;
    }

    let settlement = settlement::settle(
        activity.points,
        previous_rating,
        input.teacher_rating,
        first_finalization,
    );
    if let Settlement::Grant(points) = settlement {
        LedgerRepo::insert(&mut *tx, signup.user_id, points, SOURCE_SERVICE_AWARD).await?;
    }

    tx.commit().await?;

    tracing::info!(
        user_id = user.user_id,
        signup_id,
        teacher_rating = input.teacher_rating,
        first_finalization,
        granted = ?settlement.granted(),
        "Signup reviewed"
    );

    // The student hears about the outcome once, on first finalization;
    // delivery is best-effort and outside the committed transaction.
    if first_finalization {
        state.event_bus.publish(
            DomainEvent::new(EVENT_REVIEW_COMPLETED, signup.user_id)
                .with_signup(signup.activity_id, signup_id)
                .with_actor(user.user_id)
                .with_payload(serde_json::json!({
                    "teacher_rating": input.teacher_rating,
                    "approved": input.teacher_rating >= 3,
                    "teacher_evaluation": evaluation,
                })),
        );
    }

    let signup = SignupRepo::find_by_id(&state.pool, signup_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Signup",
            id: signup_id,
        }))?;

    Ok(Json(DataResponse { data: signup }))
}

/// GET /api/v1/review/search
///
/// The caller's review queue: signed-out signups across their activities,
/// filterable by activity, student keyword, and derived review status.
pub async fn search_reviews(
    RequireTeacher(user): RequireTeacher,
    State(state): State<AppState>,
    Query(params): Query<ReviewSearchParams>,
) -> AppResult<impl IntoResponse> {
    let review_status = params
        .review_status
        .as_deref()
        .map(|s| s.parse::<ReviewStatus>())
        .transpose()
        .map_err(AppError::BadRequest)?;

    let filter = ReviewSearchFilter {
        activity_id: params.activity_id,
        keyword: params
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        review_status,
    };

    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);

    let rows = SignupRepo::search_reviews(&state.pool, user.user_id, &filter, limit, offset).await?;
    let total = SignupRepo::count_reviews(&state.pool, user.user_id, &filter).await?;

    let items: Vec<ReviewItem> = rows
        .into_iter()
        .map(|row| ReviewItem {
            review_status: row.review_status(),
            row,
        })
        .collect();

    Ok(Json(PageResponse {
        data: items,
        total,
        limit,
        offset,
    }))
}
