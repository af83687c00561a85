pub mod check;
pub mod health;
pub mod notification;
pub mod points;
pub mod records;
pub mod review;
pub mod signup;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /checkin/token/{activity_id}        issue check-in token (organizer)
/// /checkout/token/{activity_id}       issue check-out token (organizer)
/// /checkin                            student check-in
/// /checkout                           student check-out
/// /checkin/{activity_id}/pending      roster: not yet checked in
/// /checkout/{activity_id}/pending     roster: not yet checked out
///
/// /review/{signup_id}                 confirm/adjust a rating (organizer)
/// /review/search                      review queue (organizer, paged)
///
/// /signups                            create (student)
/// /signups/mine                       own signups (paged)
/// /signups/{signup_id}                cancel (owner)
/// /signups/{signup_id}/approve        approve (organizer)
/// /signups/{signup_id}/reject         reject (organizer)
/// /activities/{activity_id}/signups   organizer's signup listing (paged)
///
/// /points/mine                        total points
/// /points/mine/ledger                 ledger entries (paged)
///
/// /records/mine                       own service records (paged)
/// /records/{record_id}                one record
///
/// /notifications/mine                 own notifications (paged)
/// /notifications/{id}/read            mark read
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(check::router())
        .merge(review::router())
        .merge(signup::router())
        .merge(points::router())
        .merge(records::router())
        .merge(notification::router())
}
