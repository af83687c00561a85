//! Route definitions for attendance tokens and check-in/check-out.
//!
//! ```text
//! POST   /checkin/token/{activity_id}     create_check_in_token
//! POST   /checkout/token/{activity_id}    create_check_out_token
//! POST   /checkin                         check_in
//! POST   /checkout                        check_out
//! GET    /checkin/{activity_id}/pending   list_pending_check_in
//! GET    /checkout/{activity_id}/pending  list_pending_check_out
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::check;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkin/token/{activity_id}", post(check::create_check_in_token))
        .route("/checkout/token/{activity_id}", post(check::create_check_out_token))
        .route("/checkin", post(check::check_in))
        .route("/checkout", post(check::check_out))
        .route("/checkin/{activity_id}/pending", get(check::list_pending_check_in))
        .route("/checkout/{activity_id}/pending", get(check::list_pending_check_out))
}
