//! Route definitions for the signup lifecycle.
//!
//! ```text
//! POST   /signups                          create_signup
//! GET    /signups/mine                     my_signups
//! DELETE /signups/{signup_id}              cancel_signup
//! POST   /signups/{signup_id}/approve      approve_signup
//! POST   /signups/{signup_id}/reject       reject_signup
//! GET    /activities/{activity_id}/signups activity_signups
//! ```

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::signup;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signups", post(signup::create_signup))
        .route("/signups/mine", get(signup::my_signups))
        .route("/signups/{signup_id}", delete(signup::cancel_signup))
        .route("/signups/{signup_id}/approve", post(signup::approve_signup))
        .route("/signups/{signup_id}/reject", post(signup::reject_signup))
        .route(
            "/activities/{activity_id}/signups",
            get(signup::activity_signups),
        )
}
