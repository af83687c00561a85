//! Route definitions for the review workflow.
//!
//! ```text
//! PATCH  /review/{signup_id}   review_signup
//! GET    /review/search        search_reviews
//! ```

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::review;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/review/search", get(review::search_reviews))
        .route("/review/{signup_id}", patch(review::review_signup))
}
