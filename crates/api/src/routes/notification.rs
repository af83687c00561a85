//! Route definitions for in-app notifications.
//!
//! ```text
//! GET    /notifications/mine                    my_notifications
//! POST   /notifications/{notification_id}/read  mark_read
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notifications/mine", get(notification::my_notifications))
        .route(
            "/notifications/{notification_id}/read",
            post(notification::mark_read),
        )
}
