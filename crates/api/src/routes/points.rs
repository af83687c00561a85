//! Route definitions for the points ledger.
//!
//! ```text
//! GET    /points/mine          my_points
//! GET    /points/mine/ledger   my_ledger
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::points;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/points/mine", get(points::my_points))
        .route("/points/mine/ledger", get(points::my_ledger))
}
