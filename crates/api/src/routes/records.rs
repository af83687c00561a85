//! Route definitions for service records.
//!
//! ```text
//! GET    /records/mine          my_records
//! GET    /records/{record_id}   get_record
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::records;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/records/mine", get(records::my_records))
        .route("/records/{record_id}", get(records::get_record))
}
