//! Health check route, served at the root level (not under `/api/v1`).

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
}

/// GET /health
///
/// Liveness plus a database reachability probe. Always returns 200; a
/// broken database surfaces as `db_healthy: false` so load balancers can
/// distinguish "up but degraded" from "down".
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = muster_db::health_check(&state.pool).await.is_ok();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
