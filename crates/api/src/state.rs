use std::sync::Arc;

use muster_core::token::TokenIssuer;
use muster_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: muster_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Check-token issuer backed by the shared token store.
    pub token_issuer: TokenIssuer,
    /// Centralized event bus for post-commit domain events.
    pub event_bus: Arc<EventBus>,
}
