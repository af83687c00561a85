//! Shared fixtures for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use muster_api::auth::jwt::{generate_token, JwtConfig};
use muster_api::config::ServerConfig;
use muster_api::router::build_app_router;
use muster_api::state::AppState;
use muster_core::status::ActivityStatus;
use muster_core::token::{InMemoryTokenStore, TokenIssuer, TokenStore};
use muster_core::types::DbId;
use muster_db::models::activity::{Activity, CreateActivity};
use muster_db::models::user::{CreateUser, User};
use muster_db::repositories::{ActivityRepo, UserRepo};
use muster_events::EventBus;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        check_token_ttl_mins: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let token_store = Arc::new(InMemoryTokenStore::new());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        token_issuer: TokenIssuer::new(token_store as Arc<dyn TokenStore>),
        event_bus: Arc::new(EventBus::default()),
    };

    build_app_router(state, &config)
}

/// Mint a Bearer token for the given user under the test JWT config.
pub fn bearer_for(user_id: DbId, role: &str) -> String {
    generate_token(user_id, role, &test_config().jwt).expect("test token generation failed")
}

/// Send a request with optional Bearer auth and JSON body.
pub async fn request(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.oneshot(request).await.unwrap()
}

/// Send an unauthenticated GET request.
pub async fn get(app: Router, uri: &str) -> Response {
    request(app, Method::GET, uri, None, None).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Insert a user row.
pub async fn seed_user(pool: &PgPool, username: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            name: format!("Test {username}"),
            role: role.to_string(),
        },
    )
    .await
    .expect("seed user failed")
}

/// Insert a published activity starting two hours from now.
pub async fn seed_activity(pool: &PgPool, organizer_id: DbId, points: i32) -> Activity {
    let now = Utc::now();
    ActivityRepo::create(
        pool,
        &CreateActivity {
            organizer_id,
            title: "Campus library shift".to_string(),
            location: Some("North reading room".to_string()),
            start_time: now + Duration::hours(2),
            end_time: now + Duration::hours(5),
            registration_deadline: Some(now + Duration::hours(1)),
            points,
            status: ActivityStatus::Published,
        },
    )
    .await
    .expect("seed activity failed")
}
