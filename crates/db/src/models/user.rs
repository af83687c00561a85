use muster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
///
/// For students, `username` is the student number.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub name: String,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a user (seeding and tests; account management is
/// handled by the identity service).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub name: String,
    pub role: String,
}
