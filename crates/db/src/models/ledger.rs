use muster_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Source tag for entries granted by review settlement.
pub const SOURCE_SERVICE_AWARD: &str = "service_award";

/// A row from the `points_ledger` table.
///
/// Entries are append-only signed deltas; a user's total points is the sum
/// of their entries.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LedgerEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub points: i64,
    pub source: String,
    pub created_at: Timestamp,
}
