//! Repository for the append-only `points_ledger` table.
//!
//! There is no balance column: concurrent awards for one user are
//! independent inserts, and the total is always a sum over entries.

use muster_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::ledger::LedgerEntry;

/// Column list for ledger queries.
const LEDGER_COLUMNS: &str = "id, user_id, points, source, created_at";

pub struct LedgerRepo;

impl LedgerRepo {
    /// Append an entry, inside an open transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        user_id: DbId,
        points: i64,
        source: &str,
    ) -> Result<LedgerEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO points_ledger (user_id, points, source)
             VALUES ($1, $2, $3)
             RETURNING {LEDGER_COLUMNS}"
        );
        sqlx::query_as::<_, LedgerEntry>(&query)
            .bind(user_id)
            .bind(points)
            .bind(source)
            .fetch_one(conn)
            .await
    }

    /// A user's total points: the sum of all their entries.
    pub async fn total_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(points), 0)::BIGINT FROM points_ledger WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// A user's entries, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {LEDGER_COLUMNS} FROM points_ledger
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, LedgerEntry>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count for [`list_for_user`](Self::list_for_user).
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM points_ledger WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}
