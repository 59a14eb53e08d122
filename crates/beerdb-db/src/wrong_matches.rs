//! Operator-raised wrong-match corrections.
//!
//! Rows here are pending review only. Auto-accepted corrections are applied
//! to the product and never persisted; accepting a pending row deletes it.
//! A resolved correction does not exist.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A pending `wrong_matches` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WrongMatchRow {
    pub id: i64,
    pub product_id: i64,
    pub suggested_url: String,
    pub created_at: DateTime<Utc>,
}

/// Insert a correction pending manual review. Conflicts on
/// `(product_id, suggested_url)` are no-ops: the same suggestion filed
/// twice is one pending review.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_wrong_match(
    pool: &PgPool,
    product_id: i64,
    suggested_url: &str,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO wrong_matches (product_id, suggested_url) VALUES ($1, $2) \
         ON CONFLICT (product_id, suggested_url) DO NOTHING",
    )
    .bind(product_id)
    .bind(suggested_url)
    .execute(pool)
    .await?;

    Ok(())
}

/// All corrections awaiting review, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_wrong_matches(pool: &PgPool) -> Result<Vec<WrongMatchRow>, DbError> {
    let rows = sqlx::query_as::<_, WrongMatchRow>(
        "SELECT id, product_id, suggested_url, created_at \
         FROM wrong_matches ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch one pending correction by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_wrong_match(pool: &PgPool, id: i64) -> Result<Option<WrongMatchRow>, DbError> {
    let row = sqlx::query_as::<_, WrongMatchRow>(
        "SELECT id, product_id, suggested_url, created_at FROM wrong_matches WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Remove a correction (applied or discarded).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_wrong_match(pool: &PgPool, id: i64) -> Result<(), DbError> {
    sqlx::query("DELETE FROM wrong_matches WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
