//! Confirmed user × product tasting facts.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `tastings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TastingRow {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Get-or-create a tasting for (user, product). Returns `true` when a new
/// row was created, `false` when it already existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn mark_tasted(
    pool: &PgPool,
    user_id: i64,
    product_id: i64,
    rating: Option<f64>,
) -> Result<bool, DbError> {
    let affected = sqlx::query(
        "INSERT INTO tastings (user_id, product_id, rating) VALUES ($1, $2, $3) \
         ON CONFLICT (user_id, product_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(rating)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(affected > 0)
}

/// Remove a tasting. Returns `true` when a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn unmark_tasted(pool: &PgPool, user_id: i64, product_id: i64) -> Result<bool, DbError> {
    let affected = sqlx::query("DELETE FROM tastings WHERE user_id = $1 AND product_id = $2")
        .bind(user_id)
        .bind(product_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

/// All tastings for one user.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_tastings(pool: &PgPool, user_id: i64) -> Result<Vec<TastingRow>, DbError> {
    let rows = sqlx::query_as::<_, TastingRow>(
        "SELECT id, user_id, product_id, rating, created_at \
         FROM tastings WHERE user_id = $1 ORDER BY created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
