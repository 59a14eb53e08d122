//! Database operations for the `stock` join table.
//!
//! Stock rows record transition edges, not just current state: the first
//! 0→nonzero observation stamps `stocked_at`, the drop back to zero stamps
//! `unstocked_at`. Absence from a refresh pass counts as depletion.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `stock` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StockRow {
    pub id: i64,
    pub store_id: i32,
    pub product_id: i64,
    pub quantity: i32,
    pub stock_updated: DateTime<Utc>,
    pub stocked_at: Option<DateTime<Utc>>,
    pub unstocked_at: Option<DateTime<Utc>>,
}

/// Upserts a stock observation for (store, product).
///
/// New rows with nonzero quantity stamp `stocked_at`; existing rows stamp it
/// only on the 0→nonzero edge and stamp `unstocked_at` on the edge down to
/// zero. A steady quantity updates nothing but the quantity and timestamp.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_stock(
    pool: &PgPool,
    store_id: i32,
    product_id: i64,
    quantity: i32,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO stock (store_id, product_id, quantity, stocked_at) \
         VALUES ($1, $2, $3, CASE WHEN $3 > 0 THEN NOW() END) \
         ON CONFLICT (store_id, product_id) DO UPDATE SET \
             stocked_at    = CASE WHEN stock.quantity = 0 AND EXCLUDED.quantity > 0 \
                                  THEN NOW() ELSE stock.stocked_at END, \
             unstocked_at  = CASE WHEN stock.quantity > 0 AND EXCLUDED.quantity = 0 \
                                  THEN NOW() ELSE stock.unstocked_at END, \
             quantity      = EXCLUDED.quantity, \
             stock_updated = NOW()",
    )
    .bind(store_id)
    .bind(product_id)
    .bind(quantity)
    .execute(pool)
    .await?;

    Ok(())
}

/// Zeroes every nonzero stock row of `store_id` whose product was NOT seen
/// in this pass, stamping `unstocked_at`. Single set-based statement
/// (last-seen-wins; absence implies depletion).
///
/// Returns the number of rows unstocked.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn unstock_missing(
    pool: &PgPool,
    store_id: i32,
    seen_product_ids: &[i64],
) -> Result<u64, DbError> {
    let affected = sqlx::query(
        "UPDATE stock SET quantity = 0, unstocked_at = NOW(), stock_updated = NOW() \
         WHERE store_id = $1 AND quantity <> 0 AND product_id <> ALL($2)",
    )
    .bind(store_id)
    .bind(seen_product_ids)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(affected)
}

/// Current stock row for (store, product), if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_stock(
    pool: &PgPool,
    store_id: i32,
    product_id: i64,
) -> Result<Option<StockRow>, DbError> {
    let row = sqlx::query_as::<_, StockRow>(
        "SELECT id, store_id, product_id, quantity, stock_updated, stocked_at, unstocked_at \
         FROM stock WHERE store_id = $1 AND product_id = $2",
    )
    .bind(store_id)
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
