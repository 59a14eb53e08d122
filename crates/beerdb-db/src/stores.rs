//! Database operations for the `stores` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `stores` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub store_id: i32,
    pub name: String,
    pub address: String,
    pub zipcode: String,
    pub area: String,
    pub category: String,
    pub gps_lat: f64,
    pub gps_long: f64,
    pub store_updated: DateTime<Utc>,
    pub store_stock_updated: DateTime<Utc>,
}

/// Store metadata as reported by the retailer's store endpoint.
#[derive(Debug, Clone)]
pub struct StoreUpsert {
    pub store_id: i32,
    pub name: String,
    pub address: String,
    pub zipcode: String,
    pub area: String,
    pub category: String,
    pub gps_lat: f64,
    pub gps_long: f64,
}

/// Wholesale upsert of a store's metadata. `store_stock_updated` is NOT
/// touched here; it belongs to the stock refresh pass.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_store(pool: &PgPool, store: &StoreUpsert) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO stores \
             (store_id, name, address, zipcode, area, category, gps_lat, gps_long) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (store_id) DO UPDATE SET \
             name          = EXCLUDED.name, \
             address       = EXCLUDED.address, \
             zipcode       = EXCLUDED.zipcode, \
             area          = EXCLUDED.area, \
             category      = EXCLUDED.category, \
             gps_lat       = EXCLUDED.gps_lat, \
             gps_long      = EXCLUDED.gps_long, \
             store_updated = NOW()",
    )
    .bind(store.store_id)
    .bind(&store.name)
    .bind(&store.address)
    .bind(&store.zipcode)
    .bind(&store.area)
    .bind(&store.category)
    .bind(store.gps_lat)
    .bind(store.gps_long)
    .execute(pool)
    .await?;

    Ok(())
}

/// Stores with the stalest stock data, oldest first — the stock refresh
/// job's work queue.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn stale_stock_stores(pool: &PgPool, limit: i64) -> Result<Vec<StoreRow>, DbError> {
    let rows = sqlx::query_as::<_, StoreRow>(
        "SELECT store_id, name, address, zipcode, area, category, gps_lat, gps_long, \
                store_updated, store_stock_updated \
         FROM stores \
         ORDER BY store_stock_updated ASC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Stamp a store's `store_stock_updated`. Called after a stock pass even
/// when individual pages failed, so a flaky store still rotates to the back
/// of the queue.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn stamp_store_stock_updated(pool: &PgPool, store_id: i32) -> Result<(), DbError> {
    sqlx::query("UPDATE stores SET store_stock_updated = NOW() WHERE store_id = $1")
        .bind(store_id)
        .execute(pool)
        .await?;

    Ok(())
}
