use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/beerdb-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &beerdb_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Connect to a Postgres pool using an explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run all pending migrations against the pool.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

pub mod checkins;
pub mod countries;
pub mod feeds;
pub mod lists;
pub mod pending_releases;
pub mod products;
pub mod stock;
pub mod stores;
pub mod tastings;
pub mod users;
pub mod wrong_matches;

pub use checkins::{
    existing_checkin_ids, insert_feed_checkin, store_import_batch, sync_unmatched_checkins,
    ImportStats, NewCheckin, RawCheckinRow, SyncOutcome,
};
pub use countries::lookup_or_create_country;
pub use feeds::{add_feed, list_active_feeds, stamp_feed_synced, FeedRow};
pub use lists::{
    add_list_item, create_list, list_user_lists, remove_list_item, reorder_items, reorder_lists,
    ListItemRow, UserListRow,
};
pub use pending_releases::{add_pending_release, list_pending_releases, remove_pending_release};
pub use products::{
    apply_community_match, apply_community_page, apply_details, clear_manual_flags,
    community_refresh_queue, deactivate_stale, flag_manual_match, get_product,
    list_needing_details, list_unmatched, reset_manual_match, upsert_catalog_product,
    CatalogUpsert, CommunityMatch, CommunityPageUpdate, DetailUpdate, ProductRow, UpsertOutcome,
};
pub use stock::{get_stock, unstock_missing, upsert_stock, StockRow};
pub use stores::{
    stale_stock_stores, stamp_store_stock_updated, upsert_store, StoreRow, StoreUpsert,
};
pub use tastings::{list_tastings, mark_tasted, unmark_tasted, TastingRow};
pub use users::{ensure_user, get_user_id};
pub use wrong_matches::{
    delete_wrong_match, get_wrong_match, insert_wrong_match, list_wrong_matches, WrongMatchRow,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_config_has_sane_defaults() {
        let config = PoolConfig::default();

        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.min_connections, DEFAULT_MIN_CONNECTIONS);
        assert_eq!(config.acquire_timeout_secs, DEFAULT_ACQUIRE_TIMEOUT_SECS);
    }
}
