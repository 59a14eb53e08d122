//! Retailer-facing command handlers.

use sqlx::PgPool;

use beerdb_core::AppConfig;
use beerdb_retail::RetailClient;

fn retail_client(config: &AppConfig) -> anyhow::Result<RetailClient> {
    RetailClient::new(
        &config.retail_api_base,
        &config.retail_api_v3_base,
        config.http_request_timeout_secs,
        &config.http_user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build retail client: {e}"))
}

pub(crate) async fn sync_catalog(pool: &PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let client = retail_client(config)?;
    let categories = beerdb_core::load_categories(&config.categories_path)?;

    let summary = beerdb_retail::sync_catalog(pool, &client, &categories).await;
    println!(
        "catalog sync: {} created, {} updated, {} skipped",
        summary.created, summary.updated, summary.skipped
    );
    Ok(())
}

pub(crate) async fn sync_stores(pool: &PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let client = retail_client(config)?;

    let synced = beerdb_retail::sync_stores(pool, &client).await?;
    println!("store sync: {synced} stores");
    Ok(())
}

pub(crate) async fn sync_stock(
    pool: &PgPool,
    config: &AppConfig,
    stores: i64,
) -> anyhow::Result<()> {
    let client = retail_client(config)?;
    let categories = beerdb_core::load_categories(&config.categories_path)?;

    let summary = beerdb_retail::refresh_stock(pool, &client, &categories, stores).await?;
    println!(
        "stock refresh: {} stores, {} rows stocked, {} rows cleared",
        summary.stores_refreshed, summary.stocked_rows, summary.unstocked_rows
    );
    Ok(())
}

pub(crate) async fn sync_details(
    pool: &PgPool,
    config: &AppConfig,
    calls: i64,
) -> anyhow::Result<()> {
    let client = retail_client(config)?;

    let enriched = beerdb_retail::enrich_details(pool, &client, calls).await?;
    println!("detail enrichment: {enriched} products");
    Ok(())
}

pub(crate) async fn resolve_pending(pool: &PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let client = retail_client(config)?;

    let resolved = beerdb_retail::resolve_pending(pool, &client).await?;
    println!("pending releases: {resolved} resolved");
    Ok(())
}
