//! Per-store stock refresh with absence-implies-depletion semantics.

use std::collections::HashSet;

use sqlx::PgPool;
use tracing::{info, warn};

use beerdb_core::CategoryQuery;
use beerdb_db::{stale_stock_stores, stamp_store_stock_updated, unstock_missing, upsert_stock};

use crate::client::RetailClient;
use crate::error::RetailError;
use crate::normalize::extract_quantity;
use crate::types::RetailProduct;

/// Outcome counts for a stock refresh run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockSummary {
    pub stores_refreshed: u64,
    pub stocked_rows: u64,
    pub unstocked_rows: u64,
}

/// Refreshes the shelf inventory of the `store_limit` stalest stores.
///
/// For each store every category is searched with the store restriction
/// applied; products absent from all result pages are zeroed out via
/// [`unstock_missing`] — the retailer reports presence, never departure.
/// The staleness stamp is advanced even on a partially failed store so a
/// persistently broken store cannot pin the head of the rotation.
///
/// # Errors
///
/// Returns [`RetailError::Db`] if the stale-store listing fails.
pub async fn refresh_stock(
    pool: &PgPool,
    client: &RetailClient,
    categories: &[CategoryQuery],
    store_limit: i64,
) -> Result<StockSummary, RetailError> {
    let stores = stale_stock_stores(pool, store_limit).await?;
    let mut summary = StockSummary::default();

    for store in stores {
        let mut seen: HashSet<i64> = HashSet::new();

        for category in categories {
            if let Err(err) =
                scan_category(pool, client, category, store.store_id, &mut seen, &mut summary)
                    .await
            {
                warn!(
                    store_id = store.store_id,
                    category = %category.token,
                    error = %err,
                    "skipping category for store"
                );
            }
        }

        let seen_ids: Vec<i64> = seen.into_iter().collect();
        match unstock_missing(pool, store.store_id, &seen_ids).await {
            Ok(cleared) => summary.unstocked_rows += cleared,
            Err(err) => warn!(store_id = store.store_id, error = %err, "unstock sweep failed"),
        }

        if let Err(err) = stamp_store_stock_updated(pool, store.store_id).await {
            warn!(store_id = store.store_id, error = %err, "staleness stamp failed");
        }
        summary.stores_refreshed += 1;
    }

    info!(
        stores = summary.stores_refreshed,
        stocked = summary.stocked_rows,
        unstocked = summary.unstocked_rows,
        "stock refresh complete"
    );
    Ok(summary)
}

async fn scan_category(
    pool: &PgPool,
    client: &RetailClient,
    category: &CategoryQuery,
    store_id: i32,
    seen: &mut HashSet<i64>,
    summary: &mut StockSummary,
) -> Result<(), RetailError> {
    let first = client.search_page(category, 0, Some(store_id)).await?;
    let total_pages = first.pagination.total_pages;

    ingest_stock_page(pool, store_id, &first.products, seen, summary).await;

    for page in 1..total_pages {
        match client.search_page(category, page, Some(store_id)).await {
            Ok(result) => {
                ingest_stock_page(pool, store_id, &result.products, seen, summary).await;
            }
            Err(err) => {
                warn!(store_id, category = %category.token, page, error = %err, "skipping page");
            }
        }
    }

    Ok(())
}

async fn ingest_stock_page(
    pool: &PgPool,
    store_id: i32,
    products: &[RetailProduct],
    seen: &mut HashSet<i64>,
    summary: &mut StockSummary,
) {
    for product in products {
        let Ok(retail_id) = product.code.trim().parse::<i64>() else {
            warn!(code = %product.code, "skipping stock row with non-numeric code");
            continue;
        };

        let quantity = stock_quantity(product);
        seen.insert(retail_id);

        match upsert_stock(pool, store_id, retail_id, quantity).await {
            Ok(()) => summary.stocked_rows += 1,
            Err(err) => warn!(store_id, retail_id, error = %err, "stock upsert failed"),
        }
    }
}

/// The per-store quantity lives in the availability blurb's free text;
/// `readableValue` is the fallback for the older payload shape.
fn stock_quantity(product: &RetailProduct) -> i32 {
    let infos = product
        .availability
        .as_ref()
        .and_then(|a| a.stores.as_ref())
        .and_then(|s| s.infos.as_ref());

    infos
        .and_then(|i| i.availability.as_deref())
        .or_else(|| infos.and_then(|i| i.readable_value.as_deref()))
        .map_or(0, extract_quantity)
}
