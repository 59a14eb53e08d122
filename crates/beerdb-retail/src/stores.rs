//! Store directory sync from the retailer's store endpoints.

use sqlx::PgPool;
use tracing::{info, warn};

use beerdb_db::{upsert_store, StoreUpsert};

use crate::client::RetailClient;
use crate::error::RetailError;

/// Refreshes the store directory: every code from the store facet gets
/// its detail record fetched and upserted. Returns the number of stores
/// written; a store that fails to fetch or parse is logged and skipped.
///
/// # Errors
///
/// Returns [`RetailError`] if the store-code listing itself fails.
pub async fn sync_stores(pool: &PgPool, client: &RetailClient) -> Result<u64, RetailError> {
    let codes = client.list_store_codes().await?;
    info!(stores = codes.len(), "syncing store directory");

    let mut synced = 0u64;
    for code in codes {
        let Ok(store_id) = code.trim().parse::<i32>() else {
            warn!(%code, "skipping store with non-numeric code");
            continue;
        };

        let details = match client.store_details(&code).await {
            Ok(details) => details,
            Err(err) => {
                warn!(%code, error = %err, "skipping store");
                continue;
            }
        };

        let store = StoreUpsert {
            store_id,
            name: details.display_name,
            address: details.address.line1.unwrap_or_default(),
            zipcode: details.address.postal_code.unwrap_or_default(),
            area: details.address.town.unwrap_or_default(),
            category: details.assortment.unwrap_or_default(),
            gps_lat: details.geo_point.latitude,
            gps_long: details.geo_point.longitude,
        };

        match upsert_store(pool, &store).await {
            Ok(()) => synced += 1,
            Err(err) => warn!(%code, error = %err, "store upsert failed"),
        }
    }

    info!(synced, "store sync complete");
    Ok(synced)
}
