//! Pending-release resolution: ids registered before the retailer lists
//! them, polled until the product document appears.

use sqlx::PgPool;
use tracing::{info, warn};

use beerdb_db::{lookup_or_create_country, remove_pending_release, upsert_catalog_product};

use crate::client::RetailClient;
use crate::error::RetailError;
use crate::normalize::to_catalog_upsert;

/// Polls every pending-release id against the per-product endpoint.
/// An id the retailer now serves is upserted into the catalog and its
/// marker removed; a still-missing id stays registered for the next run.
///
/// # Errors
///
/// Returns [`RetailError::Db`] if the pending listing fails.
pub async fn resolve_pending(pool: &PgPool, client: &RetailClient) -> Result<u64, RetailError> {
    let pending = beerdb_db::list_pending_releases(pool).await?;
    let origin = client.web_origin();
    let mut resolved = 0u64;

    for retail_id in pending {
        let product = match client.product_by_id(retail_id).await {
            Ok(product) => product,
            Err(RetailError::NotFound { .. }) => continue,
            Err(err) => {
                warn!(retail_id, error = %err, "skipping pending release");
                continue;
            }
        };

        let upsert = match to_catalog_upsert(&product, &origin) {
            Ok(upsert) => upsert,
            Err(err) => {
                warn!(retail_id, error = %err, "pending release record malformed");
                continue;
            }
        };

        if let Some(country) = upsert.country.as_deref() {
            lookup_or_create_country(pool, country).await?;
        }
        upsert_catalog_product(pool, &upsert).await?;
        remove_pending_release(pool, retail_id).await?;
        info!(retail_id, name = %upsert.name, "pending release resolved");
        resolved += 1;
    }

    Ok(resolved)
}
