//! Full-catalog sync: every configured category, every search page.

use sqlx::PgPool;
use tracing::{info, warn};

use beerdb_core::CategoryQuery;
use beerdb_db::{lookup_or_create_country, upsert_catalog_product, UpsertOutcome};

use crate::client::RetailClient;
use crate::normalize::to_catalog_upsert;

/// Outcome counts for a catalog sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
}

/// Walks every category's search pages and upserts each product row.
///
/// A failed page or product is logged and skipped; the run keeps going so
/// one malformed record never aborts a whole category. A category whose
/// first page cannot be fetched is skipped whole, since without it the
/// page count is unknown, and the sweep moves on to the next category.
/// Products touched here get `active = TRUE` and a fresh `retail_updated`
/// stamp, which is what the deactivation sweep later keys on.
pub async fn sync_catalog(
    pool: &PgPool,
    client: &RetailClient,
    categories: &[CategoryQuery],
) -> CatalogSummary {
    let origin = client.web_origin();
    let mut summary = CatalogSummary::default();

    for category in categories {
        let first = match client.search_page(category, 0, None).await {
            Ok(page) => page,
            Err(err) => {
                warn!(category = %category.token, error = %err, "skipping category");
                summary.skipped += 1;
                continue;
            }
        };
        let total_pages = first.pagination.total_pages;
        info!(category = %category.token, total_pages, "syncing category");

        ingest_page(pool, &origin, first.products, &mut summary).await;

        for page in 1..total_pages {
            match client.search_page(category, page, None).await {
                Ok(result) => ingest_page(pool, &origin, result.products, &mut summary).await,
                Err(err) => {
                    warn!(category = %category.token, page, error = %err, "skipping page");
                    summary.skipped += 1;
                }
            }
        }
    }

    info!(
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        "catalog sync complete"
    );
    summary
}

async fn ingest_page(
    pool: &PgPool,
    origin: &str,
    products: Vec<crate::types::RetailProduct>,
    summary: &mut CatalogSummary,
) {
    for product in products {
        let upsert = match to_catalog_upsert(&product, origin) {
            Ok(upsert) => upsert,
            Err(err) => {
                warn!(code = %product.code, error = %err, "skipping product");
                summary.skipped += 1;
                continue;
            }
        };

        if let Some(country) = upsert.country.as_deref() {
            if let Err(err) = lookup_or_create_country(pool, country).await {
                warn!(retail_id = upsert.retail_id, error = %err, "country upsert failed");
            }
        }

        match upsert_catalog_product(pool, &upsert).await {
            Ok(UpsertOutcome::Created) => summary.created += 1,
            Ok(UpsertOutcome::Updated) => summary.updated += 1,
            Err(err) => {
                warn!(retail_id = upsert.retail_id, error = %err, "skipping product");
                summary.skipped += 1;
            }
        }
    }
}
