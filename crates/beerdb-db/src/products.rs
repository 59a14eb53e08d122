//! Database operations for the `products` catalog table.
//!
//! Source-A (retailer) fields and source-B (community) fields are owned by
//! different engines and never overwrite each other: the catalog upsert
//! touches only retailer columns, the reconciliation/enrichment paths only
//! community columns. The mutually exclusive SET lists below are that
//! contract in SQL form.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// Pipeline-relevant projection of a `products` row.
///
/// The lazily fetched detail columns (color, aroma, sugar, ...) are write-only
/// from the pipeline's perspective and are not part of this projection.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub retail_id: i64,
    pub name: String,
    pub price: Option<f64>,
    pub volume: Option<f64>,
    pub price_per_volume: Option<f64>,
    pub community_id: Option<i64>,
    pub community_name: Option<String>,
    pub community_url: Option<String>,
    pub verified_match: bool,
    pub match_manually: bool,
    pub prioritize_recheck: bool,
    pub brewery: Option<String>,
    pub rating: Option<f64>,
    pub checkins: Option<i32>,
    pub abv: Option<f64>,
    pub alcohol_units: Option<f64>,
    pub active: bool,
    pub retail_updated: Option<DateTime<Utc>>,
    pub details_fetched: Option<DateTime<Utc>>,
    pub community_updated: Option<DateTime<Utc>>,
}

const PRODUCT_COLUMNS: &str = "retail_id, name, price, volume, price_per_volume, \
     community_id, community_name, community_url, verified_match, match_manually, \
     prioritize_recheck, brewery, rating, checkins, abv, alcohol_units, active, \
     retail_updated, details_fetched, community_updated";

/// Source-A owned fields written by the catalog sync engine.
#[derive(Debug, Clone)]
pub struct CatalogUpsert {
    pub retail_id: i64,
    pub name: String,
    pub main_category: Option<String>,
    pub sub_category: Option<String>,
    pub country: Option<String>,
    pub price: Option<f64>,
    pub volume: Option<f64>,
    pub price_per_volume: Option<f64>,
    pub product_selection: String,
    pub retail_url: Option<String>,
    pub post_delivery: Option<bool>,
    pub store_delivery: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// An accepted source-B identity, applied atomically to a product.
#[derive(Debug, Clone)]
pub struct CommunityMatch {
    pub community_id: i64,
    pub community_url: String,
    pub community_name: Option<String>,
    /// Set when the match came from a correction and the enrichment engine
    /// should re-fetch the page ahead of its normal rotation.
    pub prioritize_recheck: bool,
}

// ---------------------------------------------------------------------------
// Catalog sync (source A owns these columns)
// ---------------------------------------------------------------------------

/// Upserts a product keyed on `retail_id`, overwriting only retailer-owned
/// columns. Community columns are untouched; `active` is forced true and
/// `retail_updated` stamped.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_catalog_product(
    pool: &PgPool,
    product: &CatalogUpsert,
) -> Result<UpsertOutcome, DbError> {
    // xmax = 0 only on freshly inserted tuples; lets one round-trip report
    // created-vs-updated for the job summary.
    let inserted: bool = sqlx::query_scalar::<_, bool>(
        "INSERT INTO products \
             (retail_id, name, main_category, sub_category, country, price, volume, \
              price_per_volume, product_selection, retail_url, post_delivery, \
              store_delivery, active, retail_updated) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, TRUE, NOW()) \
         ON CONFLICT (retail_id) DO UPDATE SET \
             name              = EXCLUDED.name, \
             main_category     = EXCLUDED.main_category, \
             sub_category      = COALESCE(EXCLUDED.sub_category, products.sub_category), \
             country           = EXCLUDED.country, \
             price             = COALESCE(EXCLUDED.price, products.price), \
             volume            = EXCLUDED.volume, \
             price_per_volume  = COALESCE(EXCLUDED.price_per_volume, products.price_per_volume), \
             product_selection = EXCLUDED.product_selection, \
             retail_url        = EXCLUDED.retail_url, \
             post_delivery     = EXCLUDED.post_delivery, \
             store_delivery    = EXCLUDED.store_delivery, \
             active            = TRUE, \
             retail_updated    = NOW() \
         RETURNING (xmax = 0)",
    )
    .bind(product.retail_id)
    .bind(&product.name)
    .bind(&product.main_category)
    .bind(&product.sub_category)
    .bind(&product.country)
    .bind(product.price)
    .bind(product.volume)
    .bind(product.price_per_volume)
    .bind(&product.product_selection)
    .bind(&product.retail_url)
    .bind(product.post_delivery)
    .bind(product.store_delivery)
    .fetch_one(pool)
    .await?;

    Ok(if inserted {
        UpsertOutcome::Created
    } else {
        UpsertOutcome::Updated
    })
}

/// Bulk deactivation sweep: products not seen from the retailer for more
/// than `days` are set inactive and their stock rows zeroed with an
/// `unstocked_at` stamp. Two set-based statements in one transaction — no
/// per-row branching.
///
/// Returns `(deactivated, unstocked)` row counts.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails.
pub async fn deactivate_stale(pool: &PgPool, days: i64) -> Result<(u64, u64), DbError> {
    let mut tx = pool.begin().await?;

    let deactivated = sqlx::query(
        "UPDATE products SET active = FALSE \
         WHERE active AND retail_updated IS NOT NULL \
           AND retail_updated <= NOW() - ($1 * INTERVAL '1 day')",
    )
    .bind(days)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let unstocked = sqlx::query(
        "UPDATE stock SET quantity = 0, unstocked_at = NOW(), stock_updated = NOW() \
         WHERE quantity <> 0 \
           AND product_id IN (SELECT retail_id FROM products WHERE NOT active)",
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;
    Ok((deactivated, unstocked))
}

// ---------------------------------------------------------------------------
// Reconciliation (source B owns these columns)
// ---------------------------------------------------------------------------

/// Products eligible for automatic matching: active, no community identity,
/// not flagged for manual handling.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_unmatched(pool: &PgPool, limit: i64) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE community_id IS NULL AND NOT match_manually AND active \
         ORDER BY retail_id \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Applies an accepted community identity: sets id/url/name, marks the match
/// verified, and clears the manual flag.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has `retail_id`, or
/// [`DbError::Sqlx`] on query failure.
pub async fn apply_community_match(
    pool: &PgPool,
    retail_id: i64,
    m: &CommunityMatch,
) -> Result<(), DbError> {
    let affected = sqlx::query(
        "UPDATE products SET \
             community_id       = $2, \
             community_url      = $3, \
             community_name     = COALESCE($4, community_name), \
             verified_match     = TRUE, \
             match_manually     = FALSE, \
             prioritize_recheck = $5 \
         WHERE retail_id = $1",
    )
    .bind(retail_id)
    .bind(m.community_id)
    .bind(&m.community_url)
    .bind(&m.community_name)
    .bind(m.prioritize_recheck)
    .execute(pool)
    .await?
    .rows_affected();

    if affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Routes a product out of automatic matching after all query variants
/// failed. The best unsuccessful candidate (if any) is recorded in the
/// description for operator review.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn flag_manual_match(
    pool: &PgPool,
    retail_id: i64,
    best_candidate: Option<&str>,
) -> Result<(), DbError> {
    let note = match best_candidate {
        Some(name) => format!("No confident match. Closest candidate: {name}"),
        None => "Missing on community service.".to_string(),
    };

    sqlx::query("UPDATE products SET match_manually = TRUE, description = $2 WHERE retail_id = $1")
        .bind(retail_id)
        .bind(note)
        .execute(pool)
        .await?;

    Ok(())
}

/// Hard reset of the community identity: every source-B derived column is
/// nulled and all match flags cleared, in one statement.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has `retail_id`, or
/// [`DbError::Sqlx`] on query failure.
pub async fn reset_manual_match(pool: &PgPool, retail_id: i64) -> Result<(), DbError> {
    let affected = sqlx::query(
        "UPDATE products SET \
             community_id       = NULL, \
             community_name     = NULL, \
             community_url      = NULL, \
             verified_match     = FALSE, \
             match_manually     = TRUE, \
             prioritize_recheck = FALSE, \
             brewery            = NULL, \
             rating             = NULL, \
             checkins           = NULL, \
             style              = NULL, \
             description        = NULL, \
             abv                = NULL, \
             ibu                = NULL, \
             label_hd_url       = NULL, \
             label_sm_url       = NULL, \
             alcohol_units      = NULL, \
             community_updated  = NULL \
         WHERE retail_id = $1",
    )
    .bind(retail_id)
    .execute(pool)
    .await?
    .rows_affected();

    if affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Bulk re-entry into automatic matching: clears `match_manually` on every
/// flagged product. Returns the number of rows cleared.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn clear_manual_flags(pool: &PgPool) -> Result<u64, DbError> {
    let affected = sqlx::query("UPDATE products SET match_manually = FALSE WHERE match_manually")
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected)
}

/// Fetch a single product by retailer id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &PgPool, retail_id: i64) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE retail_id = $1"
    ))
    .bind(retail_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

// ---------------------------------------------------------------------------
// Detail enrichment (source A, lazy)
// ---------------------------------------------------------------------------

/// Partial detail attributes from the retailer's per-product endpoint.
/// `None` fields leave the stored column unchanged.
#[derive(Debug, Clone, Default)]
pub struct DetailUpdate {
    pub year: Option<i32>,
    pub fullness: Option<i32>,
    pub sweetness: Option<i32>,
    pub freshness: Option<i32>,
    pub bitterness: Option<i32>,
    pub sugar: Option<f64>,
    pub acid: Option<f64>,
    pub color: Option<String>,
    pub aroma: Option<String>,
    pub taste: Option<String>,
    pub storable: Option<String>,
    pub food_pairing: Option<String>,
    pub raw_materials: Option<String>,
    pub allergens: Option<String>,
    pub method: Option<String>,
}

/// Products still awaiting their first detail fetch, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_needing_details(pool: &PgPool, limit: i64) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE active AND details_fetched IS NULL \
         ORDER BY retail_id \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Applies a partial detail update and stamps `details_fetched`. Absent
/// fields keep their stored values (COALESCE per column).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn apply_details(
    pool: &PgPool,
    retail_id: i64,
    details: &DetailUpdate,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE products SET \
             year            = COALESCE($2, year), \
             fullness        = COALESCE($3, fullness), \
             sweetness       = COALESCE($4, sweetness), \
             freshness       = COALESCE($5, freshness), \
             bitterness      = COALESCE($6, bitterness), \
             sugar           = COALESCE($7, sugar), \
             acid            = COALESCE($8, acid), \
             color           = COALESCE($9, color), \
             aroma           = COALESCE($10, aroma), \
             taste           = COALESCE($11, taste), \
             storable        = COALESCE($12, storable), \
             food_pairing    = COALESCE($13, food_pairing), \
             raw_materials   = COALESCE($14, raw_materials), \
             allergens       = COALESCE($15, allergens), \
             method          = COALESCE($16, method), \
             details_fetched = NOW() \
         WHERE retail_id = $1",
    )
    .bind(retail_id)
    .bind(details.year)
    .bind(details.fullness)
    .bind(details.sweetness)
    .bind(details.freshness)
    .bind(details.bitterness)
    .bind(details.sugar)
    .bind(details.acid)
    .bind(&details.color)
    .bind(&details.aroma)
    .bind(&details.taste)
    .bind(&details.storable)
    .bind(&details.food_pairing)
    .bind(&details.raw_materials)
    .bind(&details.allergens)
    .bind(&details.method)
    .execute(pool)
    .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Community page refresh (source B, periodic)
// ---------------------------------------------------------------------------

/// Attributes scraped from the community beer page. `None` fields keep
/// their stored values; `alcohol_units` is recomputed by the caller when
/// volume and abv allow.
#[derive(Debug, Clone, Default)]
pub struct CommunityPageUpdate {
    pub community_id: Option<i64>,
    pub community_name: Option<String>,
    pub community_url: Option<String>,
    pub brewery: Option<String>,
    pub rating: Option<f64>,
    pub checkins: Option<i32>,
    pub style: Option<String>,
    pub description: Option<String>,
    pub abv: Option<f64>,
    pub ibu: Option<i32>,
    pub label_hd_url: Option<String>,
    pub label_sm_url: Option<String>,
    pub alcohol_units: Option<f64>,
}

/// Matched products queued for a community page refresh: recheck-flagged
/// first, then rating-less, then stalest.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn community_refresh_queue(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE active AND community_id IS NOT NULL \
         ORDER BY prioritize_recheck DESC, \
                  (rating IS NULL) DESC, \
                  community_updated ASC NULLS FIRST \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Applies a community page refresh and stamps `community_updated`;
/// `prioritize_recheck` is always cleared on a successful fetch.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn apply_community_page(
    pool: &PgPool,
    retail_id: i64,
    update: &CommunityPageUpdate,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE products SET \
             community_id       = COALESCE($2, community_id), \
             community_name     = COALESCE($3, community_name), \
             community_url      = COALESCE($4, community_url), \
             brewery            = COALESCE($5, brewery), \
             rating             = COALESCE($6, rating), \
             checkins           = COALESCE($7, checkins), \
             style              = COALESCE($8, style), \
             description        = COALESCE($9, description), \
             abv                = COALESCE($10, abv), \
             ibu                = COALESCE($11, ibu), \
             label_hd_url       = COALESCE($12, label_hd_url), \
             label_sm_url       = COALESCE($13, label_sm_url), \
             alcohol_units      = COALESCE($14, alcohol_units), \
             prioritize_recheck = FALSE, \
             community_updated  = NOW() \
         WHERE retail_id = $1",
    )
    .bind(retail_id)
    .bind(update.community_id)
    .bind(&update.community_name)
    .bind(&update.community_url)
    .bind(&update.brewery)
    .bind(update.rating)
    .bind(update.checkins)
    .bind(&update.style)
    .bind(&update.description)
    .bind(update.abv)
    .bind(update.ibu)
    .bind(&update.label_hd_url)
    .bind(&update.label_sm_url)
    .bind(update.alcohol_units)
    .execute(pool)
    .await?;

    Ok(())
}
