//! Raw check-in persistence, dedup, and the merge into tasting records.
//!
//! Dedup granularity is the external checkin id where one exists (feed and
//! scrape imports); file uploads without checkin ids fall back to one row
//! per (user, beer) with best-rating / earliest-timestamp merge. Both
//! contracts are enforced by partial unique indexes, so replays are safe at
//! the storage layer, not just in application logic.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::DbError;

/// A row from the `raw_checkins` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RawCheckinRow {
    pub id: i64,
    pub external_checkin_id: Option<i64>,
    pub user_id: i64,
    pub community_beer_id: i64,
    pub rating: Option<f64>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub synced: bool,
}

/// A normalized check-in event ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCheckin {
    pub external_checkin_id: Option<i64>,
    pub community_beer_id: i64,
    pub rating: Option<f64>,
    pub checked_in_at: Option<DateTime<Utc>>,
}

/// Result of an import batch: `imported_count` is new tastings derived,
/// `total_check_ins` the size of the parsed input (set by the caller).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub imported_count: u64,
    pub total_check_ins: u64,
}

/// Result of the unmatched-checkin resync sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub synced_count: u64,
    pub users_affected: u64,
}

/// Which of `candidate_ids` already exist as stored checkin ids.
///
/// Used by the feed sync to skip entries before fetching their pages.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn existing_checkin_ids(
    pool: &PgPool,
    candidate_ids: &[i64],
) -> Result<HashSet<i64>, DbError> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT external_checkin_id FROM raw_checkins \
         WHERE external_checkin_id = ANY($1)",
    )
    .bind(candidate_ids)
    .fetch_all(pool)
    .await?;

    Ok(ids.into_iter().collect())
}

/// Insert a feed-sourced checkin (always carries an external id). Returns
/// `true` when a new row was created; a replayed id is a no-op.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_feed_checkin(
    pool: &PgPool,
    user_id: i64,
    checkin: &NewCheckin,
) -> Result<bool, DbError> {
    let affected = sqlx::query(
        "INSERT INTO raw_checkins \
             (external_checkin_id, user_id, community_beer_id, rating, checked_in_at) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (external_checkin_id) WHERE external_checkin_id IS NOT NULL \
         DO NOTHING",
    )
    .bind(checkin.external_checkin_id)
    .bind(user_id)
    .bind(checkin.community_beer_id)
    .bind(checkin.rating)
    .bind(checkin.checked_in_at)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(affected > 0)
}

/// Persist a parsed import batch and derive tastings, atomically.
///
/// One transaction covers: upserting every raw checkin (merge rules below),
/// deriving tastings for this user's unsynced checkins that match a product,
/// and flipping `synced`. A mid-batch failure rolls the whole import back.
///
/// Merge rules on conflict: best rating wins, earliest timestamp wins.
/// Returns the number of newly derived tastings; the caller fills in
/// `total_check_ins`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails (transaction rolls back).
pub async fn store_import_batch(
    pool: &PgPool,
    user_id: i64,
    checkins: &[NewCheckin],
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;

    for checkin in checkins {
        upsert_raw_checkin(&mut tx, user_id, checkin).await?;
    }

    let imported = derive_tastings_for_user(&mut tx, user_id).await?;

    tx.commit().await?;
    Ok(imported)
}

async fn upsert_raw_checkin(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    checkin: &NewCheckin,
) -> Result<(), DbError> {
    if checkin.external_checkin_id.is_some() {
        sqlx::query(
            "INSERT INTO raw_checkins \
                 (external_checkin_id, user_id, community_beer_id, rating, checked_in_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (external_checkin_id) WHERE external_checkin_id IS NOT NULL \
             DO NOTHING",
        )
        .bind(checkin.external_checkin_id)
        .bind(user_id)
        .bind(checkin.community_beer_id)
        .bind(checkin.rating)
        .bind(checkin.checked_in_at)
        .execute(&mut **tx)
        .await?;
    } else {
        sqlx::query(
            "INSERT INTO raw_checkins \
                 (external_checkin_id, user_id, community_beer_id, rating, checked_in_at) \
             VALUES (NULL, $1, $2, $3, $4) \
             ON CONFLICT (user_id, community_beer_id) WHERE external_checkin_id IS NULL \
             DO UPDATE SET \
                 rating        = GREATEST(raw_checkins.rating, EXCLUDED.rating), \
                 checked_in_at = LEAST(raw_checkins.checked_in_at, EXCLUDED.checked_in_at)",
        )
        .bind(user_id)
        .bind(checkin.community_beer_id)
        .bind(checkin.rating)
        .bind(checkin.checked_in_at)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Derive tastings for one user's unsynced checkins that match a product,
/// carrying the best rating per (user, product), then mark them synced.
async fn derive_tastings_for_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
) -> Result<u64, DbError> {
    let created = sqlx::query(
        "INSERT INTO tastings (user_id, product_id, rating) \
         SELECT rc.user_id, p.retail_id, MAX(rc.rating) \
         FROM raw_checkins rc \
         JOIN products p ON p.community_id = rc.community_beer_id \
         WHERE rc.user_id = $1 AND NOT rc.synced \
         GROUP BY rc.user_id, p.retail_id \
         ON CONFLICT (user_id, product_id) DO NOTHING",
    )
    .bind(user_id)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    sqlx::query(
        "UPDATE raw_checkins rc SET synced = TRUE \
         FROM products p \
         WHERE rc.user_id = $1 AND NOT rc.synced \
           AND p.community_id = rc.community_beer_id",
    )
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    Ok(created)
}

/// Reconciliation sweep: re-scan ALL unsynced raw checkins against the
/// current product table, derive missing tastings, and mark matches synced.
///
/// Handles checkins ingested before their product was matched. Safe to run
/// repeatedly; with nothing new to match it is a zero-effect pass.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails (transaction rolls back).
pub async fn sync_unmatched_checkins(pool: &PgPool) -> Result<SyncOutcome, DbError> {
    let mut tx = pool.begin().await?;

    let user_ids = sqlx::query_scalar::<_, i64>(
        "INSERT INTO tastings (user_id, product_id, rating) \
         SELECT rc.user_id, p.retail_id, MAX(rc.rating) \
         FROM raw_checkins rc \
         JOIN products p ON p.community_id = rc.community_beer_id \
         WHERE NOT rc.synced \
         GROUP BY rc.user_id, p.retail_id \
         ON CONFLICT (user_id, product_id) DO NOTHING \
         RETURNING user_id",
    )
    .fetch_all(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE raw_checkins rc SET synced = TRUE \
         FROM products p \
         WHERE NOT rc.synced AND p.community_id = rc.community_beer_id",
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let synced_count = user_ids.len() as u64;
    let users_affected = user_ids.into_iter().collect::<HashSet<_>>().len() as u64;

    Ok(SyncOutcome {
        synced_count,
        users_affected,
    })
}
