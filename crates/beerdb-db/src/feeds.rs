//! Per-user RSS feed subscriptions polled by the check-in sync job.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `rss_feeds` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedRow {
    pub id: i64,
    pub user_id: i64,
    pub feed_url: String,
    pub active: bool,
    pub last_synced: Option<DateTime<Utc>>,
}

/// Subscribe a user to a feed (idempotent on the url).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn add_feed(pool: &PgPool, user_id: i64, feed_url: &str) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO rss_feeds (user_id, feed_url) VALUES ($1, $2) \
         ON CONFLICT (user_id, feed_url) DO UPDATE SET active = TRUE",
    )
    .bind(user_id)
    .bind(feed_url)
    .execute(pool)
    .await?;

    Ok(())
}

/// Active subscriptions, optionally restricted to one username.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_feeds(
    pool: &PgPool,
    username: Option<&str>,
) -> Result<Vec<FeedRow>, DbError> {
    let rows = sqlx::query_as::<_, FeedRow>(
        "SELECT f.id, f.user_id, f.feed_url, f.active, f.last_synced \
         FROM rss_feeds f \
         JOIN users u ON u.id = f.user_id \
         WHERE f.active AND ($1::text IS NULL OR u.username = $1) \
         ORDER BY f.id",
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Stamp a feed's `last_synced` after a pass that imported something.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn stamp_feed_synced(pool: &PgPool, feed_id: i64) -> Result<(), DbError> {
    sqlx::query("UPDATE rss_feeds SET last_synced = NOW() WHERE id = $1")
        .bind(feed_id)
        .execute(pool)
        .await?;

    Ok(())
}
