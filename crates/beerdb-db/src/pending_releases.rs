//! Pre-registered retailer ids that have not yet appeared in search results.

use sqlx::PgPool;

use crate::DbError;

/// Register a retailer id as pending release. Idempotent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn add_pending_release(pool: &PgPool, retail_id: i64) -> Result<(), DbError> {
    sqlx::query("INSERT INTO pending_releases (retail_id) VALUES ($1) ON CONFLICT DO NOTHING")
        .bind(retail_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// All pending-release ids, oldest registration first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_pending_releases(pool: &PgPool) -> Result<Vec<i64>, DbError> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT retail_id FROM pending_releases ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Drop a pending-release marker once the product has been resolved.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn remove_pending_release(pool: &PgPool, retail_id: i64) -> Result<(), DbError> {
    sqlx::query("DELETE FROM pending_releases WHERE retail_id = $1")
        .bind(retail_id)
        .execute(pool)
        .await?;

    Ok(())
}
