//! Lookup-or-create for the `countries` reference table.

use sqlx::PgPool;

use crate::DbError;

/// Ensures a country row exists and returns its name (the primary key).
///
/// The retailer only ever sends a display name; ISO codes are filled in by
/// hand later, so the insert leaves `iso_code` NULL and a conflict is a
/// no-op rather than an overwrite.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn lookup_or_create_country(pool: &PgPool, name: &str) -> Result<String, DbError> {
    sqlx::query("INSERT INTO countries (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
        .bind(name)
        .execute(pool)
        .await?;

    Ok(name.to_string())
}
