//! Minimal owner table. Authentication lives outside this pipeline; jobs
//! only need a stable id per username.

use sqlx::PgPool;

use crate::DbError;

/// Get-or-create a user by username, returning the internal id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn ensure_user(pool: &PgPool, username: &str) -> Result<i64, DbError> {
    // DO UPDATE instead of DO NOTHING so RETURNING always yields the id.
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username) VALUES ($1) \
         ON CONFLICT (username) DO UPDATE SET username = EXCLUDED.username \
         RETURNING id",
    )
    .bind(username)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Look up a user id by username.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_user_id(pool: &PgPool, username: &str) -> Result<Option<i64>, DbError> {
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(id)
}
