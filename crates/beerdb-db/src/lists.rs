//! User-owned ordered lists. Consumed as-is by the pipeline; ordering is
//! maintained only by the explicit reorder operations, never automatically.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `user_lists` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserListRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub share_token: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `user_list_items` table. `product_id` is the external
/// retailer id kept as text, matching what clients send.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ListItemRow {
    pub id: i64,
    pub list_id: i64,
    pub product_id: String,
    pub position: i32,
    pub added_at: DateTime<Utc>,
}

/// Create a list for a user, appended after their existing lists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_list(
    pool: &PgPool,
    user_id: i64,
    name: &str,
    description: Option<&str>,
) -> Result<UserListRow, DbError> {
    let row = sqlx::query_as::<_, UserListRow>(
        "INSERT INTO user_lists (user_id, name, description, sort_order) \
         VALUES ($1, $2, $3, \
                 (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM user_lists WHERE user_id = $1)) \
         RETURNING id, user_id, name, description, sort_order, share_token, created_at, updated_at",
    )
    .bind(user_id)
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// A user's lists in their explicit order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_user_lists(pool: &PgPool, user_id: i64) -> Result<Vec<UserListRow>, DbError> {
    let rows = sqlx::query_as::<_, UserListRow>(
        "SELECT id, user_id, name, description, sort_order, share_token, created_at, updated_at \
         FROM user_lists WHERE user_id = $1 \
         ORDER BY sort_order, created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Add a product to a list, appended at the end. Duplicate adds are no-ops.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn add_list_item(pool: &PgPool, list_id: i64, product_id: &str) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO user_list_items (list_id, product_id, position) \
         VALUES ($1, $2, \
                 (SELECT COALESCE(MAX(position) + 1, 0) FROM user_list_items WHERE list_id = $1)) \
         ON CONFLICT (list_id, product_id) DO NOTHING",
    )
    .bind(list_id)
    .bind(product_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove a product from a list. Positions of the remaining items are left
/// as they are.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn remove_list_item(
    pool: &PgPool,
    list_id: i64,
    product_id: &str,
) -> Result<bool, DbError> {
    let affected = sqlx::query(
        "DELETE FROM user_list_items WHERE list_id = $1 AND product_id = $2",
    )
    .bind(list_id)
    .bind(product_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(affected > 0)
}

/// Explicit reorder of a user's lists: positions are assigned from the
/// order of `ordered_list_ids`, atomically. Ids not owned by the user are
/// ignored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails (transaction rolls back).
pub async fn reorder_lists(
    pool: &PgPool,
    user_id: i64,
    ordered_list_ids: &[i64],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    for (position, list_id) in ordered_list_ids.iter().enumerate() {
        sqlx::query(
            "UPDATE user_lists SET sort_order = $3, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(list_id)
        .bind(user_id)
        .bind(i32::try_from(position).unwrap_or(i32::MAX))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Explicit reorder of a list's items, by item id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails (transaction rolls back).
pub async fn reorder_items(
    pool: &PgPool,
    list_id: i64,
    ordered_item_ids: &[i64],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    for (position, item_id) in ordered_item_ids.iter().enumerate() {
        sqlx::query("UPDATE user_list_items SET position = $3 WHERE id = $1 AND list_id = $2")
            .bind(item_id)
            .bind(list_id)
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}
