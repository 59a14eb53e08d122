//! User-list command handlers.

use sqlx::PgPool;

pub(crate) async fn create_list(
    pool: &PgPool,
    username: &str,
    name: &str,
    description: Option<&str>,
) -> anyhow::Result<()> {
    let user_id = beerdb_db::ensure_user(pool, username).await?;
    let list = beerdb_db::create_list(pool, user_id, name, description).await?;
    println!("created list {} (share token {})", list.id, list.share_token);
    Ok(())
}

pub(crate) async fn show_lists(pool: &PgPool, username: &str) -> anyhow::Result<()> {
    let user_id = beerdb_db::get_user_id(pool, username)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user '{username}' not found"))?;

    let lists = beerdb_db::list_user_lists(pool, user_id).await?;
    if lists.is_empty() {
        println!("{username} has no lists");
        return Ok(());
    }
    for list in lists {
        println!(
            "{}\t{}\t{}",
            list.id,
            list.name,
            list.description.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub(crate) async fn add_list_item(
    pool: &PgPool,
    list_id: i64,
    product_id: &str,
) -> anyhow::Result<()> {
    beerdb_db::add_list_item(pool, list_id, product_id).await?;
    println!("added {product_id} to list {list_id}");
    Ok(())
}

pub(crate) async fn remove_list_item(
    pool: &PgPool,
    list_id: i64,
    product_id: &str,
) -> anyhow::Result<()> {
    if beerdb_db::remove_list_item(pool, list_id, product_id).await? {
        println!("removed {product_id} from list {list_id}");
    } else {
        println!("{product_id} was not on list {list_id}");
    }
    Ok(())
}

pub(crate) async fn reorder_lists(
    pool: &PgPool,
    username: &str,
    ordered_ids: &[i64],
) -> anyhow::Result<()> {
    let user_id = beerdb_db::get_user_id(pool, username)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user '{username}' not found"))?;

    beerdb_db::reorder_lists(pool, user_id, ordered_ids).await?;
    println!("reordered {} lists", ordered_ids.len());
    Ok(())
}

pub(crate) async fn reorder_items(
    pool: &PgPool,
    list_id: i64,
    ordered_item_ids: &[i64],
) -> anyhow::Result<()> {
    beerdb_db::reorder_items(pool, list_id, ordered_item_ids).await?;
    println!("reordered {} items on list {list_id}", ordered_item_ids.len());
    Ok(())
}
