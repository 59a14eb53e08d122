//! Check-in and tasting command handlers.

use std::path::Path;

use sqlx::PgPool;

use beerdb_core::AppConfig;
use beerdb_match::{CommunityClient, Throttle};

pub(crate) async fn import_checkins(
    pool: &PgPool,
    username: &str,
    file: &Path,
) -> anyhow::Result<()> {
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("invalid file path: {}", file.display()))?;
    let contents = std::fs::read_to_string(file)?;

    let checkins = beerdb_checkins::parse_export(filename, &contents)?;
    let user_id = beerdb_db::ensure_user(pool, username).await?;

    let stats = beerdb_checkins::import_checkins(pool, user_id, &checkins).await?;
    println!(
        "imported {} tastings from {} check-ins",
        stats.imported_count, stats.total_check_ins
    );
    Ok(())
}

pub(crate) async fn add_feed(pool: &PgPool, username: &str, url: &str) -> anyhow::Result<()> {
    let user_id = beerdb_db::ensure_user(pool, username).await?;
    beerdb_db::add_feed(pool, user_id, url).await?;
    println!("subscribed {username} to {url}");
    Ok(())
}

pub(crate) async fn sync_rss(
    pool: &PgPool,
    config: &AppConfig,
    username: Option<&str>,
) -> anyhow::Result<()> {
    let client = CommunityClient::new(
        &config.community_base_url,
        config.http_request_timeout_secs,
        &config.http_user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build community client: {e}"))?;
    let throttle = Throttle::new(config.http_inter_request_delay_ms);

    let summary = beerdb_checkins::sync_feeds(pool, &client, &throttle, username).await?;
    println!(
        "feed sweep: {} check-ins imported, {} tastings derived across {} users",
        summary.imported, summary.synced_count, summary.users_affected
    );
    Ok(())
}

pub(crate) async fn mark_tasted(
    pool: &PgPool,
    username: &str,
    retail_id: i64,
) -> anyhow::Result<()> {
    let user_id = beerdb_db::get_user_id(pool, username)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user '{username}' not found"))?;

    if beerdb_db::mark_tasted(pool, user_id, retail_id, None).await? {
        println!("marked {retail_id} as tasted");
    } else {
        println!("{retail_id} was already marked");
    }
    Ok(())
}

pub(crate) async fn unmark_tasted(
    pool: &PgPool,
    username: &str,
    retail_id: i64,
) -> anyhow::Result<()> {
    let user_id = beerdb_db::get_user_id(pool, username)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user '{username}' not found"))?;

    if beerdb_db::unmark_tasted(pool, user_id, retail_id).await? {
        println!("removed tasted mark from {retail_id}");
    } else {
        println!("{retail_id} was not marked");
    }
    Ok(())
}
