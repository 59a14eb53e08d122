//! Community-service command handlers: matching, enrichment, and
//! wrong-match corrections.

use sqlx::PgPool;

use beerdb_core::AppConfig;
use beerdb_match::{CommunityClient, LevenshteinScorer, SubmitOutcome, Throttle, WrongMatchPolicy};

fn community_client(config: &AppConfig) -> anyhow::Result<CommunityClient> {
    CommunityClient::new(
        &config.community_base_url,
        config.http_request_timeout_secs,
        &config.http_user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build community client: {e}"))
}

pub(crate) async fn match_community(
    pool: &PgPool,
    config: &AppConfig,
    limit: i64,
) -> anyhow::Result<()> {
    let client = community_client(config)?;
    let throttle = Throttle::new(config.http_inter_request_delay_ms);

    let summary =
        beerdb_match::match_products(pool, &client, &LevenshteinScorer, &throttle, limit).await?;
    println!(
        "matching: {} matched, {} flagged for review, {} skipped",
        summary.matched, summary.flagged, summary.skipped
    );
    Ok(())
}

pub(crate) async fn refresh_community(
    pool: &PgPool,
    config: &AppConfig,
    calls: i64,
) -> anyhow::Result<()> {
    let client = community_client(config)?;
    let throttle = Throttle::new(config.http_inter_request_delay_ms);

    let refreshed = beerdb_match::refresh_community(pool, &client, &throttle, calls).await?;
    println!("community refresh: {refreshed} products");
    Ok(())
}

pub(crate) async fn submit_wrong_match(
    pool: &PgPool,
    config: &AppConfig,
    retail_id: i64,
    url: &str,
) -> anyhow::Result<()> {
    let client = community_client(config)?;
    let policy = WrongMatchPolicy {
        auto_accept: config.auto_accept_wrong_match,
    };

    let outcome = beerdb_match::submit_wrong_match(pool, &client, retail_id, url, policy).await?;
    match outcome {
        SubmitOutcome::Applied => println!("correction applied to {retail_id}"),
        SubmitOutcome::Pending => println!("correction queued for review"),
        SubmitOutcome::Discarded => println!("correction matches the stored url, nothing to do"),
    }
    Ok(())
}

pub(crate) async fn list_wrong_matches(pool: &PgPool) -> anyhow::Result<()> {
    let pending = beerdb_db::list_wrong_matches(pool).await?;
    if pending.is_empty() {
        println!("no corrections waiting for review");
        return Ok(());
    }

    for correction in pending {
        println!(
            "{}\tproduct {}\t{}\t{}",
            correction.id,
            correction.product_id,
            correction.suggested_url,
            correction.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
