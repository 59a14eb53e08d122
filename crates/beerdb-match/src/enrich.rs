//! Community-page refresh: ratings, brewery, style, and the other
//! community-owned columns for already-matched products.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};

use beerdb_core::calc::alcohol_units;
use beerdb_db::{apply_community_page, community_refresh_queue, CommunityPageUpdate, ProductRow};

use crate::client::CommunityClient;
use crate::error::MatchError;
use crate::extract::{json_ld_blocks, ld_f64, ld_str};
use crate::throttle::Throttle;

/// Refreshes community-page data for up to `limit` matched products, in
/// queue priority order (recheck-flagged, then rating-less, then
/// stalest). Returns the number of products refreshed.
///
/// A page that fails to fetch is logged and skipped; its staleness is
/// untouched so it stays at the head of the rotation.
///
/// # Errors
///
/// Returns [`MatchError::Db`] if the queue listing fails.
pub async fn refresh_community(
    pool: &PgPool,
    client: &CommunityClient,
    throttle: &Throttle,
    limit: i64,
) -> Result<u64, MatchError> {
    let queue = community_refresh_queue(pool, limit).await?;
    let mut refreshed = 0u64;

    for product in queue {
        let Some(url) = product.community_url.clone() else {
            warn!(retail_id = product.retail_id, "matched product without a url");
            continue;
        };

        throttle.wait().await;
        let html = match client.fetch_page(&url).await {
            Ok(html) => html,
            Err(err) => {
                warn!(retail_id = product.retail_id, %url, error = %err, "skipping page");
                continue;
            }
        };

        let update = extract_page(&html, &product);
        match apply_community_page(pool, product.retail_id, &update).await {
            Ok(()) => refreshed += 1,
            Err(err) => warn!(retail_id = product.retail_id, error = %err, "page apply failed"),
        }
    }

    info!(refreshed, "community refresh complete");
    Ok(refreshed)
}

fn re(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid page regex"))
}

/// Builds the column update from a beer page. JSON-LD is authoritative
/// where present; each field falls back to its HTML chain.
fn extract_page(html: &str, product: &ProductRow) -> CommunityPageUpdate {
    let ld = product_ld(html);
    let ld = ld.as_ref();

    let abv = extract_abv(html);
    let alcohol = match (product.volume, abv.or(product.abv)) {
        (Some(volume), Some(abv)) => alcohol_units(volume, abv),
        _ => None,
    };

    #[allow(clippy::cast_possible_truncation)]
    CommunityPageUpdate {
        community_id: ld
            .and_then(|v| ld_f64(v, &["sku"]))
            .map(|sku| sku as i64),
        community_name: ld
            .and_then(|v| ld_str(v, &["name"]))
            .map(str::to_string)
            .or_else(|| extract_name(html)),
        community_url: ld
            .and_then(|v| ld_str(v, &["url"]))
            .map(str::to_string),
        brewery: ld
            .and_then(|v| ld_str(v, &["brand", "name"]))
            .map(str::to_string)
            .or_else(|| extract_brewery(html)),
        rating: ld
            .and_then(|v| ld_f64(v, &["aggregateRating", "ratingValue"]))
            .or_else(|| extract_rating(html)),
        checkins: ld
            .and_then(|v| ld_f64(v, &["aggregateRating", "reviewCount"]))
            .map(|count| count as i32)
            .or_else(|| extract_checkins(html)),
        style: extract_style(html),
        description: ld
            .and_then(|v| ld_str(v, &["description"]))
            .map(str::to_string)
            .or_else(|| extract_description(html)),
        abv,
        ibu: extract_ibu(html),
        label_hd_url: extract_label_hd(html),
        label_sm_url: extract_label_sm(html),
        alcohol_units: alcohol,
    }
}

/// The Product-typed JSON-LD block, when the page carries one.
fn product_ld(html: &str) -> Option<Value> {
    json_ld_blocks(html)
        .into_iter()
        .find(|block| block.get("@type").and_then(Value::as_str) == Some("Product"))
}

fn extract_name(html: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r#"(?s)<h1>(.*?)</h1>"#)
        .captures(html)
        .map(|caps| caps[1].trim().to_string())
}

fn extract_brewery(html: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r#"(?s)<p class="brewery">\s*<a[^>]*>(.*?)</a>"#)
        .captures(html)
        .map(|caps| caps[1].trim().to_string())
}

fn extract_rating(html: &str) -> Option<f64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r#"data-rating="(\d+(?:\.\d+)?)""#)
        .captures(html)
        .and_then(|caps| caps[1].parse().ok())
}

fn extract_checkins(html: &str) -> Option<i32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r#"class="count[^"]*"[^>]*>\s*([\d,]+)"#)
        .captures(html)
        .and_then(|caps| caps[1].replace(',', "").parse().ok())
}

fn extract_style(html: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r#"(?s)<p class="style">(.*?)</p>"#)
        .captures(html)
        .map(|caps| caps[1].trim().to_string())
}

fn extract_description(html: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r#"(?s)<div class="beer-descrption-read-less">(.*?)<a"#)
        .captures(html)
        .map(|caps| caps[1].trim().to_string())
}

fn extract_abv(html: &str) -> Option<f64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"(\d+(?:[.,]\d+)?)%\s*ABV")
        .captures(html)
        .and_then(|caps| caps[1].replace(',', ".").parse().ok())
}

fn extract_ibu(html: &str) -> Option<i32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"(\d+)\s*IBU")
        .captures(html)
        .and_then(|caps| caps[1].parse().ok())
}

fn extract_label_hd(html: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r#"class="label image-big"[^>]*data-image="([^"]+)""#)
        .captures(html)
        .map(|caps| caps[1].to_string())
}

fn extract_label_sm(html: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r#"(?s)<a class="label[^"]*"[^>]*>\s*<img src="([^"]+)""#)
        .captures(html)
        .map(|caps| caps[1].to_string())
}
