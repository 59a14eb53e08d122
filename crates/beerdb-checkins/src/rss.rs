//! RSS feed sync: near-real-time check-ins scraped from users' public
//! activity feeds.

use std::sync::OnceLock;

use regex::Regex;
use sqlx::PgPool;
use tracing::{info, warn};

use beerdb_db::{
    existing_checkin_ids, insert_feed_checkin, list_active_feeds, stamp_feed_synced,
    sync_unmatched_checkins, NewCheckin, SyncOutcome,
};
use beerdb_match::{extract, CommunityClient, Throttle};

use crate::error::CheckinError;

/// Outcome counts for one feed sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub imported: u64,
    pub synced_count: u64,
    pub users_affected: u64,
}

/// Syncs every active feed (or one user's with `username`).
///
/// Per feed: fetch and parse, pull `/checkin/<id>` ids from entry links,
/// skip ids already stored, scrape each new check-in's page for beer id
/// and rating, and store it. A failed page or feed is logged and
/// skipped. After all feeds the unmatched-checkin resync sweep runs so
/// freshly matched products pick up older check-ins too.
///
/// # Errors
///
/// Returns [`CheckinError::Db`] if the feed listing or the final resync
/// sweep fails.
pub async fn sync_feeds(
    pool: &PgPool,
    client: &CommunityClient,
    throttle: &Throttle,
    username: Option<&str>,
) -> Result<FeedSummary, CheckinError> {
    let feeds = list_active_feeds(pool, username).await?;
    let mut imported = 0u64;

    for feed in feeds {
        match sync_one_feed(pool, client, throttle, feed.user_id, &feed.feed_url).await {
            Ok(0) => {}
            Ok(count) => {
                imported += count;
                if let Err(err) = stamp_feed_synced(pool, feed.id).await {
                    warn!(feed_id = feed.id, error = %err, "feed stamp failed");
                }
            }
            Err(err) => warn!(feed_id = feed.id, url = %feed.feed_url, error = %err, "skipping feed"),
        }
    }

    let SyncOutcome {
        synced_count,
        users_affected,
    } = sync_unmatched_checkins(pool).await?;

    let summary = FeedSummary {
        imported,
        synced_count,
        users_affected,
    };
    info!(
        imported = summary.imported,
        synced = summary.synced_count,
        users = summary.users_affected,
        "feed sweep complete"
    );
    Ok(summary)
}

async fn sync_one_feed(
    pool: &PgPool,
    client: &CommunityClient,
    throttle: &Throttle,
    user_id: i64,
    feed_url: &str,
) -> Result<u64, CheckinError> {
    throttle.wait().await;
    let body = client.fetch_page(feed_url).await?;
    let feed = feed_rs::parser::parse(body.as_bytes())?;

    let mut entries = Vec::new();
    for entry in feed.entries {
        let Some(checkin_id) = entry.links.iter().find_map(|link| checkin_id(&link.href))
        else {
            continue;
        };
        entries.push((checkin_id, entry.links, entry.published));
    }

    let candidate_ids: Vec<i64> = entries.iter().map(|(id, _, _)| *id).collect();
    let known = existing_checkin_ids(pool, &candidate_ids).await?;

    let mut imported = 0u64;
    for (checkin_id, links, published) in entries {
        if known.contains(&checkin_id) {
            continue;
        }
        let Some(link) = links.first() else {
            continue;
        };

        throttle.wait().await;
        let page = match client.fetch_page(&link.href).await {
            Ok(page) => page,
            Err(err) => {
                warn!(checkin_id, url = %link.href, error = %err, "skipping entry");
                continue;
            }
        };

        let Some(beer_id) = extract::checkin_beer_id(&page) else {
            warn!(checkin_id, url = %link.href, "no beer id on check-in page");
            continue;
        };

        let rating = extract::checkin_rating(&page).filter(|r| *r != 0.0);
        let checkin = NewCheckin {
            external_checkin_id: Some(checkin_id),
            community_beer_id: beer_id,
            rating,
            checked_in_at: published,
        };

        match insert_feed_checkin(pool, user_id, &checkin).await {
            Ok(true) => imported += 1,
            Ok(false) => {}
            Err(err) => warn!(checkin_id, error = %err, "check-in insert failed"),
        }
    }

    Ok(imported)
}

/// The numeric id in a `/checkin/<id>` link.
fn checkin_id(url: &str) -> Option<i64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"/checkin/(\d+)").expect("valid checkin-id regex"));

    re.captures(url).and_then(|caps| caps[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkin_id_parses_the_path_segment() {
        assert_eq!(
            checkin_id("https://community.example/user/alice/checkin/1234567"),
            Some(1_234_567)
        );
        assert_eq!(checkin_id("https://community.example/user/alice"), None);
        assert_eq!(checkin_id("/checkin/99?utm=feed"), Some(99));
    }
}
