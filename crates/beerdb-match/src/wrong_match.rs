//! Wrong-match corrections: user-submitted beer urls replacing an
//! automatic match.

use sqlx::PgPool;
use tracing::info;

use beerdb_core::normalize::trailing_id;
use beerdb_db::{
    apply_community_match, delete_wrong_match, get_product, get_wrong_match, insert_wrong_match,
    CommunityMatch,
};

use crate::client::CommunityClient;
use crate::error::MatchError;

/// How submitted corrections are handled.
#[derive(Debug, Clone, Copy, Default)]
pub struct WrongMatchPolicy {
    /// Apply corrections immediately instead of queueing them for review.
    pub auto_accept: bool,
}

/// What happened to a submitted correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Applied directly; the correction row was never persisted.
    Applied,
    /// Stored for manual review.
    Pending,
    /// The resolved url already matches the stored one.
    Discarded,
}

/// Submits a correction for a product's community match.
///
/// The url is first resolved through redirects so shortlinks land on the
/// canonical beer page. A correction equal to the stored match is
/// discarded. With `auto_accept` the correction is applied on the spot
/// and flags the product for a priority page refresh; otherwise it waits
/// in the review queue.
///
/// # Errors
///
/// Returns [`MatchError::UnknownProduct`] for an unknown product id,
/// [`MatchError::MissingBeerId`] when an auto-accepted url has no
/// numeric trailing id, and [`MatchError::Db`] on database failure.
pub async fn submit_wrong_match(
    pool: &PgPool,
    client: &CommunityClient,
    retail_id: i64,
    suggested_url: &str,
    policy: WrongMatchPolicy,
) -> Result<SubmitOutcome, MatchError> {
    let product = get_product(pool, retail_id)
        .await?
        .ok_or(MatchError::UnknownProduct { retail_id })?;

    let resolved = client.resolve_url(suggested_url).await;

    if product.community_url.as_deref() == Some(resolved.as_str()) {
        info!(retail_id, url = %resolved, "correction matches stored url, discarding");
        return Ok(SubmitOutcome::Discarded);
    }

    if policy.auto_accept {
        apply_correction(pool, retail_id, &resolved).await?;
        info!(retail_id, url = %resolved, "correction auto-accepted");
        return Ok(SubmitOutcome::Applied);
    }

    insert_wrong_match(pool, retail_id, &resolved).await?;
    info!(retail_id, url = %resolved, "correction queued for review");
    Ok(SubmitOutcome::Pending)
}

/// Applies a pending correction and removes it from the review queue.
///
/// # Errors
///
/// Returns [`MatchError::UnknownCorrection`] for an unknown id,
/// [`MatchError::MissingBeerId`] for a url without a numeric trailing
/// id, and [`MatchError::Db`] on database failure.
pub async fn accept_wrong_match(pool: &PgPool, id: i64) -> Result<(), MatchError> {
    let correction = get_wrong_match(pool, id)
        .await?
        .ok_or(MatchError::UnknownCorrection { id })?;

    apply_correction(pool, correction.product_id, &correction.suggested_url).await?;
    delete_wrong_match(pool, id).await?;
    info!(
        retail_id = correction.product_id,
        url = %correction.suggested_url,
        "correction accepted"
    );
    Ok(())
}

/// A corrected match carries no name yet; the priority recheck fills the
/// community columns on the next enrichment run.
async fn apply_correction(pool: &PgPool, retail_id: i64, url: &str) -> Result<(), MatchError> {
    let community_id = trailing_id(url).ok_or_else(|| MatchError::MissingBeerId {
        url: url.to_string(),
    })?;

    let m = CommunityMatch {
        community_id,
        community_url: url.to_string(),
        community_name: None,
        prioritize_recheck: true,
    };
    apply_community_match(pool, retail_id, &m).await?;
    Ok(())
}
