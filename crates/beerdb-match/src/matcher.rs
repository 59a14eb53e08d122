//! Automatic reconciliation of unmatched catalog products against the
//! community service's beer index.

use sqlx::PgPool;
use tracing::{info, warn};

use beerdb_core::normalize::trailing_id;
use beerdb_db::{apply_community_match, flag_manual_match, list_unmatched, CommunityMatch};

use crate::client::{Candidate, CommunityClient};
use crate::error::MatchError;
use crate::queries::query_variants;
use crate::score::{Scorer, ACCEPT_THRESHOLD};
use crate::throttle::Throttle;

/// Outcome counts for one matching sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub matched: u64,
    pub flagged: u64,
    pub skipped: u64,
}

/// Matches up to `limit` unmatched products.
///
/// Variants are tried most specific first; the first variant whose search
/// returns anything is scored and its best candidate accepted when the
/// score clears [`ACCEPT_THRESHOLD`]. A sub-threshold best falls through
/// to the next, broader variant. When every variant is exhausted the
/// product is flagged for manual review with the closest candidate's name
/// recorded for the operator.
///
/// # Errors
///
/// Returns [`MatchError::Db`] if the unmatched listing fails. Per-product
/// search and write failures are logged and skipped.
pub async fn match_products<S: Scorer>(
    pool: &PgPool,
    client: &CommunityClient,
    scorer: &S,
    throttle: &Throttle,
    limit: i64,
) -> Result<MatchSummary, MatchError> {
    let products = list_unmatched(pool, limit).await?;
    let mut summary = MatchSummary::default();

    for product in products {
        match find_match(client, scorer, throttle, &product.name).await {
            Ok(Outcome::Accepted(candidate, score)) => {
                let Some(community_id) = trailing_id(&candidate.url) else {
                    warn!(
                        retail_id = product.retail_id,
                        url = %candidate.url,
                        "candidate url has no numeric id"
                    );
                    summary.skipped += 1;
                    continue;
                };

                let m = CommunityMatch {
                    community_id,
                    community_url: candidate.url.clone(),
                    community_name: Some(candidate.name.clone()),
                    prioritize_recheck: false,
                };
                match apply_community_match(pool, product.retail_id, &m).await {
                    Ok(()) => {
                        info!(
                            retail_id = product.retail_id,
                            name = %product.name,
                            matched = %candidate.name,
                            score,
                            "matched"
                        );
                        summary.matched += 1;
                    }
                    Err(err) => {
                        warn!(retail_id = product.retail_id, error = %err, "match write failed");
                        summary.skipped += 1;
                    }
                }
            }
            Ok(Outcome::NoMatch(best_name)) => {
                match flag_manual_match(pool, product.retail_id, best_name.as_deref()).await {
                    Ok(()) => {
                        info!(retail_id = product.retail_id, name = %product.name, "flagged manual");
                        summary.flagged += 1;
                    }
                    Err(err) => {
                        warn!(retail_id = product.retail_id, error = %err, "flag write failed");
                        summary.skipped += 1;
                    }
                }
            }
            Err(err) => {
                warn!(retail_id = product.retail_id, error = %err, "skipping product");
                summary.skipped += 1;
            }
        }
    }

    info!(
        matched = summary.matched,
        flagged = summary.flagged,
        skipped = summary.skipped,
        "matching sweep complete"
    );
    Ok(summary)
}

enum Outcome {
    Accepted(Candidate, u8),
    /// Every variant exhausted; carries the closest candidate's name.
    NoMatch(Option<String>),
}

async fn find_match<S: Scorer>(
    client: &CommunityClient,
    scorer: &S,
    throttle: &Throttle,
    name: &str,
) -> Result<Outcome, MatchError> {
    let mut closest: Option<(String, u8)> = None;

    for variant in query_variants(name) {
        throttle.wait().await;
        let candidates = client.search(&variant).await?;
        if candidates.is_empty() {
            continue;
        }

        let mut best: Option<(Candidate, u8)> = None;
        for candidate in candidates {
            let score = scorer.score(name, &candidate.name);
            if best.as_ref().map_or(true, |(_, s)| score > *s) {
                best = Some((candidate, score));
            }
        }

        if let Some((candidate, score)) = best {
            if score > ACCEPT_THRESHOLD {
                return Ok(Outcome::Accepted(candidate, score));
            }
            if closest.as_ref().map_or(true, |(_, s)| score > *s) {
                closest = Some((candidate.name, score));
            }
        }
    }

    Ok(Outcome::NoMatch(closest.map(|(name, _)| name)))
}
