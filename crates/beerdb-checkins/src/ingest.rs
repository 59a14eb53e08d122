//! Batch import of parsed check-ins into raw storage and tastings.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;

use beerdb_db::{store_import_batch, ImportStats, NewCheckin};

use crate::error::CheckinError;

/// Imports a parsed batch for one user: in-batch dedup, one transaction
/// for raw storage plus tasting derivation.
///
/// `total_check_ins` reports the parsed input size before dedup so the
/// operator can see how much the file shrank.
///
/// # Errors
///
/// Returns [`CheckinError::Db`] if the transaction fails; nothing is
/// persisted in that case.
pub async fn import_checkins(
    pool: &PgPool,
    user_id: i64,
    checkins: &[NewCheckin],
) -> Result<ImportStats, CheckinError> {
    let deduped = dedup_batch(checkins);
    let imported = store_import_batch(pool, user_id, &deduped).await?;

    let stats = ImportStats {
        imported_count: imported,
        total_check_ins: checkins.len() as u64,
    };
    info!(
        user_id,
        imported = stats.imported_count,
        total = stats.total_check_ins,
        "check-in import complete"
    );
    Ok(stats)
}

/// Collapses duplicates within one batch before they reach the database.
///
/// Records with a checkin id are unique by that id; records without one
/// collapse per beer, keeping the best rating and the earliest timestamp,
/// mirroring the conflict rules the storage layer applies across batches.
fn dedup_batch(checkins: &[NewCheckin]) -> Vec<NewCheckin> {
    let mut by_checkin_id: HashMap<i64, usize> = HashMap::new();
    let mut by_beer_id: HashMap<i64, usize> = HashMap::new();
    let mut out: Vec<NewCheckin> = Vec::new();

    for checkin in checkins {
        if let Some(external_id) = checkin.external_checkin_id {
            if by_checkin_id.contains_key(&external_id) {
                continue;
            }
            by_checkin_id.insert(external_id, out.len());
            out.push(checkin.clone());
            continue;
        }

        match by_beer_id.get(&checkin.community_beer_id) {
            Some(&idx) => merge_into(&mut out[idx], checkin),
            None => {
                by_beer_id.insert(checkin.community_beer_id, out.len());
                out.push(checkin.clone());
            }
        }
    }

    out
}

fn merge_into(kept: &mut NewCheckin, other: &NewCheckin) {
    kept.rating = match (kept.rating, other.rating) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    };
    kept.checked_in_at = match (kept.checked_in_at, other.checked_in_at) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
}
