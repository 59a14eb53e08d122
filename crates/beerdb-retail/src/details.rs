//! Lazy detail enrichment from the retailer's per-product endpoint.

use sqlx::PgPool;
use tracing::{info, warn};

use beerdb_core::normalize::clean_decimal;
use beerdb_db::{apply_details, list_needing_details, DetailUpdate};

use crate::client::RetailClient;
use crate::error::RetailError;
use crate::types::DetailResponse;

/// Fetches and applies detail attributes for up to `calls` products that
/// have never been detailed. Returns the number of products enriched.
///
/// A 404 means the retailer has no detail record for the id at all, so
/// the product still gets its `details_fetched` stamp (with an empty
/// update) and permanently leaves the queue. Transient failures leave
/// the stamp unset and the product is retried on the next run.
///
/// # Errors
///
/// Returns [`RetailError::Db`] if the queue listing fails.
pub async fn enrich_details(
    pool: &PgPool,
    client: &RetailClient,
    calls: i64,
) -> Result<u64, RetailError> {
    let queue = list_needing_details(pool, calls).await?;
    let mut enriched = 0u64;

    for product in queue {
        let update = match client.product_details(product.retail_id).await {
            Ok(response) => to_detail_update(&response),
            Err(RetailError::NotFound { url }) => {
                warn!(retail_id = product.retail_id, %url, "no detail record, stamping empty");
                DetailUpdate::default()
            }
            Err(err) => {
                warn!(retail_id = product.retail_id, error = %err, "skipping detail fetch");
                continue;
            }
        };

        match apply_details(pool, product.retail_id, &update).await {
            Ok(()) => enriched += 1,
            Err(err) => warn!(retail_id = product.retail_id, error = %err, "detail apply failed"),
        }
    }

    info!(enriched, "detail enrichment complete");
    Ok(enriched)
}

/// Maps the raw detail payload to the stored columns. `vintage` is the
/// older key for the production year; characteristic names arrive in
/// Norwegian and map onto the four taste-profile columns.
fn to_detail_update(response: &DetailResponse) -> DetailUpdate {
    let mut update = DetailUpdate {
        year: response.vintage.or(response.year),
        sugar: response.sugar.as_deref().and_then(clean_decimal),
        acid: response.acid.as_deref().and_then(clean_decimal),
        color: response.color.clone(),
        aroma: response.smell.clone(),
        taste: response.taste.clone(),
        allergens: response.allergens.clone(),
        method: response.method.clone(),
        storable: response
            .content
            .storage_potential
            .as_ref()
            .and_then(|v| v.formatted_value.clone()),
        food_pairing: join_nonempty(
            response.content.is_good_for.iter().map(|n| n.name.as_str()),
        ),
        raw_materials: join_nonempty(
            response
                .content
                .ingredients
                .iter()
                .filter_map(|v| v.formatted_value.as_deref()),
        ),
        ..DetailUpdate::default()
    };

    for characteristic in &response.content.characteristics {
        let Some(value) = characteristic.value else {
            continue;
        };
        match characteristic.name.as_deref() {
            Some("Fylde") => update.fullness = Some(value),
            Some("Sødme") => update.sweetness = Some(value),
            Some("Friskhet") => update.freshness = Some(value),
            Some("Bitterhet") => update.bitterness = Some(value),
            _ => {}
        }
    }

    update
}

fn join_nonempty<'a>(parts: impl Iterator<Item = &'a str>) -> Option<String> {
    let joined: Vec<&str> = parts.filter(|p| !p.is_empty()).collect();
    if joined.is_empty() {
        None
    } else {
        Some(joined.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Characteristic, DetailContent, FormattedValue, Named};

    #[test]
    fn detail_mapping_covers_characteristics_and_decimals() {
        let response = DetailResponse {
            color: Some("Gyllen".to_string()),
            smell: Some("Tropisk frukt".to_string()),
            taste: None,
            allergens: Some("Gluten".to_string()),
            method: None,
            vintage: Some(2024),
            year: Some(2023),
            sugar: Some("4,5".to_string()),
            acid: Some("< 3".to_string()),
            content: DetailContent {
                characteristics: vec![
                    Characteristic {
                        name: Some("Fylde".to_string()),
                        value: Some(7),
                    },
                    Characteristic {
                        name: Some("Bitterhet".to_string()),
                        value: Some(9),
                    },
                    Characteristic {
                        name: Some("Garvestoffer".to_string()),
                        value: Some(4),
                    },
                ],
                storage_potential: Some(FormattedValue {
                    formatted_value: Some("Drikkeklar".to_string()),
                }),
                ingredients: vec![FormattedValue {
                    formatted_value: Some("Bygg".to_string()),
                }],
                is_good_for: vec![
                    Named {
                        name: "Lyst kjøtt".to_string(),
                    },
                    Named {
                        name: "Skalldyr".to_string(),
                    },
                ],
            },
        };

        let update = to_detail_update(&response);
        assert_eq!(update.year, Some(2024));
        assert_eq!(update.fullness, Some(7));
        assert_eq!(update.bitterness, Some(9));
        assert_eq!(update.sweetness, None);
        assert_eq!(update.sugar, Some(4.5));
        assert_eq!(update.acid, Some(3.0));
        assert_eq!(update.storable.as_deref(), Some("Drikkeklar"));
        assert_eq!(update.food_pairing.as_deref(), Some("Lyst kjøtt, Skalldyr"));
        assert_eq!(update.raw_materials.as_deref(), Some("Bygg"));
    }

    #[test]
    fn sparse_detail_maps_to_all_none() {
        let update = to_detail_update(&DetailResponse::default());
        assert_eq!(update.year, None);
        assert_eq!(update.food_pairing, None);
        assert_eq!(update.raw_materials, None);
    }
}
