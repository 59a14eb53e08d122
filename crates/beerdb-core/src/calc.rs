//! Derived-field math shared by the sync engines.
//!
//! These functions are the single source of truth for calculated product
//! attributes; every writer recomputes through them so the stored values
//! never drift from the raw fields they derive from.

/// Price per litre, given a price and the raw volume figure the retailer
/// reports (centilitres). Returns `None` for a zero/negative volume.
#[must_use]
pub fn price_per_volume(price: f64, volume_raw: f64) -> Option<f64> {
    let volume_litres = volume_raw / 100.0;
    if volume_litres > 0.0 {
        Some(price / volume_litres)
    } else {
        None
    }
}

/// Standard alcohol units for a container: `ml * abv% * 0.8 / 12`.
///
/// `volume_litres` is the stored volume (litres), `abv` in percent.
#[must_use]
pub fn alcohol_units(volume_litres: f64, abv: f64) -> Option<f64> {
    if volume_litres > 0.0 && abv > 0.0 {
        Some(volume_litres * 1000.0 * abv / 100.0 * 0.8 / 12.0)
    } else {
        None
    }
}

/// Nonlinear value score: rating raised to 4.8, discounted by a gentle
/// power of price-per-litre, rescaled to a human-friendly range.
///
/// Defined only when both inputs are positive; a rating of zero means
/// "unrated", not "worthless".
#[must_use]
pub fn value_score(rating: Option<f64>, price_per_volume: Option<f64>) -> Option<f64> {
    match (rating, price_per_volume) {
        (Some(r), Some(ppv)) if r > 0.0 && ppv > 0.0 => {
            Some((r.powf(4.8) / (ppv / 100.0).powf(0.32)) * 0.0176)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_per_volume_converts_centilitres() {
        // 100 kr for a 50 cl can -> 200 kr/litre.
        assert_eq!(price_per_volume(100.0, 50.0), Some(200.0));
    }

    #[test]
    fn price_per_volume_rejects_zero_volume() {
        assert_eq!(price_per_volume(100.0, 0.0), None);
    }

    #[test]
    fn alcohol_units_standard_can() {
        // 0.5 l at 4.7% -> 0.5 * 1000 * 0.047 * 0.8 / 12 ≈ 1.5667 units.
        let units = alcohol_units(0.5, 4.7).unwrap();
        assert!((units - 1.566_666).abs() < 1e-3);
    }

    #[test]
    fn alcohol_units_requires_positive_inputs() {
        assert_eq!(alcohol_units(0.0, 4.7), None);
        assert_eq!(alcohol_units(0.5, 0.0), None);
    }

    #[test]
    fn value_score_none_without_rating() {
        assert_eq!(value_score(None, Some(200.0)), None);
        assert_eq!(value_score(Some(0.0), Some(200.0)), None);
        assert_eq!(value_score(Some(4.0), None), None);
        assert_eq!(value_score(Some(4.0), Some(0.0)), None);
    }

    #[test]
    fn value_score_matches_reference_formula() {
        let score = value_score(Some(4.0), Some(200.0)).unwrap();
        let expected = (4.0_f64.powf(4.8) / 2.0_f64.powf(0.32)) * 0.0176;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn value_score_rewards_cheaper_beer_at_equal_rating() {
        let cheap = value_score(Some(4.0), Some(100.0)).unwrap();
        let dear = value_score(Some(4.0), Some(400.0)).unwrap();
        assert!(cheap > dear);
    }
}
