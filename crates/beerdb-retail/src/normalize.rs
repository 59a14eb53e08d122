//! Normalization from raw retailer records to [`beerdb_db::CatalogUpsert`].

use regex::Regex;
use std::sync::OnceLock;

use beerdb_db::CatalogUpsert;

use crate::error::RetailError;
use crate::types::RetailProduct;

/// The store-delivery marker phrase in the availability blurb.
const ALL_STORES_PHRASE: &str = "Kan bestilles til alle butikker";

/// Converts a raw product record into the catalog upsert shape.
///
/// Volume arrives in centilitres and is stored in litres;
/// `price_per_volume` is recomputed here so it can never drift from the raw
/// fields. `web_origin` is the site origin product URLs are relative to.
///
/// # Errors
///
/// Returns [`RetailError::MissingField`] if the record's code is not a
/// parseable integer id.
pub fn to_catalog_upsert(
    product: &RetailProduct,
    web_origin: &str,
) -> Result<CatalogUpsert, RetailError> {
    let retail_id = product
        .code
        .trim()
        .parse::<i64>()
        .map_err(|_| RetailError::MissingField {
            code: product.code.clone(),
            field: "code".to_string(),
        })?;

    let price = product.price.as_ref().map(|p| p.value);
    let volume_raw = product.volume.as_ref().map(|v| v.value);

    let price_per_volume = match (price, volume_raw) {
        (Some(p), Some(v)) => beerdb_core::calc::price_per_volume(p, v),
        _ => None,
    };

    let retail_url = product.url.as_ref().map(|u| {
        if u.starts_with("http") {
            u.clone()
        } else {
            format!("{web_origin}{u}")
        }
    });

    let availability = product.availability.as_ref();
    let post_delivery = availability
        .and_then(|a| a.delivery.as_ref())
        .and_then(|d| d.available_for_purchase.as_ref())
        .and_then(crate::types::FlexibleBool::as_bool);
    let store_delivery = availability
        .and_then(|a| a.stores.as_ref())
        .and_then(|s| s.infos.as_ref())
        .and_then(|i| i.readable_value.as_deref())
        .map(|v| v == ALL_STORES_PHRASE);

    Ok(CatalogUpsert {
        retail_id,
        name: product.name.clone(),
        main_category: product.main_category.as_ref().map(|c| c.name.clone()),
        sub_category: product.sub_category.as_ref().map(|c| c.name.clone()),
        country: product.country.as_ref().map(|c| c.name.clone()),
        price,
        volume: volume_raw.map(|v| v / 100.0),
        price_per_volume,
        product_selection: product
            .product_selection
            .clone()
            .unwrap_or_else(|| "Tilleggsutvalget".to_string()),
        retail_url,
        post_delivery,
        store_delivery,
    })
}

/// First integer in a per-store availability blurb, or 0 when none.
///
/// The per-store quantity only exists inside free text like
/// `"På lager: 42 stk"`.
#[must_use]
pub fn extract_quantity(availability_text: &str) -> i32 {
    static QUANTITY_RE: OnceLock<Regex> = OnceLock::new();
    let re = QUANTITY_RE.get_or_init(|| Regex::new(r"\b\d+\b").expect("valid quantity regex"));

    re.find(availability_text)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .unwrap_or(0)
}

/// The scheme+host origin of a base URL, with any path stripped.
///
/// Product URLs in search results are site-relative; they resolve against
/// the web origin of the API host.
#[must_use]
pub fn web_origin(base_url: &str) -> String {
    let Some(scheme_end) = base_url.find("://") else {
        return base_url.trim_end_matches('/').to_string();
    };
    let after_scheme = scheme_end + 3;
    let host_end = base_url[after_scheme..]
        .find('/')
        .map_or(base_url.len(), |i| after_scheme + i);
    base_url[..host_end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Named, RetailProduct, ValueField};

    fn record(code: &str, price: f64, volume: f64) -> RetailProduct {
        RetailProduct {
            code: code.to_string(),
            name: "Lervig Supersonic".to_string(),
            main_category: Some(Named {
                name: "Øl".to_string(),
            }),
            sub_category: None,
            country: Some(Named {
                name: "Norge".to_string(),
            }),
            price: Some(ValueField { value: price }),
            volume: Some(ValueField { value: volume }),
            product_selection: None,
            url: Some("/Land/Norge/Lervig-Supersonic/p/14962702".to_string()),
            availability: None,
        }
    }

    #[test]
    fn upsert_converts_volume_and_derives_price_per_volume() {
        let upsert = to_catalog_upsert(&record("14962702", 89.9, 50.0), "https://shop.example")
            .unwrap();

        assert_eq!(upsert.retail_id, 14962702);
        assert_eq!(upsert.volume, Some(0.5));
        assert_eq!(upsert.price_per_volume, Some(179.8));
        assert_eq!(
            upsert.retail_url.as_deref(),
            Some("https://shop.example/Land/Norge/Lervig-Supersonic/p/14962702")
        );
    }

    #[test]
    fn non_numeric_code_is_rejected() {
        let err = to_catalog_upsert(&record("abc", 89.9, 50.0), "https://shop.example").unwrap_err();
        assert!(matches!(err, RetailError::MissingField { .. }));
    }

    #[test]
    fn quantity_extraction_finds_first_integer() {
        assert_eq!(extract_quantity("På lager: 42 stk"), 42);
        assert_eq!(extract_quantity("Utsolgt"), 0);
        assert_eq!(extract_quantity("3 stk på lager, 12 i bestilling"), 3);
    }

    #[test]
    fn web_origin_strips_paths() {
        assert_eq!(
            web_origin("https://shop.example/api/v2/"),
            "https://shop.example"
        );
        assert_eq!(web_origin("https://shop.example"), "https://shop.example");
    }
}
