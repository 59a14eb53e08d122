//! Response shapes for the retailer's product search and detail APIs.
//!
//! The API has two generations in the wild; field names and value types
//! drifted between them (snake_case vs camelCase keys, numbers sometimes
//! serialized as strings, detail payloads wrapped or flat). The serde
//! aliases and flexible deserializers here absorb both so the sync engines
//! never branch on API version.

use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Search pages
// ---------------------------------------------------------------------------

/// Envelope around the category search page.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchEnvelope {
    #[serde(rename = "productCategorySearchPage", alias = "productSearchResult")]
    pub page: SearchPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub products: Vec<RetailProduct>,
    pub pagination: Pagination,
    #[serde(default)]
    pub facets: Vec<Facet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(rename = "totalPages", alias = "total_pages")]
    pub total_pages: u32,
}

/// One search facet; the store facet's values carry store codes.
#[derive(Debug, Clone, Deserialize)]
pub struct Facet {
    #[serde(default)]
    pub values: Vec<FacetValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacetValue {
    pub code: String,
}

/// A product record from either API generation.
#[derive(Debug, Clone, Deserialize)]
pub struct RetailProduct {
    pub code: String,
    pub name: String,
    #[serde(rename = "main_category", alias = "mainCategory")]
    pub main_category: Option<Named>,
    #[serde(rename = "main_sub_category", alias = "mainSubCategory")]
    pub sub_category: Option<Named>,
    #[serde(rename = "main_country", alias = "mainCountry")]
    pub country: Option<Named>,
    pub price: Option<ValueField>,
    pub volume: Option<ValueField>,
    #[serde(rename = "product_selection", alias = "productSelection")]
    pub product_selection: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "productAvailability")]
    pub availability: Option<Availability>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Named {
    pub name: String,
}

/// A `{ "value": ... }` wrapper whose value may arrive as number or string.
#[derive(Debug, Clone, Deserialize)]
pub struct ValueField {
    #[serde(deserialize_with = "flexible_f64")]
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Availability {
    #[serde(rename = "deliveryAvailability")]
    pub delivery: Option<DeliveryAvailability>,
    #[serde(rename = "storesAvailability")]
    pub stores: Option<StoresAvailability>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryAvailability {
    #[serde(rename = "availableForPurchase", default)]
    pub available_for_purchase: Option<FlexibleBool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoresAvailability {
    pub infos: Option<AvailabilityInfos>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityInfos {
    #[serde(rename = "readableValue")]
    pub readable_value: Option<String>,
    /// Free-text per-store availability, e.g. `"På lager: 42 stk"`.
    pub availability: Option<String>,
}

/// Booleans arrive as JSON bools in v3 and as `"true"`/`"false"` strings
/// in the older generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlexibleBool {
    Bool(bool),
    Text(String),
}

impl FlexibleBool {
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlexibleBool::Bool(b) => Some(*b),
            FlexibleBool::Text(s) => beerdb_core::normalize::parse_bool(s).ok(),
        }
    }
}

fn flexible_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map_err(serde::de::Error::custom),
    }
}

// ---------------------------------------------------------------------------
// Per-product documents (detail + pending-release lookup)
// ---------------------------------------------------------------------------

/// A single-product document, wrapped (`{"product": {...}}`) in one API
/// generation and flat in the other.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductDocument {
    Wrapped { product: RetailProduct },
    Flat(RetailProduct),
}

impl ProductDocument {
    #[must_use]
    pub fn into_product(self) -> RetailProduct {
        match self {
            ProductDocument::Wrapped { product } | ProductDocument::Flat(product) => product,
        }
    }
}

/// Detail payload from the per-product endpoint. Top-level descriptive
/// strings plus a `content` block with characteristics and pairings.
/// `vintage`/`year` is the canonical two-generation key split.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailResponse {
    pub color: Option<String>,
    pub smell: Option<String>,
    pub taste: Option<String>,
    pub allergens: Option<String>,
    pub method: Option<String>,
    pub vintage: Option<i32>,
    pub year: Option<i32>,
    pub sugar: Option<String>,
    pub acid: Option<String>,
    #[serde(default)]
    pub content: DetailContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailContent {
    #[serde(default)]
    pub characteristics: Vec<Characteristic>,
    #[serde(rename = "storagePotential")]
    pub storage_potential: Option<FormattedValue>,
    #[serde(default)]
    pub ingredients: Vec<FormattedValue>,
    #[serde(rename = "isGoodFor", default)]
    pub is_good_for: Vec<Named>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Characteristic {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_flexible_i32")]
    pub value: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormattedValue {
    #[serde(rename = "formattedValue")]
    pub formatted_value: Option<String>,
}

// ---------------------------------------------------------------------------
// Store endpoints
// ---------------------------------------------------------------------------

/// Envelope around a store's point-of-service detail.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreEnvelope {
    #[serde(rename = "pointOfService")]
    pub point_of_service: StoreDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreDetails {
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub address: StoreAddress,
    pub assortment: Option<String>,
    #[serde(rename = "geoPoint")]
    pub geo_point: GeoPoint,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreAddress {
    pub line1: Option<String>,
    #[serde(rename = "postalCode")]
    pub postal_code: Option<String>,
    pub town: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

fn opt_flexible_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(i32::try_from(n).ok()),
        Some(Raw::Text(s)) => Ok(s.trim().parse::<i32>().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_page_parses_both_key_generations() {
        let v2 = r#"{
            "productCategorySearchPage": {
                "pagination": { "totalPages": 3 },
                "products": [{
                    "code": "14962702",
                    "name": "Lervig Supersonic",
                    "main_category": { "name": "Øl" },
                    "price": { "value": "89,90" },
                    "volume": { "value": 50.0 }
                }]
            }
        }"#;
        let envelope: SearchEnvelope = serde_json::from_str(v2).unwrap();
        assert_eq!(envelope.page.pagination.total_pages, 3);
        let product = &envelope.page.products[0];
        assert_eq!(product.price.as_ref().unwrap().value, 89.9);
        assert_eq!(product.volume.as_ref().unwrap().value, 50.0);

        let v3 = r#"{
            "productSearchResult": {
                "pagination": { "totalPages": 1 },
                "products": [{
                    "code": "14962702",
                    "name": "Lervig Supersonic",
                    "mainCategory": { "name": "Øl" },
                    "price": { "value": 89.9 },
                    "volume": { "value": 50.0 }
                }]
            }
        }"#;
        let envelope: SearchEnvelope = serde_json::from_str(v3).unwrap();
        assert_eq!(
            envelope.page.products[0]
                .main_category
                .as_ref()
                .unwrap()
                .name,
            "Øl"
        );
    }

    #[test]
    fn product_document_unwraps_both_shapes() {
        let wrapped: ProductDocument =
            serde_json::from_str(r#"{"product": {"code": "1", "name": "A"}}"#).unwrap();
        assert_eq!(wrapped.into_product().code, "1");

        let flat: ProductDocument = serde_json::from_str(r#"{"code": "2", "name": "B"}"#).unwrap();
        assert_eq!(flat.into_product().code, "2");
    }

    #[test]
    fn flexible_bool_accepts_strings() {
        let avail: DeliveryAvailability =
            serde_json::from_str(r#"{"availableForPurchase": "true"}"#).unwrap();
        assert_eq!(
            avail.available_for_purchase.unwrap().as_bool(),
            Some(true)
        );

        let avail: DeliveryAvailability =
            serde_json::from_str(r#"{"availableForPurchase": false}"#).unwrap();
        assert_eq!(
            avail.available_for_purchase.unwrap().as_bool(),
            Some(false)
        );
    }

    #[test]
    fn detail_response_tolerates_sparse_payloads() {
        let detail: DetailResponse = serde_json::from_str(r#"{"color": "Gyllen"}"#).unwrap();
        assert_eq!(detail.color.as_deref(), Some("Gyllen"));
        assert!(detail.content.characteristics.is_empty());
        assert!(detail.vintage.is_none() && detail.year.is_none());
    }

    #[test]
    fn characteristic_value_accepts_string_digits() {
        let ch: Characteristic = serde_json::from_str(r#"{"name": "Fylde", "value": "7"}"#).unwrap();
        assert_eq!(ch.value, Some(7));
    }
}
