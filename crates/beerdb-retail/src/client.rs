//! HTTP client for the retailer's product search and detail APIs.

use std::time::Duration;

use reqwest::Client;

use crate::error::RetailError;
use crate::types::{
    DetailResponse, ProductDocument, RetailProduct, SearchEnvelope, SearchPage, StoreDetails,
    StoreEnvelope,
};

/// Page size used for every search request. The API caps at 100.
pub const PAGE_SIZE: u32 = 100;

/// Client over both generations of the retailer API: search and store
/// endpoints on the v2 base, per-product detail on the v3 base.
///
/// Requests are issued one at a time by the sync engines; this client does
/// no concurrency or retries of its own — per-page failures are the
/// engines' unit of skip.
pub struct RetailClient {
    client: Client,
    base_url: String,
    v3_base_url: String,
}

impl RetailClient {
    /// Creates a client with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`RetailError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        v3_base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, RetailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            v3_base_url: v3_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Site origin that relative product URLs resolve against.
    #[must_use]
    pub fn web_origin(&self) -> String {
        crate::normalize::web_origin(&self.base_url)
    }

    /// Fetches one page of a category search, optionally restricted to a
    /// single store's shelf.
    ///
    /// # Errors
    ///
    /// Returns [`RetailError`] on HTTP failure, non-2xx status, or a body
    /// that parses as neither API generation.
    pub async fn search_page(
        &self,
        category: &beerdb_core::CategoryQuery,
        page: u32,
        store_id: Option<i32>,
    ) -> Result<SearchPage, RetailError> {
        let query = build_query(category, store_id);
        let url = format!(
            "{}/products/search/?currentPage={page}&fields=FULL&pageSize={PAGE_SIZE}&query={query}",
            self.base_url
        );

        let body = self.get_text(&url).await?;
        let envelope: SearchEnvelope =
            serde_json::from_str(&body).map_err(|source| RetailError::Deserialize {
                context: format!("search page {page} for {}", category.token),
                source,
            })?;

        Ok(envelope.page)
    }

    /// Store codes from the store facet of an empty search.
    ///
    /// # Errors
    ///
    /// Returns [`RetailError`] on HTTP or parse failure.
    pub async fn list_store_codes(&self) -> Result<Vec<String>, RetailError> {
        let url = format!(
            "{}/products/search/?currentPage=0&fields=FULL&pageSize=1&query=",
            self.base_url
        );

        let body = self.get_text(&url).await?;
        let envelope: SearchEnvelope =
            serde_json::from_str(&body).map_err(|source| RetailError::Deserialize {
                context: "store facet page".to_string(),
                source,
            })?;

        let codes = envelope
            .page
            .facets
            .first()
            .map(|facet| facet.values.iter().map(|v| v.code.clone()).collect())
            .unwrap_or_default();

        Ok(codes)
    }

    /// A store's point-of-service details.
    ///
    /// # Errors
    ///
    /// Returns [`RetailError`] on HTTP or parse failure.
    pub async fn store_details(&self, store_code: &str) -> Result<StoreDetails, RetailError> {
        let url = format!("{}/stores/{store_code}", self.base_url);

        let body = self.get_text(&url).await?;
        let envelope: StoreEnvelope =
            serde_json::from_str(&body).map_err(|source| RetailError::Deserialize {
                context: format!("store {store_code}"),
                source,
            })?;

        Ok(envelope.point_of_service)
    }

    /// A single product document by id — used to resolve pending releases
    /// before the product is visible in search.
    ///
    /// # Errors
    ///
    /// Returns [`RetailError`] on HTTP or parse failure, including
    /// [`RetailError::NotFound`] when the id is not registered yet.
    pub async fn product_by_id(&self, retail_id: i64) -> Result<RetailProduct, RetailError> {
        let url = format!("{}/products/{retail_id}?fields=FULL", self.v3_base_url);

        let body = self.get_text(&url).await?;
        let document: ProductDocument =
            serde_json::from_str(&body).map_err(|source| RetailError::Deserialize {
                context: format!("product {retail_id}"),
                source,
            })?;

        Ok(document.into_product())
    }

    /// The lazy detail payload for one product.
    ///
    /// # Errors
    ///
    /// Returns [`RetailError`] on HTTP or parse failure.
    pub async fn product_details(&self, retail_id: i64) -> Result<DetailResponse, RetailError> {
        let url = format!("{}/products/{retail_id}?fields=FULL", self.v3_base_url);

        let body = self.get_text(&url).await?;
        let detail: DetailResponse =
            serde_json::from_str(&body).map_err(|source| RetailError::Deserialize {
                context: format!("product details {retail_id}"),
                source,
            })?;

        Ok(detail)
    }

    async fn get_text(&self, url: &str) -> Result<String, RetailError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RetailError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(RetailError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Build the colon-delimited facet query the search endpoint expects.
///
/// Catalog-wide sweeps sort by relevance; store-restricted sweeps sort by
/// name so pagination stays stable while shelves mutate. Alcohol-free
/// categories live one level down in the facet tree.
fn build_query(category: &beerdb_core::CategoryQuery, store_id: Option<i32>) -> String {
    let sort = if store_id.is_some() {
        "name-asc"
    } else {
        "relevance"
    };

    let mut query = if category.alcohol_free {
        format!(
            ":{sort}:visibleInSearch:true:mainCategory:alkoholfritt:mainSubCategory:{}:",
            category.token
        )
    } else {
        format!(":{sort}:visibleInSearch:true:mainCategory:{}:", category.token)
    };

    if let Some(store) = store_id {
        query.push_str(&format!("availableInStores:{store}:"));
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use beerdb_core::CategoryQuery;

    fn category(token: &str, alcohol_free: bool) -> CategoryQuery {
        CategoryQuery {
            token: token.to_string(),
            alcohol_free,
        }
    }

    #[test]
    fn catalog_query_uses_relevance_sort() {
        let q = build_query(&category("øl", false), None);
        assert_eq!(q, ":relevance:visibleInSearch:true:mainCategory:øl:");
    }

    #[test]
    fn alcohol_free_query_nests_under_main_category() {
        let q = build_query(&category("alkoholfritt_alkoholfritt_øl", true), None);
        assert_eq!(
            q,
            ":relevance:visibleInSearch:true:mainCategory:alkoholfritt:mainSubCategory:alkoholfritt_alkoholfritt_øl:"
        );
    }

    #[test]
    fn store_query_sorts_by_name_and_appends_store() {
        let q = build_query(&category("sider", false), Some(160));
        assert_eq!(
            q,
            ":name-asc:visibleInSearch:true:mainCategory:sider:availableInStores:160:"
        );
    }
}
