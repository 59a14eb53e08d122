//! Integration tests for `RetailClient` using wiremock HTTP mocks.

use beerdb_core::CategoryQuery;
use beerdb_retail::{RetailClient, RetailError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> RetailClient {
    RetailClient::new(base_url, base_url, 30, "beerdb-test/0.1")
        .expect("client construction should not fail")
}

fn beer_category() -> CategoryQuery {
    CategoryQuery {
        token: "øl".to_string(),
        alcohol_free: false,
    }
}

#[tokio::test]
async fn search_page_parses_current_generation() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "productCategorySearchPage": {
            "products": [
                {
                    "code": "14962702",
                    "name": "Lervig Supersonic",
                    "main_category": { "name": "Øl" },
                    "main_sub_category": { "name": "India pale ale" },
                    "main_country": { "name": "Norge" },
                    "price": { "value": 89.9 },
                    "volume": { "value": 50.0 },
                    "product_selection": "Bestillingsutvalget",
                    "url": "/Land/Norge/Lervig-Supersonic/p/14962702"
                }
            ],
            "pagination": { "totalPages": 3 },
            "facets": []
        }
    });

    Mock::given(method("GET"))
        .and(path("/products/search/"))
        .and(query_param("currentPage", "0"))
        .and(query_param("pageSize", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .search_page(&beer_category(), 0, None)
        .await
        .expect("should parse search page");

    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.products.len(), 1);
    assert_eq!(page.products[0].code, "14962702");
    assert_eq!(page.products[0].name, "Lervig Supersonic");
}

#[tokio::test]
async fn search_page_parses_older_generation_keys() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "productSearchResult": {
            "products": [
                {
                    "code": "123",
                    "name": "Old Shape Pils",
                    "mainCategory": { "name": "Øl" },
                    "price": { "value": "59,90" },
                    "volume": { "value": 33.0 }
                }
            ],
            "pagination": { "total_pages": 1 }
        }
    });

    Mock::given(method("GET"))
        .and(path("/products/search/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .search_page(&beer_category(), 0, None)
        .await
        .expect("should parse older payload shape");

    assert_eq!(page.pagination.total_pages, 1);
    let product = &page.products[0];
    assert_eq!(product.main_category.as_ref().unwrap().name, "Øl");
    assert!((product.price.as_ref().unwrap().value - 59.9).abs() < 1e-9);
}

#[tokio::test]
async fn list_store_codes_reads_first_facet() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "productCategorySearchPage": {
            "products": [],
            "pagination": { "totalPages": 0 },
            "facets": [
                { "values": [ { "code": "160" }, { "code": "143" } ] },
                { "values": [ { "code": "not-a-store" } ] }
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/products/search/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let codes = client
        .list_store_codes()
        .await
        .expect("should parse store facet");

    assert_eq!(codes, vec!["160".to_string(), "143".to_string()]);
}

#[tokio::test]
async fn store_details_unwraps_point_of_service() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "pointOfService": {
            "displayName": "Oslo, Briskeby",
            "address": {
                "line1": "Briskebyveien 48",
                "postalCode": "0259",
                "town": "Oslo"
            },
            "assortment": "Kategori 6",
            "geoPoint": { "latitude": 59.92, "longitude": 10.71 }
        }
    });

    Mock::given(method("GET"))
        .and(path("/stores/160"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let store = client
        .store_details("160")
        .await
        .expect("should parse store details");

    assert_eq!(store.display_name, "Oslo, Briskeby");
    assert_eq!(store.address.postal_code.as_deref(), Some("0259"));
    assert!((store.geo_point.latitude - 59.92).abs() < 1e-9);
}

#[tokio::test]
async fn product_by_id_accepts_wrapped_document() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "product": {
            "code": "999",
            "name": "Wrapped Stout",
            "price": { "value": 120.0 },
            "volume": { "value": 37.5 }
        }
    });

    Mock::given(method("GET"))
        .and(path("/products/999"))
        .and(query_param("fields", "FULL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let product = client
        .product_by_id(999)
        .await
        .expect("should unwrap product document");

    assert_eq!(product.code, "999");
    assert_eq!(product.name, "Wrapped Stout");
}

#[tokio::test]
async fn missing_product_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/404404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.product_by_id(404404).await.unwrap_err();

    assert!(matches!(err, RetailError::NotFound { .. }));
}

#[tokio::test]
async fn server_error_maps_to_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/search/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .search_page(&beer_category(), 0, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RetailError::UnexpectedStatus { status: 503, .. }
    ));
}
