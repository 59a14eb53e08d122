//! Live catalog-sync tests: a mocked retailer in front of a real,
//! fully-migrated Postgres database via `#[sqlx::test]`. The `migrations`
//! path is relative to the crate root (`crates/beerdb-retail/`), so
//! `"../../migrations"` resolves to the workspace migration directory.

use beerdb_core::CategoryQuery;
use beerdb_retail::RetailClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> RetailClient {
    RetailClient::new(base_url, base_url, 30, "beerdb-test/0.1")
        .expect("client construction should not fail")
}

fn category(token: &str) -> CategoryQuery {
    CategoryQuery {
        token: token.to_string(),
        alcohol_free: false,
    }
}

fn facet_query(token: &str) -> String {
    format!(":relevance:visibleInSearch:true:mainCategory:{token}:")
}

fn single_product_page(code: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "productCategorySearchPage": {
            "products": [
                {
                    "code": code,
                    "name": name,
                    "main_category": { "name": "Sider" },
                    "main_country": { "name": "Norge" },
                    "price": { "value": 74.9 },
                    "volume": { "value": 33.0 },
                    "product_selection": "Basisutvalget",
                    "url": format!("/Land/Norge/{name}/p/{code}")
                }
            ],
            "pagination": { "totalPages": 1 },
            "facets": []
        }
    })
}

#[sqlx::test(migrations = "../../migrations")]
async fn category_failure_does_not_abort_later_categories(pool: sqlx::PgPool) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/search/"))
        .and(query_param("query", facet_query("øl")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/search/"))
        .and(query_param("query", facet_query("sider")))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_product_page("555", "Eplegaarden Tørr")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let categories = vec![category("øl"), category("sider")];

    let summary = beerdb_retail::sync_catalog(&pool, &client, &categories).await;

    assert_eq!(summary.skipped, 1, "failed category counts as one skip");
    assert_eq!(summary.created, 1, "healthy category must still be swept");

    let row = beerdb_db::get_product(&pool, 555)
        .await
        .expect("get_product failed")
        .expect("product from healthy category should exist");
    assert_eq!(row.name, "Eplegaarden Tørr");
    assert!(row.active);
}
