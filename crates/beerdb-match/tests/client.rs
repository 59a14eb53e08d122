//! Integration tests for `CommunityClient` using wiremock HTTP mocks.

use beerdb_match::{CommunityClient, MatchError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> CommunityClient {
    CommunityClient::new(base_url, 30, "beerdb-test/0.1")
        .expect("client construction should not fail")
}

#[tokio::test]
async fn search_parses_result_items() {
    let server = MockServer::start().await;

    let html = r#"
        <div class="beer-item">
          <p class="name"><a href="/b/lervig-supersonic/2716064">Lervig Supersonic</a></p>
        </div>
    "#;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Lervig Supersonic"))
        .and(query_param("type", "beer"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let candidates = client
        .search("Lervig Supersonic")
        .await
        .expect("should parse search page");

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].name, "Lervig Supersonic");
    assert_eq!(
        candidates[0].url,
        format!("{}/b/lervig-supersonic/2716064", server.uri())
    );
}

#[tokio::test]
async fn search_with_no_results_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let candidates = client.search("nothing").await.expect("should fetch page");

    assert!(candidates.is_empty());
}

#[tokio::test]
async fn missing_page_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/b/gone/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.fetch_page("/b/gone/1").await.unwrap_err();

    assert!(matches!(err, MatchError::NotFound { .. }));
}

#[tokio::test]
async fn resolve_url_follows_redirects() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/s/abc"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", "/b/lervig-supersonic/2716064"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b/lervig-supersonic/2716064"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let resolved = client.resolve_url("/s/abc").await;

    assert_eq!(
        resolved,
        format!("{}/b/lervig-supersonic/2716064", server.uri())
    );
}

#[tokio::test]
async fn resolve_url_keeps_unreachable_urls_as_is() {
    let client = test_client("http://127.0.0.1:1");
    let resolved = client.resolve_url("http://127.0.0.1:1/s/dead").await;

    assert_eq!(resolved, "http://127.0.0.1:1/s/dead");
}
