//! Brave Search adapter tests against a mocked HTTP backend.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use colloquy_engine::{
    BraveSearch, BraveSearchConfig, ImageSearch, ProviderError, SafeSearch, SearchOptions,
    TextSearch,
};

fn client_for(server: &MockServer) -> BraveSearch {
    BraveSearch::new(
        BraveSearchConfig::new("test_token")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_secs(2)),
    )
    .unwrap()
}

fn options() -> SearchOptions {
    SearchOptions {
        max_results: 5,
        safesearch: SafeSearch::Strict,
        region: "wt-wt".to_string(),
    }
}

#[tokio::test]
async fn test_web_search_sends_expected_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .and(header("x-subscription-token", "test_token"))
        .and(query_param("q", "moon landing 1969"))
        .and(query_param("count", "5"))
        .and(query_param("safesearch", "strict"))
        .and(query_param("country", "ALL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "search",
            "web": {"results": [
                {"title": "Moon landing", "url": "https://en.wikipedia.org/wiki/Moon_landing",
                 "description": "Apollo 11 landed in July 1969."}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let hits = client.search("moon landing 1969", &options()).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Moon landing");
    assert_eq!(hits[0].snippet, "Apollo 11 landed in July 1969.");
    assert_eq!(hits[0].url, "https://en.wikipedia.org/wiki/Moon_landing");
}

#[tokio::test]
async fn test_web_search_truncates_to_max_results() {
    let server = MockServer::start().await;
    let results: Vec<_> = (0..8)
        .map(|i| {
            json!({"title": format!("r{i}"), "url": format!("https://example.com/{i}"), "description": ""})
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"web": {"results": results}})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let hits = client
        .search(
            "anything",
            &SearchOptions {
                max_results: 3,
                ..options()
            },
        )
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn test_web_search_empty_section_is_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "search"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let hits = client.search("nothing", &options()).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_image_search_maps_full_size_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/images/search"))
        .and(query_param("safesearch", "strict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"title": "Solar array", "url": "https://example.com/page",
                 "properties": {"url": "https://img.example.com/full.jpg"},
                 "thumbnail": {"src": "https://img.example.com/thumb.jpg"}},
                {"title": "No usable url", "properties": {"url": ""}}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let hits = client.search_images("solar array", &options()).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].image_url, "https://img.example.com/full.jpg");
    assert_eq!(hits[0].source_url.as_deref(), Some("https://example.com/page"));
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.search("q", &options()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Auth(_)));
}

#[tokio::test]
async fn test_server_error_maps_to_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/images/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.search_images("q", &options()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
}

#[tokio::test]
async fn test_undecodable_body_maps_to_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.search("q", &options()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Malformed(_)));
}

#[tokio::test]
async fn test_slow_response_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"web": {"results": []}}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client = BraveSearch::new(
        BraveSearchConfig::new("test_token")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(50)),
    )
    .unwrap();

    let err = client.search("q", &options()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Timeout(_)));
}
