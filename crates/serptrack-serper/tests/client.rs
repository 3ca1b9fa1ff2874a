//! Integration tests for `SerperClient` using wiremock HTTP mocks.

use serptrack_serper::{SerperClient, SerperError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> SerperClient {
    SerperClient::with_base_url("test-key", 30, base_url)
        .expect("client construction should not fail")
}

fn organic_body(count: usize) -> serde_json::Value {
    let organic: Vec<serde_json::Value> = (1..=count)
        .map(|p| {
            serde_json::json!({
                "title": format!("Result {p}"),
                "link": format!("https://example.com/{p}"),
                "snippet": "…",
                "position": p
            })
        })
        .collect();
    serde_json::json!({
        "searchParameters": { "q": "shoes", "gl": "gb", "type": "search" },
        "organic": organic,
        "credits": 1
    })
}

#[tokio::test]
async fn search_sends_uk_locale_params_and_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("X-API-KEY", "test-key"))
        .and(body_json(serde_json::json!({
            "q": "running shoes",
            "gl": "gb",
            "location": "United Kingdom",
            "hl": "en"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(organic_body(3)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let response = client
        .search("running shoes")
        .await
        .expect("search should succeed");

    assert_eq!(response.organic.len(), 3);
    assert_eq!(response.organic[0].position, 1);
    assert_eq!(response.organic[2].link, "https://example.com/3");
}

#[tokio::test]
async fn search_with_missing_organic_returns_empty_vec() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "searchParameters": { "q": "no results term" },
            "credits": 1
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let response = client
        .search("no results term")
        .await
        .expect("zero results is not an error");

    assert!(response.organic.is_empty());
}

#[tokio::test]
async fn search_surfaces_non_2xx_as_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .search("forbidden keyword")
        .await
        .expect_err("403 should be an error");

    assert!(err.to_string().contains("403"));
    match err {
        SerperError::Status { status, keyword } => {
            assert_eq!(status, 403);
            assert_eq!(keyword, "forbidden keyword");
        }
        other => panic!("expected Status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn search_surfaces_bad_body_as_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .search("shoes")
        .await
        .expect_err("unparseable body should be an error");

    assert!(matches!(err, SerperError::Deserialize { .. }));
}
