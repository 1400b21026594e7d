//! Header layering, configuration setters and failure classification on the wire.

mod common;

use common::{MockServerFixture, TEST_API_KEY};
use mockito::Matcher;
use rag_kb_sdk::{ClientConfig, Error, RagClient};
use reqwest::Method;
use serde_json::json;
use std::collections::HashMap;

#[tokio::test]
async fn extra_headers_and_credential_are_sent() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/api/items")
        .match_header("x-api-key", TEST_API_KEY)
        .match_header("x-tenant", "acme")
        .match_header("x-request-id", Matcher::Regex("^[0-9a-f-]{36}$".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = fixture.client();
    client.set_header("X-Tenant", "acme");
    assert!(client.list_items().await.unwrap().is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn header_set_twice_in_different_case_sends_latest_value() {
    let mut fixture = MockServerFixture::new().await;
    let latest = fixture
        .server
        .mock("GET", "/api/items")
        .match_header("x-tenant", "new")
        .with_status(200)
        .with_body("[]")
        .expect(20)
        .create_async()
        .await;
    let stale = fixture
        .server
        .mock("GET", "/api/items")
        .match_header("x-tenant", "old")
        .with_status(500)
        .expect(0)
        .create_async()
        .await;

    let client = fixture.client();
    client.set_header("X-Tenant", "old");
    client.set_header("x-tenant", "new");
    assert_eq!(client.config().headers.len(), 1);
    for _ in 0..20 {
        client.list_items().await.unwrap();
    }

    latest.assert_async().await;
    stale.assert_async().await;
}

#[tokio::test]
async fn content_type_can_be_overridden_per_instance() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/api/rag/chat")
        .match_header("content-type", "application/vnd.kb+json")
        .with_status(200)
        .with_body(r#"{"reply":"ok"}"#)
        .create_async()
        .await;

    let config = ClientConfig::new(fixture.base_url.clone())
        .with_header("Content-Type", "application/vnd.kb+json");
    let client = RagClient::new(config).unwrap();
    client
        .rag_chat(&rag_kb_sdk::ChatRequest::new("hi"))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn credential_is_absent_until_set_and_then_sticks() {
    let mut fixture = MockServerFixture::new().await;
    let anonymous = fixture
        .server
        .mock("GET", "/api/items")
        .match_header("x-api-key", Matcher::Missing)
        .with_status(401)
        .with_body(r#"{"error":"missing api key"}"#)
        .expect(1)
        .create_async()
        .await;
    let authed = fixture
        .server
        .mock("GET", "/api/items")
        .match_header("x-api-key", "late-key")
        .with_status(200)
        .with_body("[]")
        .expect(2)
        .create_async()
        .await;

    let client = RagClient::new(ClientConfig::new(fixture.base_url.clone())).unwrap();
    let err = client.list_items().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    client.set_api_key("late-key");
    client.list_items().await.unwrap();
    client.list_items().await.unwrap();

    anonymous.assert_async().await;
    authed.assert_async().await;
}

#[tokio::test]
async fn per_call_headers_override_defaults() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/api/rag/feedback")
        .match_header("x-tenant", "per-call")
        .match_header("x-request-id", "trace-1")
        .match_body(Matcher::Json(json!({"rating": 5})))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    let client = fixture.client();
    client.set_header("X-Tenant", "instance");
    let mut headers = HashMap::new();
    headers.insert("x-tenant".to_string(), "per-call".to_string());
    headers.insert("X-Request-Id".to_string(), "trace-1".to_string());

    let value = client
        .call(
            Method::POST,
            "/api/rag/feedback",
            Some(&headers),
            Some(&json!({"rating": 5})),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(value, json!({"ok": true}));
}

#[tokio::test]
async fn non_json_error_body_is_kept_as_text() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("GET", "/api/items")
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let err = fixture.client().list_items().await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.message(), "HTTP 502");
    assert_eq!(err.payload(), Some(&json!("Bad Gateway")));
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = RagClient::builder()
        .base_url(format!("http://127.0.0.1:{}", port))
        .build()
        .unwrap();
    let err = client.list_items().await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.status(), None);
    assert!(err.payload().is_none());
    assert!(std::error::Error::source(&err).is_some());
    assert!(!err.message().is_empty());
}

#[tokio::test]
async fn base_url_change_redirects_requests() {
    let mut first = MockServerFixture::new().await;
    let mut second = MockServerFixture::new().await;
    let unused = first.mock_unreachable("GET", "/api/items").await;
    let used = second.mock_json("GET", "/api/items", 200, json!([])).await;

    let client = first.client();
    client.set_base_url(second.base_url.clone()).unwrap();
    client.list_items().await.unwrap();

    unused.assert_async().await;
    used.assert_async().await;
}
