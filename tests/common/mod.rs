//! Mock HTTP server setup for integration tests
#![allow(dead_code)]

use mockito::{Matcher, Mock, Server, ServerGuard};
use rag_kb_sdk::RagClient;
use serde_json::Value;

pub const TEST_API_KEY: &str = "test-key";

/// Test fixture that owns a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Client pointed at the mock server, carrying the test credential
    pub fn client(&self) -> RagClient {
        RagClient::builder()
            .base_url(&self.base_url)
            .api_key(TEST_API_KEY)
            .build()
            .expect("mock client builds")
    }

    /// Mock any method/path answering with a JSON body
    pub async fn mock_json(&mut self, method: &str, path: &str, status: usize, body: Value) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Mock that must never be hit
    pub async fn mock_unreachable(&mut self, method: &str, path: &str) -> Mock {
        self.server
            .mock(method, path)
            .with_status(500)
            .expect(0)
            .create_async()
            .await
    }

    /// Mock a `text/event-stream` response made of the given SSE frames
    pub async fn mock_sse_stream(&mut self, path: &str, frames: Vec<&str>) -> Mock {
        let body = frames
            .iter()
            .map(|frame| {
                if frame.starts_with("data:") || frame.starts_with("event:") {
                    format!("{}\n\n", frame)
                } else {
                    format!("data: {}\n\n", frame)
                }
            })
            .collect::<Vec<_>>()
            .join("");

        self.server
            .mock("GET", path)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await
    }
}
