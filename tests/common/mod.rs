// Each integration test file is a separate binary; helpers not used in every
// binary would otherwise trigger dead_code warnings from clippy.
#![allow(dead_code)]

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use link_manager::{
    db::LinkStore,
    extractor::{ExtractorSettings, MetadataExtractor},
    state::AppState,
};

pub const TEST_PLACEHOLDER: &str = "https://placeholder.test/none.png";

/// Extractor settings with a short timeout and a recognisable placeholder.
pub fn test_settings() -> ExtractorSettings {
    ExtractorSettings {
        timeout: Duration::from_secs(2),
        placeholder_image_url: TEST_PLACEHOLDER.to_string(),
        ..ExtractorSettings::default()
    }
}

pub fn test_extractor() -> MetadataExtractor {
    MetadataExtractor::new(test_settings()).expect("Failed to build test extractor")
}

/// A fresh in-memory store. Every test gets its own database.
pub async fn test_store() -> LinkStore {
    LinkStore::in_memory()
        .await
        .expect("Failed to open in-memory store")
}

/// Build the application router wired to `store`.
pub fn create_test_app(store: LinkStore) -> Router {
    link_manager::app(AppState::new(store, test_extractor()))
}

// ── Upstream page helpers ────────────────────────────────────────────────────

/// Serve `html` at `route` on a fresh mock server and return the server.
pub async fn serve_page(route: &str, html: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.to_owned(), "text/html"))
        .mount(&server)
        .await;
    server
}

/// Serve a bare status code at `route`.
pub async fn serve_status(route: &str, status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

pub fn og_page(title: &str, description: &str, image: &str) -> String {
    format!(
        r#"<!doctype html><html><head>
            <title>Fallback title</title>
            <meta property="og:title" content="{title}"/>
            <meta property="og:description" content="{description}"/>
            <meta property="og:image" content="{image}"/>
        </head><body><p>content</p></body></html>"#
    )
}

pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|r| r.len())
        .unwrap_or(0)
}

// ── Request helpers ──────────────────────────────────────────────────────────

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// ── Scenario helpers ─────────────────────────────────────────────────────────

/// Add a link through the API and return the saved record.
pub async fn add_link(app: Router, url: &str) -> Value {
    let (status, body) = post_json(app, "/links", serde_json::json!({ "url": url })).await;
    assert_eq!(status, StatusCode::CREATED, "setup add_link failed: {body}");
    body
}

/// Percent-encode a URL for use in a query string.
pub fn encode(url: &str) -> String {
    url::form_urlencoded::byte_serialize(url.as_bytes()).collect()
}
