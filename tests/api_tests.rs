//! End-to-end tests for the REST API.
//!
//! Requests go through the real router and pipeline; the origin being
//! fetched is a wiremock server so every upstream behavior is scripted.

use std::sync::Arc;

use assert_json_diff::assert_json_include;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use metalens::pipeline::Pipeline;
use metalens::rest;
use metalens::server::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>  The Rust Programming Language  </title>
  <meta name="description" content="A language empowering everyone to build reliable software.">
  <meta name="keywords" content="rust, systems, programming">
  <meta name="author" content="The Rust Team">
  <meta property="og:title" content="Rust">
  <meta property="og:description" content="Reliable and efficient software">
  <meta property="og:image" content="https://example.com/rust.png">
  <meta property="og:type" content="website">
  <meta name="twitter:card" content="summary_large_image">
  <meta name="twitter:site" content="@rustlang">
  <link rel="canonical" href="https://example.com/canonical">
</head>
<body><h1>hi</h1></body>
</html>"#;

fn app() -> Router {
    let state = Arc::new(AppState {
        pipeline: Pipeline::new(),
        page: "<html><body>Metalens preview</body></html>".to_string(),
    });
    rest::router(state)
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(app: Router, uri: &str, body: &str) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn html_origin(route: &str) -> MockServer {
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(PAGE, "text/html; charset=utf-8"),
        )
        .mount(&origin)
        .await;
    origin
}

fn metadata_uri(target: &str) -> String {
    format!("/api/metadata?url={}", urlencoding::encode(target))
}

// ── Happy paths ──────────────────────────────────────────────────────────

#[tokio::test]
async fn metadata_get_returns_projection_and_full_record() {
    let origin = html_origin("/article").await;
    let target = format!("{}/article", origin.uri());

    let response = get(app(), &metadata_uri(&target)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_json_include!(
        actual: body,
        expected: json!({
            "title": "The Rust Programming Language",
            "description": "Reliable and efficient software",
            "image": "https://example.com/rust.png",
            "url": target,
            "metadata": {
                "title": "The Rust Programming Language",
                "meta": {
                    "description": "A language empowering everyone to build reliable software.",
                    "keywords": "rust, systems, programming",
                    "author": "The Rust Team",
                    "canonical": "https://example.com/canonical",
                },
                "openGraph": {
                    "og:title": "Rust",
                    "og:description": "Reliable and efficient software",
                    "og:image": "https://example.com/rust.png",
                    "og:type": "website",
                },
                "twitter": {
                    "twitter:card": "summary_large_image",
                    "twitter:site": "@rustlang",
                },
            },
        })
    );
}

#[tokio::test]
async fn metadata_post_accepts_url_in_body() {
    let origin = html_origin("/article").await;
    let target = format!("{}/article", origin.uri());

    let response = post_json(
        app(),
        "/api/metadata",
        &json!({ "url": target }).to_string(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["title"], "The Rust Programming Language");
    assert_eq!(body["metadata"]["openGraph"]["og:title"], "Rust");
}

#[tokio::test]
async fn projection_prefers_open_graph_description() {
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meta-only"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                "<html><head><title>T</title>\
                 <meta name=\"description\" content=\"plain description\">\
                 </head></html>",
                "text/html",
            ),
        )
        .mount(&origin)
        .await;
    let target = format!("{}/meta-only", origin.uri());

    let body = response_json(get(app(), &metadata_uri(&target)).await).await;
    // No og:description, so the meta description fills the slot.
    assert_eq!(body["description"], "plain description");
    assert_eq!(body["image"], "");
    // No canonical link either, so og:url was backfilled with the fetched URL.
    assert_eq!(body["url"], target);
    assert_eq!(body["metadata"]["openGraph"]["og:url"], target);
}

#[tokio::test]
async fn health_reports_version() {
    let response = get(app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn index_serves_the_preview_page() {
    let response = get(app(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"), "{content_type}");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("Metalens preview"));
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let allow = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|v| v.to_str().ok());
    assert_eq!(allow, Some("*"));
}

// ── Request validation ───────────────────────────────────────────────────

#[tokio::test]
async fn get_without_url_is_plain_bad_request() {
    let response = get(app(), "/api/metadata").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    // No errorType on this one; the request never got far enough to be typed.
    assert_eq!(body, json!({ "error": "URL is required" }));
}

#[tokio::test]
async fn get_with_empty_url_is_plain_bad_request() {
    let response = get(app(), "/api/metadata?url=").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    // An empty url never reaches the pipeline, so no errorType here either.
    assert_eq!(body, json!({ "error": "URL is required" }));
}

#[tokio::test]
async fn post_without_url_is_plain_bad_request() {
    let response = post_json(app(), "/api/metadata", "{}").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body, json!({ "error": "URL is required" }));
}

#[tokio::test]
async fn post_with_empty_url_is_plain_bad_request() {
    for body in [r#"{"url": ""}"#, r#"{"url": null}"#] {
        let response = post_json(app(), "/api/metadata", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json, json!({ "error": "URL is required" }), "{body}");
    }
}

#[tokio::test]
async fn malformed_post_body_is_rejected() {
    let response = post_json(app(), "/api/metadata", "{not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body, json!({ "error": "Invalid request format" }));
}

#[tokio::test]
async fn non_http_scheme_is_rejected_with_typed_error() {
    let response = get(app(), &metadata_uri("ftp://example.com/file")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["errorType"], "InvalidUrlError");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Invalid URL scheme"));
}

// ── Upstream failures ────────────────────────────────────────────────────

#[tokio::test]
async fn upstream_404_maps_to_not_found() {
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&origin)
        .await;
    let target = format!("{}/missing", origin.uri());

    let response = get(app(), &metadata_uri(&target)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert_eq!(body["errorType"], "NotFoundError");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("could not be found (404)"));
}

#[tokio::test]
async fn upstream_500_keeps_its_status() {
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/boom"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&origin)
        .await;
    let target = format!("{}/boom", origin.uri());

    let response = get(app(), &metadata_uri(&target)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response_json(response).await;
    assert_eq!(body["errorType"], "HttpError");
    assert_eq!(body["error"], "HTTP error: 500 Internal Server Error");
}

#[tokio::test]
async fn unknown_upstream_status_coerces_to_500() {
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teapot"))
        .respond_with(ResponseTemplate::new(418))
        .mount(&origin)
        .await;
    let target = format!("{}/teapot", origin.uri());

    let response = get(app(), &metadata_uri(&target)).await;
    // 418 is not part of the API's status vocabulary.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response_json(response).await;
    assert_eq!(body["errorType"], "HttpError");
    assert!(body["error"].as_str().unwrap().contains("418"));
}

#[tokio::test]
async fn non_html_content_type_is_unprocessable() {
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{\"not\": \"html\"}", "application/json"),
        )
        .mount(&origin)
        .await;
    let target = format!("{}/data.json", origin.uri());

    let response = get(app(), &metadata_uri(&target)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(body["errorType"], "ContentParsingError");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("expected text/html"));
}
