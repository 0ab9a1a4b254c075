// Copyright 2026 Metalens Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST API for Metalens.
//!
//! Provides the JSON metadata endpoint and the preview page over one
//! axum router. Typed errors convert straight into wire responses
//! through their [`IntoResponse`] impl, so every handler can bubble
//! them with `?`.

use crate::error::MetalensError;
use crate::extract::{MetaTagKind, OpenGraphKind};
use crate::server::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/metadata", get(metadata_get).post(metadata_post))
        .layer(cors)
        .with_state(state)
}

// ── Handlers ────────────────────────────────────────────────────

/// Serve the preview page resolved at startup.
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.page.clone())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(serde::Deserialize, Default)]
struct MetadataParams {
    url: Option<String>,
}

#[derive(serde::Deserialize)]
struct MetadataBody {
    url: Option<String>,
}

/// `GET /api/metadata?url=…`
async fn metadata_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MetadataParams>,
) -> Response {
    // An empty url is as missing as an absent one.
    match params.url.filter(|u| !u.is_empty()) {
        Some(url) => lookup(&state, &url).await.into_response(),
        None => missing_url(),
    }
}

/// `POST /api/metadata` with a `{"url": …}` body.
async fn metadata_post(
    State(state): State<Arc<AppState>>,
    body: Result<Json<MetadataBody>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid request format" })),
        )
            .into_response();
    };
    match body.url.filter(|u| !u.is_empty()) {
        Some(url) => lookup(&state, &url).await.into_response(),
        None => missing_url(),
    }
}

/// Run the pipeline and shape the wire response.
///
/// The convenience fields surface the usual link-preview projection;
/// the full record rides along under `metadata`.
async fn lookup(state: &AppState, raw_url: &str) -> Result<Json<Value>, MetalensError> {
    let metadata = state.pipeline.run(raw_url).await?;

    let description = metadata
        .og(OpenGraphKind::Description)
        .or_else(|| metadata.meta_tag(MetaTagKind::Description))
        .unwrap_or_default();
    let image = metadata.og(OpenGraphKind::Image).unwrap_or_default();
    let url = metadata.og(OpenGraphKind::Url).unwrap_or(raw_url);

    Ok(Json(json!({
        "title": metadata.title,
        "description": description,
        "image": image,
        "url": url,
        "metadata": metadata,
    })))
}

/// A request that never named a URL. Plain 400, no `errorType`.
fn missing_url() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "URL is required" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_missing_url_response() {
        let response = missing_url();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "URL is required" }));
    }
}
