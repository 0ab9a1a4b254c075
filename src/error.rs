//! The closed error taxonomy and the single classification point.
//!
//! Every pipeline stage fails with one of these kinds. Raw transport
//! errors are classified exactly once, in [`classify`]; a value that is
//! already a [`MetalensError`] crosses every later boundary unchanged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

pub type Result<T> = std::result::Result<T, MetalensError>;

#[derive(Error, Debug)]
pub enum MetalensError {
    /// Unclassifiable failure; carries the original message.
    #[error("{message}")]
    Generic { message: String },

    /// Transport-level failure: timeout, refused or dropped connection.
    #[error("{message}")]
    Network { message: String },

    /// DNS resolution failed for the host.
    #[error("Domain not found: \"{url}\"")]
    DomainNotFound { url: String },

    /// Non-2xx response other than 404.
    #[error("HTTP error: {status} {status_text}")]
    Http { status: u16, status_text: String },

    /// The origin answered 404 for this URL.
    #[error("The URL \"{url}\" could not be found (404)")]
    NotFound { url: String },

    /// The URL is not usable: bad scheme or unparseable shape.
    #[error("{message}")]
    InvalidUrl { url: String, message: String },

    /// The response body is not parseable HTML (or not HTML at all).
    #[error("{message}")]
    ContentParsing { message: String },

    /// The document parsed but metadata could not be pulled out of it.
    #[error("{message}")]
    MetadataExtraction { message: String },
}

impl MetalensError {
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Network failure with no more specific detail available.
    pub fn network_default() -> Self {
        Self::network("Network error occurred while fetching the URL")
    }

    /// Network failure attributed to a specific URL.
    pub fn network_for(url: &str) -> Self {
        Self::network(format!("Network error: unable to connect to {url}"))
    }

    pub fn domain_not_found(url: impl Into<String>) -> Self {
        Self::DomainNotFound { url: url.into() }
    }

    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
        }
    }

    pub fn not_found(url: impl Into<String>) -> Self {
        Self::NotFound { url: url.into() }
    }

    /// The URL names a scheme other than HTTP/HTTPS.
    pub fn invalid_scheme(url: impl Into<String>) -> Self {
        let url = url.into();
        let message = format!(
            "Invalid URL scheme: only HTTP and HTTPS URLs are supported. Received: {url}"
        );
        Self::InvalidUrl { url, message }
    }

    /// The URL could not be parsed at all.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let message = format!("Invalid URL format: \"{url}\"");
        Self::InvalidUrl { url, message }
    }

    pub fn content_parsing(message: impl Into<String>) -> Self {
        Self::ContentParsing {
            message: message.into(),
        }
    }

    pub fn metadata_extraction(message: impl Into<String>) -> Self {
        Self::MetadataExtraction {
            message: message.into(),
        }
    }

    /// The kind name used as `errorType` in API error bodies.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Generic { .. } => "MetalensError",
            Self::Network { .. } => "NetworkError",
            Self::DomainNotFound { .. } => "DomainNotFoundError",
            Self::Http { .. } => "HttpError",
            Self::NotFound { .. } => "NotFoundError",
            Self::InvalidUrl { .. } => "InvalidUrlError",
            Self::ContentParsing { .. } => "ContentParsingError",
            Self::MetadataExtraction { .. } => "MetadataExtractionError",
        }
    }

    /// HTTP status the API reports for this kind.
    ///
    /// An upstream `Http` error keeps its own status only when it is one
    /// the API itself speaks (400/404/500/503); everything else becomes 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Network { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::DomainNotFound { .. } | Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
            Self::ContentParsing { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Http { status, .. } => match *status {
                400 | 404 | 500 | 503 => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Generic { .. } | Self::MetadataExtraction { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for MetalensError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!(kind = self.kind_name(), status = %status, "{self}");
        let body = json!({
            "error": self.to_string(),
            "errorType": self.kind_name(),
        });
        (status, Json(body)).into_response()
    }
}

// ── Classification ───────────────────────────────────────────────────────

/// Substring tables for message-level classification, checked in priority
/// order against the lowercased error text. First match wins.
const DNS_TOKENS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "nodename nor servname",
];
const TRANSPORT_TOKENS: &[&str] = &[
    "timed out",
    "connection refused",
    "connection reset",
    "connection aborted",
    "connection closed",
    "error sending request",
    "network error",
];
const URL_TOKENS: &[&str] = &[
    "relative url without a base",
    "invalid url",
    "builder error",
    "url scheme is not allowed",
    "empty host",
];
const PARSE_TOKENS: &[&str] = &["failed to extract text content", "parse", "decode"];

/// Classify a raw transport error against the URL being fetched.
///
/// Typed introspection runs first (timeouts, request-building failures);
/// everything else flattens the source chain into text and goes through
/// [`classify_message`].
pub fn classify(err: &reqwest::Error, url: &str) -> MetalensError {
    if err.is_timeout() {
        return MetalensError::network_for(url);
    }
    if err.is_builder() {
        return MetalensError::invalid_url(url);
    }

    let mut text = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    classify_message(&text, url)
}

/// Classify an error by its message text alone.
///
/// This owns the platform's message vocabulary; nothing else in the crate
/// matches on error strings.
pub fn classify_message(message: &str, url: &str) -> MetalensError {
    let haystack = message.to_lowercase();
    let matches_any = |tokens: &[&str]| tokens.iter().any(|t| haystack.contains(t));

    if matches_any(DNS_TOKENS) {
        MetalensError::domain_not_found(url)
    } else if matches_any(TRANSPORT_TOKENS) {
        MetalensError::network_for(url)
    } else if matches_any(URL_TOKENS) {
        MetalensError::invalid_url(url)
    } else if matches_any(PARSE_TOKENS) {
        MetalensError::content_parsing("Failed to parse website content")
    } else {
        MetalensError::generic(message)
    }
}
