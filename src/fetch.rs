//! HTML retrieval over HTTP(S).
//!
//! One GET per call, no retries. Transport failures go through the
//! classifier exactly once; status and content-type gates produce their
//! own typed kinds before the body is ever read.

use std::time::Duration;

use tracing::debug;

use crate::error::{classify, MetalensError, Result};
use crate::url_norm::NormalizedUrl;

/// User-agent announced on every fetch.
pub const USER_AGENT: &str = "MetalensBot/1.0 (+https://github.com/metalens/metalens)";

/// Accept header preferring HTML but tolerating anything.
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Hard ceiling on a single fetch, redirects and body included.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Redirect hop limit.
const MAX_REDIRECTS: usize = 10;

/// HTTP client configured for page-metadata fetches.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    pub fn new() -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(ACCEPT_HTML),
        );

        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// GET the URL and return the body when it is an HTML page.
    ///
    /// Checks run in order: transport (classified — DNS, refused, timeout,
    /// malformed URL), then status (`404` → [`MetalensError::NotFound`],
    /// other non-2xx → [`MetalensError::Http`]), then content-type (missing
    /// or non-`text/html` → [`MetalensError::ContentParsing`], body unread).
    pub async fn fetch_html(&self, url: &NormalizedUrl) -> Result<String> {
        debug!(url = url.as_str(), "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| classify(&e, url.as_str()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(MetalensError::not_found(url.as_str()));
        }
        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Failed to fetch content from {url}"));
            return Err(MetalensError::http(status.as_u16(), status_text));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if !matches!(content_type.as_deref(), Some(ct) if ct.contains("text/html")) {
            return Err(MetalensError::content_parsing(format!(
                "Invalid content type: expected text/html, received {} from {url}",
                content_type.as_deref().unwrap_or("none"),
            )));
        }

        response
            .text()
            .await
            .map_err(|e| classify(&e, url.as_str()))
    }
}
