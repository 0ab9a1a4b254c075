//! The full lens, wired end to end.
//!
//! One call takes a raw user-supplied URL through normalization, the
//! HTTP fetch and metadata extraction. Errors surface already typed;
//! nothing downstream reclassifies them.

use tracing::debug;

use crate::error::Result;
use crate::extract::{extract_metadata, ExtractorConfig, PageMetadata};
use crate::fetch::Fetcher;
use crate::url_norm::{normalize_url_scheme, NormalizedUrl};

/// Normalize, fetch, extract.
#[derive(Clone, Default)]
pub struct Pipeline {
    fetcher: Fetcher,
    extractor: ExtractorConfig,
}

impl Pipeline {
    pub fn new() -> Pipeline {
        Pipeline::default()
    }

    /// A pipeline with a non-default extractor configuration.
    pub fn with_extractor(extractor: ExtractorConfig) -> Pipeline {
        Pipeline {
            fetcher: Fetcher::new(),
            extractor,
        }
    }

    /// Normalize `raw_url` without fetching anything.
    pub fn resolve(&self, raw_url: &str) -> Result<NormalizedUrl> {
        normalize_url_scheme(raw_url)
    }

    /// Fetch `raw_url` and distill its metadata record.
    pub async fn run(&self, raw_url: &str) -> Result<PageMetadata> {
        let normalized = normalize_url_scheme(raw_url)?;
        debug!(raw = raw_url, url = %normalized, "running metadata pipeline");
        let html = self.fetcher.fetch_html(&normalized).await?;
        extract_metadata(&html, &normalized, &self.extractor)
    }
}
