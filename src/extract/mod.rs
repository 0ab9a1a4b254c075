//! Distill page metadata out of raw HTML.
//!
//! Two interchangeable harvesting backends feed one assembly pass:
//! [`Backend::Dom`] parses the document with the `scraper` crate,
//! [`Backend::Scan`] walks the raw markup with regular expressions.
//! Both produce the same `TagHarvest` shape; the assembly here applies
//! the vocabulary, duplicate-handling and retention rules, so the two
//! backends agree on well-formed documents.

mod dom;
mod scan;
mod vocab;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::url_norm::NormalizedUrl;

pub use vocab::{MetaTagKind, OpenGraphKind, TwitterKind};

/// Fallback title when a page offers no usable candidate.
const NO_TITLE: &str = "No title found";

/// Property namespaces that belong to the Open Graph protocol.
const OPEN_GRAPH_PREFIXES: [&str; 4] = ["og:", "article:", "profile:", "book:"];

// ── Record ──────────────────────────────────────────────────────────────────

/// The metadata record distilled from one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Resolved page title, never empty. Falls back through `og:title`
    /// and `twitter:title` to `"No title found"`.
    pub title: String,
    /// Standard meta tags, including the canonical link URL.
    pub meta: BTreeMap<MetaTagKind, String>,
    /// Open Graph properties.
    #[serde(rename = "openGraph")]
    pub open_graph: BTreeMap<OpenGraphKind, String>,
    /// Twitter card tags.
    pub twitter: BTreeMap<TwitterKind, String>,
    /// Namespaced keys outside the vocabularies, kept only under
    /// [`UnknownKeys::Retain`].
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub unrecognized: BTreeMap<String, String>,
}

impl PageMetadata {
    /// The value of a standard meta tag, if present.
    pub fn meta_tag(&self, kind: MetaTagKind) -> Option<&str> {
        self.meta.get(&kind).map(String::as_str)
    }

    /// The value of an Open Graph property, if present.
    pub fn og(&self, kind: OpenGraphKind) -> Option<&str> {
        self.open_graph.get(&kind).map(String::as_str)
    }

    /// The value of a Twitter card tag, if present.
    pub fn twitter(&self, kind: TwitterKind) -> Option<&str> {
        self.twitter.get(&kind).map(String::as_str)
    }
}

// ── Configuration ───────────────────────────────────────────────────────────

/// How `extract_metadata` harvests and filters tags.
#[derive(Debug, Clone, Default)]
pub struct ExtractorConfig {
    pub backend: Backend,
    pub unknown_keys: UnknownKeys,
}

/// Which harvesting backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// CSS selectors over a parsed document.
    #[default]
    Dom,
    /// Regex scan of the raw markup, for contexts where building a DOM
    /// is unwanted.
    Scan,
}

/// What happens to namespaced keys outside the closed vocabularies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Discard them.
    #[default]
    Drop,
    /// Keep them in `PageMetadata::unrecognized` under their raw key.
    Retain,
}

// ── Harvest ─────────────────────────────────────────────────────────────────

/// Raw tag values in document order, before any vocabulary or duplicate
/// rules apply. Values are entity-decoded, untrimmed.
#[derive(Debug, Default)]
pub(crate) struct TagHarvest {
    /// Text of the first `<title>` element.
    pub(crate) title: Option<String>,
    /// `href` of the first `<link rel="canonical">` element that has one.
    pub(crate) canonical: Option<String>,
    /// `(name, content)` pairs from `<meta name>` tags.
    pub(crate) named: Vec<(String, String)>,
    /// `(property, content)` pairs from `<meta property>` tags.
    pub(crate) properties: Vec<(String, String)>,
}

// ── Extraction ──────────────────────────────────────────────────────────────

/// Extract the metadata record from `html`.
///
/// `url` is the normalized URL the document was fetched from; it backs
/// the `og:url` slot when the page declares neither `og:url` nor a
/// canonical link.
pub fn extract_metadata(
    html: &str,
    url: &NormalizedUrl,
    config: &ExtractorConfig,
) -> Result<PageMetadata> {
    debug!(backend = ?config.backend, url = %url, "extracting page metadata");
    let harvest = match config.backend {
        Backend::Dom => dom::harvest(html),
        Backend::Scan => scan::harvest(html),
    };
    Ok(assemble(harvest, url, config))
}

fn assemble(harvest: TagHarvest, url: &NormalizedUrl, config: &ExtractorConfig) -> PageMetadata {
    let title = resolve_title(&harvest);

    let mut meta = BTreeMap::new();
    let mut open_graph = BTreeMap::new();
    let mut twitter = BTreeMap::new();
    let mut unrecognized = BTreeMap::new();
    let retain = config.unknown_keys == UnknownKeys::Retain;

    // Repeated keys overwrite, so the last occurrence in document order
    // wins. Empty values leave the slot untouched.
    for (name, content) in harvest.named {
        if content.is_empty() {
            continue;
        }
        if name.starts_with("twitter:") {
            match TwitterKind::from_key(&name) {
                Some(kind) => {
                    twitter.insert(kind, content);
                }
                None if retain => {
                    unrecognized.insert(name, content);
                }
                None => {}
            }
        } else if let Some(kind) = MetaTagKind::from_key(&name) {
            // canonical belongs to the link tag, never a meta tag
            if kind != MetaTagKind::Canonical {
                meta.insert(kind, content);
            }
        }
    }

    for (property, content) in harvest.properties {
        if content.is_empty() || !open_graph_family(&property) {
            continue;
        }
        match OpenGraphKind::from_key(&property) {
            Some(kind) => {
                open_graph.insert(kind, content);
            }
            None if retain => {
                unrecognized.insert(property, content);
            }
            None => {}
        }
    }

    if let Some(href) = harvest.canonical.filter(|h| !h.is_empty()) {
        meta.insert(MetaTagKind::Canonical, href);
    }

    // A page that names neither its og:url nor a canonical link still
    // gets a resolvable URL: the one it was fetched from.
    if !open_graph.contains_key(&OpenGraphKind::Url)
        && !meta.contains_key(&MetaTagKind::Canonical)
    {
        open_graph.insert(OpenGraphKind::Url, url.as_str().to_string());
    }

    PageMetadata {
        title,
        meta,
        open_graph,
        twitter,
        unrecognized,
    }
}

/// First non-empty candidate of: `<title>` text, the first `og:title`,
/// the first `twitter:title`. Candidates are trimmed; map values are
/// not.
fn resolve_title(harvest: &TagHarvest) -> String {
    let candidates = [
        harvest.title.as_deref(),
        first_value(&harvest.properties, "og:title"),
        first_value(&harvest.named, "twitter:title"),
    ];
    for candidate in candidates.into_iter().flatten() {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    NO_TITLE.to_string()
}

fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn open_graph_family(key: &str) -> bool {
    OPEN_GRAPH_PREFIXES.iter().any(|p| key.starts_with(p))
}
