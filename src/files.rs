//! Saving and loading metadata records as JSON files.
//!
//! Filenames derive from the URL the record came from, shaped as
//! `<host>_<descriptor>.json` where the descriptor joins the path,
//! query and fragment, or falls back to `_root` for a bare host.

use std::path::Path;

use anyhow::Context;
use url::Url;

use crate::error::{MetalensError, Result};
use crate::extract::PageMetadata;
use crate::url_norm::normalize_url_scheme;

/// Derive a JSON filename from a URL.
///
/// The URL is normalized first, so scheme repair and defaulting apply
/// here too. Fails with `InvalidUrl` when the normalized form still
/// does not parse.
pub fn parse_url_for_filename(raw_url: &str) -> Result<String> {
    let normalized = normalize_url_scheme(raw_url)?;
    let parsed = Url::parse(normalized.as_str())
        .map_err(|_| MetalensError::invalid_url(normalized.as_str()))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| MetalensError::invalid_url(normalized.as_str()))?;

    let path = parsed.path().trim_matches('/');
    let query = parsed.query().unwrap_or_default();
    let fragment = parsed.fragment().unwrap_or_default();

    let mut parts: Vec<&str> = Vec::new();
    if !path.is_empty() {
        parts.push(path);
    }
    if !query.is_empty() {
        parts.push(query);
    }
    if !fragment.is_empty() {
        parts.push(fragment);
    }

    let descriptor = if parts.is_empty() {
        "_root".to_string()
    } else {
        sanitize_component(&parts.join("_"))
    };

    Ok(format!("{host}_{descriptor}.json"))
}

/// The default name offered when saving a fetched record.
pub fn default_save_name(raw_url: &str) -> Result<String> {
    let base = parse_url_for_filename(raw_url)?;
    let stem = base.strip_suffix(".json").unwrap_or(&base);
    Ok(format!("{stem}_metadata.json"))
}

/// Sanitize a user-entered filename and make sure it ends in `.json`.
///
/// Idempotent: feeding the output back in returns it unchanged.
pub fn parse_file_name(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if !sanitized.to_ascii_lowercase().ends_with(".json") {
        if sanitized.ends_with('.') {
            sanitized.push_str("json");
        } else {
            sanitized.push_str(".json");
        }
    }

    collapse_underscores(&sanitized)
}

fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = false;
    for c in s.chars() {
        if c == '_' {
            if prev_underscore {
                continue;
            }
            prev_underscore = true;
        } else {
            prev_underscore = false;
        }
        out.push(c);
    }
    out
}

/// Write a record as pretty-printed JSON.
pub fn save_metadata(metadata: &PageMetadata, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(metadata).context("failed to serialize metadata")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Read a record back from a JSON file.
pub fn load_metadata(path: &Path) -> anyhow::Result<PageMetadata> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("invalid metadata JSON in {}", path.display()))
}
