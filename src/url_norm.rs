//! URL scheme repair and inference.
//!
//! Turns whatever a user typed into something fetchable: repairs the
//! common scheme typos, rejects schemes the fetcher will never speak,
//! and infers `http://` vs `https://` for schemeless input.

use std::fmt;

use crate::error::{MetalensError, Result};

/// A URL string guaranteed to begin with `http://` or `https://`.
///
/// The guarantee covers the scheme only; the remainder may still fail to
/// parse (an empty input normalizes to a bare `https://`). Downstream
/// fetching surfaces those failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Case-insensitive ASCII prefix test that never slices mid-character.
fn has_prefix_ci(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Repair one of the known scheme typos. First match wins; the remainder
/// of the input keeps its original casing.
fn repair_scheme_typo(raw: &str) -> Option<String> {
    if has_prefix_ci(raw, "htp://") {
        return Some(format!("http://{}", &raw[6..]));
    }
    if has_prefix_ci(raw, "htps://") {
        return Some(format!("https://{}", &raw[7..]));
    }
    if has_prefix_ci(raw, "http//") {
        return Some(format!("http://{}", &raw[6..]));
    }
    if has_prefix_ci(raw, "https//") {
        return Some(format!("https://{}", &raw[7..]));
    }
    // Single-slash forms; must not fire on an already-correct scheme.
    if has_prefix_ci(raw, "http:/") && !has_prefix_ci(raw, "http://") {
        return Some(format!("http://{}", &raw[6..]));
    }
    if has_prefix_ci(raw, "https:/") && !has_prefix_ci(raw, "https://") {
        return Some(format!("https://{}", &raw[7..]));
    }
    None
}

/// The alphabetic scheme of a `<scheme>://…` string, if it has one.
fn explicit_scheme(s: &str) -> Option<&str> {
    let idx = s.find("://")?;
    let scheme = &s[..idx];
    if !scheme.is_empty() && scheme.bytes().all(|b| b.is_ascii_alphabetic()) {
        Some(scheme)
    } else {
        None
    }
}

/// Detect a `<letters>:` prefix that reads as a scheme rather than a
/// `host:port` pair: the colon must be followed by something, and that
/// something must be neither a digit nor a slash.
fn scheme_like_prefix(s: &str) -> Option<&str> {
    let idx = s.find(':')?;
    let scheme = &s[..idx];
    if scheme.is_empty() || !scheme.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    match s.as_bytes().get(idx + 1) {
        None | Some(b'/') => None,
        Some(b) if b.is_ascii_digit() => None,
        Some(_) => Some(scheme),
    }
}

fn is_http_like(scheme: &str) -> bool {
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}

/// Normalize a raw URL string to one with an explicit HTTP(S) scheme.
///
/// In order:
/// 1. repair the known typos (`htp://`, `htps://`, `http//`, `https//`,
///    `http:/x`, `https:/x`) case-insensitively, preserving the
///    remainder's casing;
/// 2. accept an explicit `http`/`https` scheme as-is and reject any other
///    explicit scheme (`ftp://`, `mailto:`, `javascript:`, …) with
///    [`MetalensError::InvalidUrl`];
/// 3. for schemeless input, prepend `http://` for the `localhost` host
///    token (`localhost`, `localhost:8080`, `localhost/admin`) and
///    `https://` for everything else.
///
/// An empty input yields `https://` — not rejected here, by contract;
/// the fetcher rejects it when URL parsing fails.
pub fn normalize_url_scheme(raw: &str) -> Result<NormalizedUrl> {
    if let Some(repaired) = repair_scheme_typo(raw) {
        return Ok(NormalizedUrl(repaired));
    }

    if let Some(scheme) = explicit_scheme(raw) {
        if is_http_like(scheme) {
            return Ok(NormalizedUrl(raw.to_string()));
        }
        return Err(MetalensError::invalid_scheme(raw));
    }

    if let Some(scheme) = scheme_like_prefix(raw) {
        if !is_http_like(scheme) {
            return Err(MetalensError::invalid_scheme(raw));
        }
    }

    let lower = raw.to_ascii_lowercase();
    let is_localhost = lower == "localhost"
        || lower.starts_with("localhost:")
        || lower.starts_with("localhost/");
    let scheme = if is_localhost { "http://" } else { "https://" };
    Ok(NormalizedUrl(format!("{scheme}{raw}")))
}
