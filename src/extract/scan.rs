//! Regex-backed tag harvesting.
//!
//! Scans the raw markup for `<title>`, `<meta>` and `<link>` tags
//! without building a DOM, tolerating either quote style, unquoted
//! values and any attribute order. Each captured value gets exactly one
//! character-reference decoding pass.

use html_escape::decode_html_entities;
use regex::Regex;

use super::TagHarvest;

pub(crate) fn harvest(html: &str) -> TagHarvest {
    let mut harvest = TagHarvest::default();

    let title_re = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
    if let Some(caps) = title_re.captures(html) {
        harvest.title = Some(decode_html_entities(&caps[1]).into_owned());
    }

    let meta_re = Regex::new(r"(?is)<meta\b[^>]*>").unwrap();
    for tag in meta_re.find_iter(html) {
        let attrs = TagAttrs::parse(tag.as_str());
        let Some(content) = attrs.content else { continue };
        if let Some(name) = attrs.name {
            harvest.named.push((name, content.clone()));
        }
        if let Some(property) = attrs.property {
            harvest.properties.push((property, content));
        }
    }

    // First canonical link carrying an href wins; href-less ones are skipped.
    let link_re = Regex::new(r"(?is)<link\b[^>]*>").unwrap();
    for tag in link_re.find_iter(html) {
        let attrs = TagAttrs::parse(tag.as_str());
        if attrs.rel.as_deref() == Some("canonical") && attrs.href.is_some() {
            harvest.canonical = attrs.href;
            break;
        }
    }

    harvest
}

/// The attributes of a single tag that harvesting cares about.
///
/// Duplicate attributes keep the first occurrence, matching what the
/// HTML tokenizer does.
#[derive(Default)]
struct TagAttrs {
    name: Option<String>,
    property: Option<String>,
    content: Option<String>,
    rel: Option<String>,
    href: Option<String>,
}

impl TagAttrs {
    fn parse(tag: &str) -> TagAttrs {
        let attr_re = Regex::new(
            r#"(?i)([a-z][a-z0-9_:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#,
        )
        .unwrap();

        let mut attrs = TagAttrs::default();
        for caps in attr_re.captures_iter(tag) {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_html_entities(m.as_str()).into_owned())
                .unwrap_or_default();
            let slot = match caps[1].to_ascii_lowercase().as_str() {
                "name" => &mut attrs.name,
                "property" => &mut attrs.property,
                "content" => &mut attrs.content,
                "rel" => &mut attrs.rel,
                "href" => &mut attrs.href,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        attrs
    }
}
