//! DOM-backed tag harvesting.
//!
//! Parses the document with the `scraper` crate and walks it with CSS
//! selectors. html5ever decodes character references during parsing, so
//! the harvested values are already plain text.

use scraper::{Html, Selector};

use super::TagHarvest;

pub(crate) fn harvest(html: &str) -> TagHarvest {
    let document = Html::parse_document(html);
    let mut harvest = TagHarvest::default();

    let title_sel = Selector::parse("title").unwrap();
    if let Some(el) = document.select(&title_sel).next() {
        harvest.title = Some(el.text().collect::<String>());
    }

    // First canonical link carrying an href wins; href-less ones are skipped.
    let canonical_sel = Selector::parse(r#"link[rel="canonical"]"#).unwrap();
    harvest.canonical = document
        .select(&canonical_sel)
        .find_map(|el| el.value().attr("href").map(|s| s.to_string()));

    let meta_sel = Selector::parse("meta[content]").unwrap();
    for element in document.select(&meta_sel) {
        let content = element.value().attr("content").unwrap_or("");
        if let Some(name) = element.value().attr("name") {
            harvest.named.push((name.to_string(), content.to_string()));
        }
        if let Some(property) = element.value().attr("property") {
            harvest.properties.push((property.to_string(), content.to_string()));
        }
    }

    harvest
}
