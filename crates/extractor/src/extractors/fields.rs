// ABOUTME: Metadata and element-text lookups with ordered fallback selectors.
// ABOUTME: Used by the title resolver against the untouched document.

//! Field lookup utilities.
//!
//! Key behaviors:
//! - Selectors are tried in order; within a selector, document order.
//! - Selectors starting with `meta[` read the `content` attribute; others
//!   read the element's text.
//! - Whitespace is collapsed; empty values are skipped.

use scraper::Selector;

use crate::dom::Document;
use crate::text::normalize_spaces;

/// Extracts the `content` attribute from the first matching meta tag.
pub fn extract_meta_content(doc: &Document, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.root().select(&sel).find_map(|el| {
        el.value()
            .attr("content")
            .map(normalize_spaces)
            .filter(|content| !content.is_empty())
    })
}

/// Every non-empty value the selectors yield, in selector order.
///
/// Callers that post-process values (and may reject some) walk this list
/// instead of stopping at the first match.
pub fn extract_field_texts(doc: &Document, selectors: &[&str]) -> Vec<String> {
    let mut values = Vec::new();
    for &sel_str in selectors {
        let Ok(sel) = Selector::parse(sel_str) else {
            continue;
        };
        for el in doc.root().select(&sel) {
            let value = if sel_str.starts_with("meta[") {
                el.value().attr("content").map(normalize_spaces)
            } else {
                Some(normalize_spaces(&el.text().collect::<String>()))
            };
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                values.push(value);
            }
        }
    }
    values
}
