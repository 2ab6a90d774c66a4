// ABOUTME: Tolerant HTML parsing into a Document, with byte decoding and input size limits.
// ABOUTME: Charset comes from Content-Type, then <meta charset>, then chardetng detection.

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use scraper::Html;
use tracing::warn;

use super::{tag_name, Document};
use crate::error::ExtractError;
use crate::result::Result;

/// Elements html5ever synthesizes for any input.
const SKELETON_TAGS: &[&str] = &["html", "head", "body"];

/// How far into a body to look for a `<meta charset>` declaration.
const META_SNIFF_BYTES: usize = 1024;

static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_\-:.]+)"#).unwrap()
});

/// Parse HTML into a document tree.
///
/// html5ever recovers from missing closing tags, stray entities and
/// mismatched nesting, so the only failures are inputs with nothing to
/// extract from: empty or whitespace-only text, or a tree with no element
/// beyond the html/head/body skeleton.
pub fn parse(raw_html: &str) -> Result<Document> {
    if raw_html.trim().is_empty() {
        return Err(ExtractError::malformed_input(
            "parse",
            Some(anyhow::anyhow!("input is empty")),
        ));
    }

    let doc = Document::from_html(Html::parse_document(raw_html));

    let has_content = doc
        .elements()
        .any(|el| !SKELETON_TAGS.contains(&tag_name(&el)));
    if !has_content {
        return Err(ExtractError::malformed_input(
            "parse",
            Some(anyhow::anyhow!("no elements beyond the document skeleton")),
        ));
    }

    Ok(doc)
}

/// Decode raw bytes, cut the text to `max_bytes`, and parse it.
pub fn parse_bytes(body: &[u8], content_type: Option<&str>, max_bytes: usize) -> Result<Document> {
    let html = decode_html(body, content_type);
    parse(truncate_input(&html, max_bytes))
}

/// Cut input down to at most `max_bytes`, backing off to a UTF-8 boundary.
pub fn truncate_input(raw_html: &str, max_bytes: usize) -> &str {
    if raw_html.len() <= max_bytes {
        return raw_html;
    }

    let mut end = max_bytes;
    while !raw_html.is_char_boundary(end) {
        end -= 1;
    }
    warn!(
        input_bytes = raw_html.len(),
        max_bytes, "input exceeds size limit, truncating"
    );
    &raw_html[..end]
}

/// Decode an HTML body to a String.
///
/// Invalid sequences become U+FFFD rather than failing the call.
pub fn decode_html(body: &[u8], content_type: Option<&str>) -> String {
    let declared = content_type
        .and_then(extract_charset)
        .or_else(|| sniff_meta_charset(body));

    if let Some(charset) = declared {
        if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
            let (decoded, _, _) = encoding.decode(body);
            return decoded.into_owned();
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from a Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    lower.split(';').find_map(|part| {
        part.trim()
            .strip_prefix("charset=")
            .map(|charset| charset.trim_matches('"').trim_matches('\'').to_string())
            .filter(|charset| !charset.is_empty())
    })
}

fn sniff_meta_charset(body: &[u8]) -> Option<String> {
    let head = &body[..body.len().min(META_SNIFF_BYTES)];
    META_CHARSET_RE
        .captures(head)
        .and_then(|caps| caps.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).to_lowercase())
}
