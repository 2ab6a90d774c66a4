// ABOUTME: Title resolution from metadata, <title>, and the first heading, with site-name stripping.
// ABOUTME: Sanitization decodes entities, splits on separators, and keeps the most descriptive segment.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use url::Url;

use super::fields::{extract_field_texts, extract_meta_content};
use crate::config::Config;
use crate::dom::Document;
use crate::text::{decode_entities, normalize_spaces};

/// Title sources in precedence order.
const TITLE_SELECTORS: &[&str] = &[
    "meta[property='og:title']",
    "meta[name='og:title']",
    "meta[name='twitter:title']",
    "meta[property='twitter:title']",
    // Bare `title` would also match tooltips inside inline <svg>.
    "head > title",
    "h1",
];

/// Metadata naming the publishing site.
const SITE_NAME_SELECTORS: &[&str] = &[
    "meta[property='og:site_name']",
    "meta[name='application-name']",
    "meta[name='apple-mobile-web-app-title']",
];

static STRONG_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(?:\||::)\s*|\s+[-–—]\s+").unwrap());

const QUOTE_PAIRS: &[(char, char)] = &[
    ('"', '"'),
    ('\'', '\''),
    ('“', '”'),
    ('‘', '’'),
    ('«', '»'),
    ('„', '“'),
    ('「', '」'),
    ('『', '』'),
];

/// Resolve the article title.
///
/// Must run before preprocessing: it reads `<meta>` and `<title>`, which the
/// cleaner strips.
pub fn resolve_title(doc: &Document, config: &Config, base_url: Option<&Url>) -> String {
    let site_names = site_names(doc, base_url);

    for raw in extract_field_texts(doc, TITLE_SELECTORS) {
        let title = sanitize_title(&raw, &site_names, config.title_max_chars);
        if !title.is_empty() {
            debug!(title = %title, "resolved title");
            return title;
        }
    }

    warn!("no usable title in metadata, <title>, or headings");
    String::new()
}

/// Names a title segment may carry instead of describing the article.
fn site_names(doc: &Document, base_url: Option<&Url>) -> Vec<String> {
    let mut names: Vec<String> = SITE_NAME_SELECTORS
        .iter()
        .filter_map(|sel| extract_meta_content(doc, sel))
        .collect();

    if let Some(label) = base_url.and_then(host_label) {
        names.push(label);
    }
    names
}

/// Second-level labels that sit under a country code as part of the suffix.
const COUNTRY_SECOND_LEVELS: &[&str] =
    &["co", "com", "net", "org", "gov", "ac", "edu", "ne", "or"];

/// The registrable label of a host: `www.elastic.co` -> `elastic`,
/// `news.bbc.co.uk` -> `bbc`, `news.bbc.com` -> `bbc`.
fn host_label(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let labels: Vec<&str> = host
        .trim_start_matches("www.")
        .split('.')
        .filter(|l| !l.is_empty())
        .collect();

    let label = match labels.len() {
        0 => return None,
        1 => labels[0],
        n => {
            let second = labels[n - 2];
            let country_suffix =
                labels[n - 1].len() == 2 && COUNTRY_SECOND_LEVELS.contains(&second);
            if n >= 3 && country_suffix {
                labels[n - 3]
            } else {
                second
            }
        }
    };
    Some(label.to_string())
}

fn site_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A segment names the site when its key equals a site name, or extends one
/// by a short suffix (`Elastic Blog` for `elastic`). A headline that merely
/// opens with the brand (`Elasticsearch shard sizing`) is not a site name.
fn is_site_name(segment: &str, site_names: &[String]) -> bool {
    let key = site_key(segment);
    if key.is_empty() {
        return false;
    }
    let key_len = key.chars().count();
    site_names.iter().any(|name| {
        let name = site_key(name);
        let name_len = name.chars().count();
        if name.is_empty() {
            return false;
        }
        key == name || (name_len >= 3 && key_len <= name_len * 2 && key.starts_with(&name))
    })
}

/// Clean a raw title.
///
/// Entities are decoded and whitespace collapsed. Titles split by `|`, `::`
/// or a spaced dash keep their longest segment that is not a site name; a
/// `": "` split only drops a leading or trailing site name. Surrounding
/// quotes are removed and the result is cut to `max_chars` characters.
pub fn sanitize_title(raw: &str, site_names: &[String], max_chars: usize) -> String {
    let title = normalize_spaces(&decode_entities(raw));
    if title.is_empty() {
        return title;
    }

    let title = strip_separated_segments(&title, site_names);
    let title = strip_colon_site_name(&title, site_names);
    let title = strip_quotes(&title);

    let truncated: String = title.chars().take(max_chars).collect();
    truncated.trim().to_string()
}

fn strip_separated_segments(title: &str, site_names: &[String]) -> String {
    let segments: Vec<&str> = STRONG_SEPARATOR_RE
        .split(title)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    match segments.len() {
        0 => String::new(),
        1 => segments[0].to_string(),
        _ => {
            let mut best: Option<&str> = None;
            for &segment in &segments {
                if is_site_name(segment, site_names) {
                    continue;
                }
                let longer = best
                    .map(|b| segment.chars().count() > b.chars().count())
                    .unwrap_or(true);
                if longer {
                    best = Some(segment);
                }
            }
            best.unwrap_or(segments[0]).to_string()
        }
    }
}

fn strip_colon_site_name(title: &str, site_names: &[String]) -> String {
    if let Some((head, rest)) = title.split_once(": ") {
        if is_site_name(head, site_names) && !rest.trim().is_empty() {
            return rest.trim().to_string();
        }
    }
    if let Some((rest, tail)) = title.rsplit_once(": ") {
        if is_site_name(tail, site_names) && !rest.trim().is_empty() {
            return rest.trim().to_string();
        }
    }
    title.to_string()
}

fn strip_quotes(title: &str) -> String {
    let mut chars = title.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return title.to_string();
    };
    let quoted = QUOTE_PAIRS
        .iter()
        .any(|&(open, close)| first == open && last == close);
    if quoted {
        chars.as_str().trim().to_string()
    } else {
        title.to_string()
    }
}
