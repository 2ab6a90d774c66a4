// ABOUTME: Output sanitization of the selected content via an ammonia allow-list policy.
// ABOUTME: Also renders sanitized HTML to plain text for word counts and previews.

//! Output formats.
//!
//! The sanitizer is the last pipeline phase. It serializes the selected nodes
//! and reduces them to the configured allow-list: disallowed elements are
//! unwrapped so their text survives, script-like elements are dropped with
//! their text, relative URLs are resolved against the caller's base URL and
//! anything with a disallowed scheme loses its URL attribute.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use ammonia::UrlRelative;
use ego_tree::iter::Edge;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node};
use url::Url;

use crate::config::Config;
use crate::dom::Document;
use crate::extractors::content::ContentRoot;

/// Always dropped with their text, whatever the configuration says.
const ALWAYS_DROP_CONTENT: &[&str] = &["script", "style"];

/// Elements that end a line in plain-text output.
const TEXT_BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "ul", "ol",
    "tr", "table", "section", "article",
];

/// Upper bound on cleaning passes before the output is taken as final.
const MAX_SANITIZE_PASSES: usize = 4;

static HORIZONTAL_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());
static PRE_LEADING_NEWLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(<pre(?:\s[^>]*)?>)\n").unwrap());

/// Serialize and sanitize the selected content, root and merged siblings in
/// document order.
pub fn sanitize(
    doc: &Document,
    content: &ContentRoot,
    config: &Config,
    base_url: Option<&Url>,
) -> String {
    let html: String = content
        .nodes
        .iter()
        .map(|id| doc.outer_html(*id))
        .collect();
    sanitize_html(&restore_pre_newline(&html), config, base_url)
}

/// Sanitize an HTML fragment with the configured allow-list.
///
/// Idempotent: sanitizing the output again yields the same string. Unwrapping
/// can leave markup the parser restructures on the next read (a heading
/// inside a heading), so the cleaner reruns on its own output until it
/// settles.
pub fn sanitize_html(html: &str, config: &Config, base_url: Option<&Url>) -> String {
    let tags: HashSet<&str> = config.allowed_tags.iter().map(String::as_str).collect();

    let clean_content: HashSet<&str> = config
        .drop_content_tags
        .iter()
        .map(String::as_str)
        .chain(ALWAYS_DROP_CONTENT.iter().copied())
        .filter(|tag| !tags.contains(tag))
        .collect();

    let generic: HashSet<&str> = config
        .generic_attributes
        .iter()
        .map(String::as_str)
        .collect();

    let tag_attributes: HashMap<&str, HashSet<&str>> = config
        .tag_attributes
        .iter()
        .map(|(tag, attrs)| (tag.as_str(), attrs.iter().map(String::as_str).collect()))
        .collect();

    let schemes: HashSet<&str> = config.url_schemes.iter().map(String::as_str).collect();

    let mut builder = ammonia::Builder::default();
    builder
        .tags(tags)
        .clean_content_tags(clean_content)
        .generic_attributes(generic)
        .tag_attributes(tag_attributes)
        .url_schemes(schemes)
        .link_rel(None)
        .strip_comments(true);

    if let Some(base) = base_url {
        builder.url_relative(UrlRelative::RewriteWithBase(base.clone()));
    }

    let clean_once =
        |input: &str| restore_pre_newline(&builder.clean(input).to_string()).into_owned();

    let mut out = clean_once(html);
    for _ in 1..MAX_SANITIZE_PASSES {
        let next = clean_once(&out);
        if next == out {
            break;
        }
        out = next;
    }
    out
}

/// The parser drops the newline right after `<pre>` and the serializer does
/// not write it back. Doubling it keeps leading blank lines across a reparse.
fn restore_pre_newline(html: &str) -> Cow<'_, str> {
    PRE_LEADING_NEWLINE_RE.replace_all(html, "$1\n\n")
}

/// Convert HTML to plain text by extracting text nodes.
///
/// Block elements and `<br>` end lines; horizontal whitespace collapses and
/// blank lines are dropped.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut raw = String::new();

    for edge in fragment.root_element().traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Text(text) => raw.push_str(text),
                Node::Element(el) if el.name() == "br" => raw.push('\n'),
                _ => {}
            },
            Edge::Close(node) => {
                if let Node::Element(el) = node.value() {
                    if TEXT_BLOCK_TAGS.contains(&el.name()) {
                        raw.push('\n');
                    }
                }
            }
        }
    }

    let normalized = HORIZONTAL_SPACE_RE.replace_all(&raw, " ");
    normalized
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn clean(html: &str) -> String {
        sanitize_html(html, &Config::default(), None)
    }

    #[test]
    fn test_sanitize_drops_scripts_with_text() {
        let out = clean("<p>Hello<script>alert(1)</script></p><style>p { color: red }</style>");
        assert_eq!(out, "<p>Hello</p>");
    }

    #[test]
    fn test_sanitize_unwraps_disallowed_elements() {
        let out = clean(r#"<div class="x"><span style="color:red">Kept text</span></div>"#);
        assert_eq!(out, "Kept text");
    }

    #[test]
    fn test_sanitize_strips_disallowed_attributes() {
        let out = clean(
            r#"<p class="lead" onclick="x()">A <a href="https://example.com/" target="_blank" title="t">link</a></p>"#,
        );
        assert_eq!(
            out,
            r#"<p>A <a href="https://example.com/" title="t">link</a></p>"#
        );
    }

    #[test]
    fn test_sanitize_rejects_javascript_urls() {
        let out = clean(r#"<a href="javascript:alert(1)">click</a><img src="data:image/png;base64,AAAA" alt="x">"#);
        assert!(!out.contains("javascript"));
        assert!(!out.contains("data:"));
        assert!(out.contains("click"));
    }

    #[test]
    fn test_sanitize_escapes_text() {
        let out = clean("<p>1 &lt; 2 &amp;&amp; 3 &gt; 2</p>");
        assert_eq!(out, "<p>1 &lt; 2 &amp;&amp; 3 &gt; 2</p>");
    }

    #[test]
    fn test_sanitize_drops_comments() {
        assert_eq!(clean("<p>a<!-- hidden -->b</p>"), "<p>ab</p>");
    }

    #[test]
    fn test_sanitize_rewrites_relative_urls() {
        let base = Url::parse("https://blog.example.com/2015/12/post.html").unwrap();
        let out = sanitize_html(
            r#"<p><a href="/about">About</a> <img src="img/photo.jpg" alt="Photo"></p>"#,
            &Config::default(),
            Some(&base),
        );
        assert!(out.contains(r#"href="https://blog.example.com/about""#));
        assert!(out.contains(r#"src="https://blog.example.com/2015/12/img/photo.jpg""#));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let base = Url::parse("https://example.com/a/").unwrap();
        let once = sanitize_html(
            r#"<div><h2>Head</h2><p>Text &amp; <b>bold</b><br><a href="x">rel</a></p><table><tr><td>cell</td></tr></table></div>"#,
            &Config::default(),
            Some(&base),
        );
        let twice = sanitize_html(&once, &Config::default(), Some(&base));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_nested_headings_settle_in_one_call() {
        let once = clean("<h2><div><h3>Inner heading text</h3></div></h2>");
        assert_eq!(clean(&once), once);
        assert!(once.contains("<h3>Inner heading text</h3>"));
    }

    #[test]
    fn test_pre_keeps_leading_newlines() {
        let once = clean("<pre>\n\nfn main() {}</pre>");
        assert_eq!(once, "<pre>\n\nfn main() {}</pre>");
        assert_eq!(clean(&once), once);
        assert_eq!(clean("<pre>fn main() {}</pre>"), "<pre>fn main() {}</pre>");
    }

    #[test]
    fn test_restore_pre_newline() {
        assert_eq!(restore_pre_newline("<pre>\nx</pre>"), "<pre>\n\nx</pre>");
        assert_eq!(
            restore_pre_newline("<pre title=\"t\">\nx</pre>"),
            "<pre title=\"t\">\n\nx</pre>"
        );
        assert_eq!(restore_pre_newline("<pre>x</pre><p>\ny</p>"), "<pre>x</pre><p>\ny</p>");
    }

    #[test]
    fn test_overlapping_drop_and_allow_lists_do_not_panic() {
        let config = Config {
            drop_content_tags: vec!["p".to_string(), "script".to_string()],
            ..Config::default()
        };
        assert_eq!(sanitize_html("<p>ok</p>", &config, None), "<p>ok</p>");
    }

    #[test]
    fn test_html_to_text_blocks_and_breaks() {
        let text = html_to_text("<h2>Title</h2><p>First   line<br>second line</p><ul><li>one</li><li>two</li></ul>");
        assert_eq!(text, "Title\nFirst line\nsecond line\none\ntwo");
    }

    #[test]
    fn test_html_to_text_decodes_entities() {
        assert_eq!(html_to_text("<p>Tom &amp; Jerry</p>"), "Tom & Jerry");
    }

    #[test]
    fn test_html_to_text_empty() {
        assert_eq!(html_to_text(""), "");
        assert_eq!(html_to_text("<p> </p>"), "");
    }
}
