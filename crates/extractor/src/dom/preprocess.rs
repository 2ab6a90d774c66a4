// ABOUTME: In-place cleanup before scoring: strip non-content elements, drop empties, normalize whitespace.
// ABOUTME: Never removes by class/id keyword; that judgement belongs to the scorer and the pruner.

use ego_tree::{NodeId, NodeRef};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node};
use tracing::debug;

use super::{tag_name, Document};
use crate::config::Config;

static SPACER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)transparent|spacer|blank").unwrap());
static DISPLAY_NONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)display\s*:\s*none|visibility\s*:\s*hidden").unwrap());

/// Counts of what a cleaning pass removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanStats {
    pub stripped: usize,
    pub empty: usize,
    pub text_nodes: usize,
}

/// Clean a document in place.
pub fn clean(doc: &mut Document, config: &Config) -> CleanStats {
    let mut stats = CleanStats::default();

    for id in strippable_nodes(doc, config) {
        doc.detach(id);
        stats.stripped += 1;
    }

    stats.empty = remove_empty_elements(doc, config);
    stats.text_nodes = normalize_whitespace(doc, config);

    debug!(
        stripped = stats.stripped,
        empty = stats.empty,
        whitespace_nodes = stats.text_nodes,
        remaining = doc.element_count(),
        "preprocessed document"
    );
    stats
}

fn strippable_nodes(doc: &Document, config: &Config) -> Vec<NodeId> {
    let mut ids = Vec::new();
    let mut stack = vec![*doc.root()];

    while let Some(node) = stack.pop() {
        let strip = match node.value() {
            Node::Comment(_) | Node::ProcessingInstruction(_) => true,
            Node::Element(el) => config.is_strip_tag(el.name()) || is_hidden(el),
            _ => false,
        };
        if strip {
            ids.push(node.id());
            continue;
        }
        stack.extend(node.children());
    }

    ids
}

fn is_hidden(el: &scraper::node::Element) -> bool {
    if el.attr("hidden").is_some() {
        return true;
    }
    el.attr("style")
        .map(|style| DISPLAY_NONE_RE.is_match(style))
        .unwrap_or(false)
}

/// Check if image should be removed (spacer, tracking pixel, or no source)
pub fn should_remove_image(element: &ElementRef) -> bool {
    match element.value().attr("src") {
        Some(src) if SPACER_RE.is_match(src) || src.trim().is_empty() => return true,
        None => return true,
        _ => {}
    }

    let height = element
        .value()
        .attr("height")
        .and_then(|h| h.trim_end_matches("px").parse::<i32>().ok())
        .unwrap_or(20);
    let width = element
        .value()
        .attr("width")
        .and_then(|w| w.trim_end_matches("px").parse::<i32>().ok())
        .unwrap_or(20);

    height < 10 || width < 10
}

/// Remove elements with no text and no remaining element children, innermost
/// first so wrappers around removed empties go too.
fn remove_empty_elements(doc: &mut Document, config: &Config) -> usize {
    let ids: Vec<NodeId> = doc.elements().map(|el| el.id()).collect();
    let mut removed = 0;

    // Reversed pre-order visits every descendant before its ancestors.
    for id in ids.into_iter().rev() {
        let Some(el) = doc.element(id) else {
            continue;
        };
        let name = tag_name(&el);

        let empty = if name == "img" {
            should_remove_image(&el)
        } else if config.is_keep_empty_tag(name) {
            false
        } else {
            is_empty(&el)
        };

        if empty {
            doc.detach(id);
            removed += 1;
        }
    }

    removed
}

fn is_empty(el: &ElementRef) -> bool {
    if el.text().any(|t| !t.trim().is_empty()) {
        return false;
    }
    !el.children()
        .filter_map(ElementRef::wrap)
        .any(|child| !matches!(tag_name(&child), "br" | "hr"))
}

/// Collapse whitespace runs in text nodes and trim at block boundaries.
/// Returns how many whitespace-only text nodes were removed.
fn normalize_whitespace(doc: &mut Document, config: &Config) -> usize {
    let mut edits: Vec<(NodeId, String)> = Vec::new();

    for node in doc.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let preserved = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| config.is_preserve_whitespace_tag(tag_name(&el)));
        if preserved {
            continue;
        }

        let parent_is_block = node
            .parent()
            .and_then(ElementRef::wrap)
            .map(|p| config.is_block_tag(tag_name(&p)))
            .unwrap_or(true);

        let mut collapsed = collapse_runs(text);
        if at_block_edge(node.prev_sibling(), parent_is_block, config) {
            collapsed = collapsed.trim_start().to_string();
        }
        if at_block_edge(node.next_sibling(), parent_is_block, config) {
            collapsed = collapsed.trim_end().to_string();
        }

        if collapsed != &**text {
            edits.push((node.id(), collapsed));
        }
    }

    let mut removed = 0;
    for (id, text) in edits {
        if text.is_empty() {
            doc.detach(id);
            removed += 1;
        } else {
            doc.set_text(id, &text);
        }
    }
    removed
}

fn at_block_edge(sibling: Option<NodeRef<'_, Node>>, parent_is_block: bool, config: &Config) -> bool {
    match sibling {
        None => parent_is_block,
        Some(s) => ElementRef::wrap(s)
            .map(|el| config.is_block_tag(tag_name(&el)))
            .unwrap_or(false),
    }
}

fn collapse_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::parse;
    use scraper::{Html, Selector};

    fn cleaned(html: &str) -> String {
        let mut doc = parse(html).unwrap();
        clean(&mut doc, &Config::default());
        let body = doc
            .elements()
            .find(|el| tag_name(el) == "body")
            .unwrap()
            .inner_html();
        body
    }

    #[test]
    fn test_strips_scripts_styles_and_comments() {
        let out = cleaned(
            "<body><script>var x = 1;</script><style>p{}</style><!-- note -->\
             <p>Kept</p><noscript>Enable JS</noscript><form><input></form></body>",
        );
        assert_eq!(out, "<p>Kept</p>");
    }

    #[test]
    fn test_strips_hidden_elements() {
        let out = cleaned(
            r#"<body><div style="display: none">Hidden</div><p hidden>Gone</p><p>Shown</p></body>"#,
        );
        assert_eq!(out, "<p>Shown</p>");
    }

    #[test]
    fn test_removes_nested_empty_wrappers() {
        let out = cleaned(
            r#"<body><div><div><span> </span></div></div><p>Text</p><div><br></div></body>"#,
        );
        assert_eq!(out, "<p>Text</p>");
    }

    #[test]
    fn test_removes_tracking_pixels_keeps_images() {
        let out = cleaned(
            r#"<body><p>Text</p><img src="https://t.example/pixel.gif" width="1" height="1">
            <div><img src="/spacer.gif"></div><p><img src="photo.jpg" alt="Photo"></p></body>"#,
        );
        assert!(!out.contains("pixel.gif"));
        assert!(!out.contains("spacer.gif"));
        assert!(out.contains("photo.jpg"));
    }

    #[test]
    fn test_keeps_line_breaks_inside_text() {
        let out = cleaned("<body><div>First line<br>Second line</div></body>");
        assert_eq!(out, "<div>First line<br>Second line</div>");
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed_at_blocks() {
        let out = cleaned(
            "<body>\n  <div>\n    <p>  Some   <b>bold</b>\n   text  </p>\n  </div>\n</body>",
        );
        assert_eq!(out, "<div><p>Some <b>bold</b> text</p></div>");
    }

    #[test]
    fn test_preformatted_text_is_verbatim() {
        let out = cleaned("<body><pre>  fn main() {\n      body();\n  }</pre></body>");
        assert_eq!(out, "<pre>  fn main() {\n      body();\n  }</pre>");
    }

    #[test]
    fn test_does_not_remove_by_class_keyword() {
        let out = cleaned(r#"<body><div class="comments"><p>A comment</p></div></body>"#);
        assert!(out.contains("A comment"));
    }

    #[test]
    fn test_should_remove_image_spacer() {
        let doc = Html::parse_fragment(r#"<img src="transparent.gif" />"#);
        let sel = Selector::parse("img").unwrap();
        let el = doc.select(&sel).next().unwrap();
        assert!(should_remove_image(&el));
    }

    #[test]
    fn test_should_remove_image_small() {
        let doc = Html::parse_fragment(r#"<img src="icon.png" width="5" height="5" />"#);
        let sel = Selector::parse("img").unwrap();
        let el = doc.select(&sel).next().unwrap();
        assert!(should_remove_image(&el));
    }

    #[test]
    fn test_collapse_runs_keeps_nbsp() {
        assert_eq!(collapse_runs("a \n\t b\u{a0}c"), "a b\u{a0}c");
    }
}
