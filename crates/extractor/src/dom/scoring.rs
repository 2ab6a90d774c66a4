// ABOUTME: Content-density scoring over the cleaned tree, stored in a NodeId-keyed side table.
// ABOUTME: One post-order pass computes text/link lengths, own scores, and parent/grandparent propagation.

use std::collections::HashMap;

use ego_tree::iter::Edge;
use ego_tree::NodeId;
use scraper::{ElementRef, Node};
use tracing::debug;

use super::{tag_name, Document};
use crate::config::Config;
use crate::text::{count_commas, visible_len, KeywordHits};

/// Everything the selector and pruner need to know about one element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeScore {
    /// Tag base, length and comma bonuses, keyword weight.
    pub own: f64,
    /// Share of descendants' own scores propagated up.
    pub received: f64,
    /// `own + received`, damped by link density.
    pub score: f64,
    /// Non-whitespace characters in the subtree.
    pub text_len: usize,
    /// Non-whitespace characters inside links.
    pub link_len: usize,
    /// Distance from the root element.
    pub depth: usize,
}

impl NodeScore {
    /// Calculate link density (ratio of link text to total text)
    pub fn link_density(&self) -> f64 {
        if self.text_len == 0 {
            return 0.0;
        }
        self.link_len as f64 / self.text_len as f64
    }
}

/// An element considered for the content root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub id: NodeId,
    pub score: f64,
}

/// Scores for every attached element of a document.
#[derive(Debug, Default)]
pub struct ScoreTable {
    scores: HashMap<NodeId, NodeScore>,
}

impl ScoreTable {
    pub fn get(&self, id: NodeId) -> Option<&NodeScore> {
        self.scores.get(&id)
    }

    /// Final score, zero for unscored nodes.
    pub fn score_of(&self, id: NodeId) -> f64 {
        self.get(id).map(|s| s.score).unwrap_or(0.0)
    }

    pub fn text_len(&self, id: NodeId) -> usize {
        self.get(id).map(|s| s.text_len).unwrap_or(0)
    }

    pub fn link_density(&self, id: NodeId) -> f64 {
        self.get(id).map(NodeScore::link_density).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Per-element accumulator filled as the traversal closes each element.
#[derive(Default)]
struct Pending {
    received: f64,
}

/// Score every element in the document.
pub fn score(doc: &Document, config: &Config) -> ScoreTable {
    let mut table = ScoreTable::default();
    let mut pending: HashMap<NodeId, Pending> = HashMap::new();
    // Characters of text owned by an element outside its block children.
    let mut inline_lens: HashMap<NodeId, usize> = HashMap::new();
    let mut depth = 0usize;

    for edge in doc.root().traverse() {
        match edge {
            Edge::Open(node) => {
                if node.value().is_element() {
                    depth += 1;
                }
            }
            Edge::Close(node) => {
                let Some(el) = ElementRef::wrap(node) else {
                    continue;
                };
                depth -= 1;

                let mut text_len = 0;
                let mut link_len = 0;
                let mut inline_len = 0;
                for child in el.children() {
                    match child.value() {
                        Node::Text(t) => {
                            let n = visible_len(t);
                            text_len += n;
                            inline_len += n;
                        }
                        Node::Element(child_el) => {
                            if let Some(s) = table.get(child.id()) {
                                text_len += s.text_len;
                                link_len += s.link_len;
                            }
                            if !config.is_block_tag(child_el.name()) {
                                inline_len += inline_lens.get(&child.id()).copied().unwrap_or(0);
                            }
                        }
                        _ => {}
                    }
                }
                if tag_name(&el) == "a" {
                    link_len = text_len;
                }
                inline_lens.insert(el.id(), inline_len);

                let own = own_score(&el, inline_len, config);
                propagate(&el, own, config, &mut pending);

                table.scores.insert(
                    el.id(),
                    NodeScore {
                        own,
                        text_len,
                        link_len,
                        depth,
                        ..NodeScore::default()
                    },
                );
            }
        }
    }

    for (id, entry) in table.scores.iter_mut() {
        entry.received = pending.get(id).map(|p| p.received).unwrap_or(0.0);
        let mut total = entry.own + entry.received;
        let density = entry.link_density();
        if density > config.max_link_density && total > 0.0 {
            total *= 1.0 - density;
        }
        entry.score = total;
    }

    debug!(scored = table.len(), "scored document");
    table
}

/// Score an element from its own content. The length bonus counts only
/// `inline_len`, the direct text plus non-block children, because block
/// children are scored on their own and propagate upward. Counting the
/// whole subtree would credit a wrapper for its paragraphs' length twice.
fn own_score(el: &ElementRef, inline_len: usize, config: &Config) -> f64 {
    let name = tag_name(el);
    let mut score = 0.0;

    if config.is_paragraph_tag(name) {
        score += config.paragraph_base_score;
        let commas = el.text().map(count_commas).sum::<usize>() as f64;
        score += commas.min(config.comma_bonus_cap);
    } else if config.is_negative_tag(name) {
        score += config.negative_tag_score;
    }

    if config.length_bonus_chars > 0 {
        let bonus = (inline_len / config.length_bonus_chars) as f64;
        score += bonus.min(config.length_bonus_cap);
    }

    score += keyword_weight(el, config);
    score
}

/// Get weight based on className and id tokens
pub fn keyword_weight(el: &ElementRef, config: &Config) -> f64 {
    let class = el.value().attr("class").unwrap_or("");
    let id = el.value().attr("id").unwrap_or("");
    KeywordHits::classify(class, id, config).weight(config.keyword_weight)
}

fn propagate(el: &ElementRef, own: f64, config: &Config, pending: &mut HashMap<NodeId, Pending>) {
    if own == 0.0 {
        return;
    }
    let Some(parent) = el.parent().and_then(ElementRef::wrap) else {
        return;
    };
    pending.entry(parent.id()).or_default().received += own * config.parent_weight;

    if let Some(grandparent) = parent.parent().and_then(ElementRef::wrap) {
        pending.entry(grandparent.id()).or_default().received +=
            own * config.grandparent_weight;
    }
}

/// Check if text ends with sentence-ending punctuation
pub fn has_sentence_end(text: &str) -> bool {
    matches!(
        text.trim().chars().last(),
        Some('.' | '!' | '?' | ':' | ';' | '。' | '！' | '？' | '…')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::parse;
    use crate::dom::preprocess::clean;

    fn scored(html: &str) -> (Document, ScoreTable) {
        let config = Config::default();
        let mut doc = parse(html).unwrap();
        clean(&mut doc, &config);
        let table = score(&doc, &config);
        (doc, table)
    }

    fn find(doc: &Document, tag: &str) -> NodeId {
        doc.elements().find(|el| tag_name(el) == tag).unwrap().id()
    }

    #[test]
    fn test_paragraph_base_and_comma_bonus() {
        let (doc, table) = scored("<body><div><p>One, two, three, four, five.</p></div></body>");
        let p = table.get(find(&doc, "p")).unwrap();
        // base 3 + capped comma bonus 3
        assert_eq!(p.own, 6.0);
    }

    #[test]
    fn test_cjk_commas_count() {
        let (doc, table) = scored("<body><div><p>当时，他们、我们，还有你</p></div></body>");
        assert_eq!(table.get(find(&doc, "p")).unwrap().own, 6.0);
    }

    #[test]
    fn test_negative_tags() {
        let (doc, table) = scored("<body><nav><a href=\"/\">Home</a></nav><p>x</p></body>");
        assert_eq!(table.get(find(&doc, "nav")).unwrap().own, -25.0);
    }

    #[test]
    fn test_length_bonus_uses_owned_text() {
        let long = "a".repeat(250);
        let html = format!("<body><div>{}</div></body>", long);
        let (doc, table) = scored(&html);
        let div = table.get(find(&doc, "div")).unwrap();
        assert_eq!(div.own, 2.0);
        assert_eq!(div.text_len, 250);
    }

    #[test]
    fn test_wrapper_gets_no_length_bonus_from_paragraphs() {
        let long = "a".repeat(250);
        let html = format!("<body><div><p>{}</p></div></body>", long);
        let (doc, table) = scored(&html);
        assert_eq!(table.get(find(&doc, "p")).unwrap().own, 5.0);
        let div = table.get(find(&doc, "div")).unwrap();
        assert_eq!(div.own, 0.0);
        assert_eq!(div.text_len, 250);
    }

    #[test]
    fn test_length_bonus_is_capped() {
        let long = "word ".repeat(200);
        let html = format!("<body><div>{}</div></body>", long);
        let (doc, table) = scored(&html);
        assert_eq!(table.get(find(&doc, "div")).unwrap().own, 3.0);
    }

    #[test]
    fn test_keyword_weight_both_directions() {
        let (doc, table) = scored(
            r#"<body><div class="entry-content"><span>x</span></div><section id="sidebar"><span>y</span></section></body>"#,
        );
        assert_eq!(table.get(find(&doc, "div")).unwrap().own, 25.0);
        assert_eq!(table.get(find(&doc, "section")).unwrap().own, -25.0);
    }

    #[test]
    fn test_propagation_to_parent_and_grandparent() {
        let (doc, table) = scored(
            "<body><section><div><p>One, two, three, four.</p></div></section></body>",
        );
        // p own = 3 + 3
        assert_eq!(table.get(find(&doc, "div")).unwrap().received, 3.0);
        assert_eq!(table.get(find(&doc, "section")).unwrap().received, 1.5);
    }

    #[test]
    fn test_link_density_and_damping() {
        let html = r#"<body><div class="content"><a href="/a">first link text</a> <a href="/b">second link text</a> tail</div></body>"#;
        let (doc, table) = scored(html);
        let div = table.get(find(&doc, "div")).unwrap();
        assert!(div.link_density() > 0.5);
        assert!(div.score < div.own + div.received);
        assert!(div.score > 0.0);
    }

    #[test]
    fn test_depth() {
        let (doc, table) = scored("<body><div><p>x</p></div></body>");
        assert_eq!(table.get(find(&doc, "html")).unwrap().depth, 0);
        assert_eq!(table.get(find(&doc, "body")).unwrap().depth, 1);
        assert_eq!(table.get(find(&doc, "p")).unwrap().depth, 3);
    }

    #[test]
    fn test_scores_are_finite() {
        let (_, table) = scored("<body><div><p></p><a href=\"/\"></a><p>text</p></div></body>");
        for (_, s) in table.scores.iter() {
            assert!(s.score.is_finite());
        }
    }

    #[test]
    fn test_has_sentence_end() {
        assert!(has_sentence_end("This is a sentence."));
        assert!(has_sentence_end("Is this a question?"));
        assert!(has_sentence_end("结束了。"));
        assert!(!has_sentence_end("No ending here"));
        assert!(!has_sentence_end("   "));
    }
}
