// ABOUTME: Content root selection with sibling merging, and pruning of boilerplate inside the selection.
// ABOUTME: Works from a ScoreTable; fails with NoContentFound when nothing clears the viability threshold.

//! Content selection.
//!
//! Key behaviors:
//! - Only candidate tags whose score beats `min_score`, whose text reaches
//!   `min_text_length` and whose link density stays within
//!   `max_link_density` are considered.
//! - Highest score wins; ties prefer the shallower node, then document order.
//! - A winning paragraph is promoted to its container when the container
//!   scores nearly as well.
//! - Siblings close to the winning score, or prose paragraphs, are merged in
//!   document order.
//! - Pruning drops boilerplate descendants but never more than
//!   `max_prune_fraction` of the selection's text.

use ego_tree::NodeId;
use scraper::ElementRef;
use tracing::debug;

use crate::config::Config;
use crate::dom::scoring::{has_sentence_end, Candidate, ScoreTable};
use crate::dom::{tag_name, Document};
use crate::error::ExtractError;
use crate::result::Result;
use crate::text::KeywordHits;

/// The selected article region.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRoot {
    /// Winning element.
    pub root: NodeId,
    /// Winning score.
    pub score: f64,
    /// Root plus merged siblings, in document order.
    pub nodes: Vec<NodeId>,
}

/// Pick the content root and merge qualifying siblings.
pub fn select(doc: &Document, scores: &ScoreTable, config: &Config) -> Result<ContentRoot> {
    let mut best: Option<(Candidate, usize)> = None;

    for el in doc.elements() {
        if !is_viable(&el, scores, config) {
            continue;
        }
        let Some(entry) = scores.get(el.id()) else {
            continue;
        };

        let better = match best {
            None => true,
            Some((top, depth)) => {
                entry.score > top.score || (entry.score == top.score && entry.depth < depth)
            }
        };
        if better {
            best = Some((
                Candidate {
                    id: el.id(),
                    score: entry.score,
                },
                entry.depth,
            ));
        }
    }

    let Some((mut top, _)) = best else {
        return Err(ExtractError::no_content(
            "select",
            Some(anyhow::anyhow!(
                "no element scored above {} with at least {} characters",
                config.min_score,
                config.min_text_length
            )),
        ));
    };

    if let Some(parent) = promote_paragraph(doc, top, scores, config) {
        debug!(from = top.score, to = parent.score, "promoted paragraph to container");
        top = parent;
    }

    let nodes = merge_siblings(doc, top, scores, config);
    debug!(
        score = top.score,
        tag = doc.element(top.id).map(|el| tag_name(&el)).unwrap_or(""),
        merged = nodes.len() - 1,
        "selected content root"
    );

    Ok(ContentRoot {
        root: top.id,
        score: top.score,
        nodes,
    })
}

fn is_viable(el: &ElementRef, scores: &ScoreTable, config: &Config) -> bool {
    if !config.is_candidate_tag(tag_name(el)) {
        return false;
    }
    let Some(entry) = scores.get(el.id()) else {
        return false;
    };
    entry.score > config.min_score
        && entry.text_len >= config.min_text_length
        && entry.link_density() <= config.max_link_density
}

fn promote_paragraph(
    doc: &Document,
    top: Candidate,
    scores: &ScoreTable,
    config: &Config,
) -> Option<Candidate> {
    let el = doc.element(top.id)?;
    if !config.is_paragraph_tag(tag_name(&el)) {
        return None;
    }
    let parent = el.parent().and_then(ElementRef::wrap)?;
    if matches!(tag_name(&parent), "body" | "html") {
        return None;
    }

    let parent_score = scores.score_of(parent.id());
    let within_margin = parent_score >= top.score * (1.0 - config.sibling_margin);
    if within_margin && scores.link_density(parent.id()) <= config.max_link_density {
        Some(Candidate {
            id: parent.id(),
            score: parent_score,
        })
    } else {
        None
    }
}

/// Merge siblings that may be part of the main content
fn merge_siblings(
    doc: &Document,
    top: Candidate,
    scores: &ScoreTable,
    config: &Config,
) -> Vec<NodeId> {
    let Some(candidate) = doc.element(top.id) else {
        return vec![top.id];
    };
    let Some(parent) = candidate.parent() else {
        return vec![top.id];
    };

    let threshold = top.score * (1.0 - config.sibling_margin);
    let candidate_class = candidate.value().attr("class").unwrap_or("");
    let mut included = Vec::new();

    for sibling in parent.children().filter_map(ElementRef::wrap) {
        if sibling.id() == top.id {
            included.push(sibling.id());
            continue;
        }
        if !config.is_candidate_tag(tag_name(&sibling)) {
            continue;
        }
        let Some(entry) = scores.get(sibling.id()) else {
            continue;
        };
        if entry.score <= 0.0 {
            continue;
        }
        let density = entry.link_density();

        let mut bonus = 0.0;
        let sibling_class = sibling.value().attr("class").unwrap_or("");
        if !sibling_class.is_empty() && sibling_class == candidate_class {
            bonus += top.score * config.sibling_class_bonus;
        }

        if entry.score + bonus >= threshold && density < config.sibling_max_link_density {
            included.push(sibling.id());
            continue;
        }

        // Special handling for paragraphs
        if tag_name(&sibling) == "p" {
            let text_len = entry.text_len;
            if text_len > config.sibling_paragraph_min_chars
                && density < config.sibling_max_link_density
            {
                included.push(sibling.id());
                continue;
            }

            let text = sibling.text().collect::<String>();
            if text_len > 0
                && text_len <= config.sibling_paragraph_min_chars
                && density == 0.0
                && has_sentence_end(&text)
            {
                included.push(sibling.id());
            }
        }
    }

    included
}

/// Drop boilerplate descendants from the selection. Returns how many
/// subtrees were removed.
pub fn prune(
    doc: &mut Document,
    content: &ContentRoot,
    scores: &ScoreTable,
    config: &Config,
) -> usize {
    let total: usize = content.nodes.iter().map(|id| scores.text_len(*id)).sum();
    let budget = (total as f64 * config.max_prune_fraction).floor() as usize;
    let mut removed_text = 0usize;
    let mut doomed: Vec<NodeId> = Vec::new();
    let mut skipped = 0usize;

    for &id in &content.nodes {
        let Some(root) = doc.element(id) else {
            continue;
        };
        let mut stack: Vec<ElementRef> = root.children().filter_map(ElementRef::wrap).collect();
        stack.reverse();

        while let Some(el) = stack.pop() {
            if is_boilerplate(&el, scores, config) {
                let len = scores.text_len(el.id());
                if removed_text + len <= budget {
                    removed_text += len;
                    doomed.push(el.id());
                    continue;
                }
                skipped += 1;
            }
            let start = stack.len();
            stack.extend(el.children().filter_map(ElementRef::wrap));
            stack[start..].reverse();
        }
    }

    let count = doomed.len();
    for id in doomed {
        doc.detach(id);
    }

    debug!(
        pruned = count,
        removed_text,
        total_text = total,
        over_budget = skipped,
        "pruned selection"
    );
    count
}

fn is_boilerplate(el: &ElementRef, scores: &ScoreTable, config: &Config) -> bool {
    let name = tag_name(el);
    if config.is_negative_tag(name) {
        return true;
    }

    if name != "a" {
        let class = el.value().attr("class").unwrap_or("");
        let id = el.value().attr("id").unwrap_or("");
        if KeywordHits::classify(class, id, config).is_unlikely() {
            return true;
        }
    }

    config.is_density_prune_tag(name) && scores.link_density(el.id()) > config.max_link_density
}
