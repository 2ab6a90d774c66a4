// ABOUTME: Immutable extraction configuration: tag tables, keyword sets, thresholds, and allow-lists.
// ABOUTME: Defaults are static tables; hosts may override any field from JSON via serde.

//! Extraction configuration.
//!
//! A [`Config`] is passed by reference into every pipeline phase. It is never
//! mutated during a call, so one value can be shared by any number of
//! concurrent extractions. Per-call overrides live in
//! [`ExtractOptions`](crate::ExtractOptions).

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Elements removed together with their content during preprocessing.
const STRIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "form", "template", "object", "embed", "svg",
    "canvas", "link", "meta",
];

/// Elements kept by preprocessing even when they carry no text.
const KEEP_EMPTY_TAGS: &[&str] = &[
    "html", "head", "body", "img", "br", "hr", "video", "audio", "picture", "source", "td",
    "th",
];

/// Elements whose text is left verbatim by whitespace normalization.
const PRESERVE_WHITESPACE_TAGS: &[&str] = &["pre", "code", "textarea"];

/// Block-level elements; text touching them is trimmed.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "dd", "details", "div", "dl",
    "dt", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head",
    "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Prose-bearing elements with a positive base score.
const PARAGRAPH_TAGS: &[&str] = &["p", "pre", "blockquote"];

/// Page-furniture elements with a strongly negative base score.
const NEGATIVE_TAGS: &[&str] = &["nav", "aside", "footer", "header", "form"];

/// Elements never chosen as the article root.
const NON_CANDIDATE_TAGS: &[&str] = &[
    "html", "head", "a", "abbr", "area", "b", "base", "basefont", "br", "code", "em", "hr",
    "i", "img", "input", "label", "link", "meta", "small", "span", "strong", "sub", "sup",
    "time", "title", "u",
];

/// Containers dropped from the selection when they are mostly link text.
const DENSITY_PRUNE_TAGS: &[&str] = &[
    "div", "section", "ul", "ol", "dl", "table", "aside", "nav", "footer", "header",
];

/// class/id tokens that suggest article content.
const POSITIVE_KEYWORDS: &[&str] = &[
    "article", "body", "content", "entry", "hentry", "main", "post", "story", "text", "blog",
    "prose",
];

/// class/id tokens that suggest boilerplate.
const NEGATIVE_KEYWORDS: &[&str] = &[
    "ad", "ads", "advert", "banner", "breadcrumb", "combx", "comment", "community", "disqus",
    "footer", "header", "masthead", "menu", "nav", "newsletter", "outbrain", "pager",
    "pagination", "popup", "promo", "related", "remark", "respond", "share", "shoutbox",
    "sidebar", "social", "sponsor", "subscribe", "taboola", "widget",
];

/// class/id tokens that shield an element from keyword pruning.
const KEEP_KEYWORDS: &[&str] = &["article", "body", "column", "content", "main", "shadow"];

/// Tags the sanitizer lets through.
const ALLOWED_TAGS: &[&str] = &[
    "p", "a", "img", "b", "i", "em", "strong", "blockquote", "ul", "ol", "li", "h1", "h2",
    "h3", "h4", "h5", "h6", "br", "pre", "code",
];

/// Tags the sanitizer drops together with their text.
const DROP_CONTENT_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "form", "template", "textarea", "select",
    "button", "svg",
];

const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Immutable configuration shared by every pipeline phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Preprocessing tables.
    pub strip_tags: Vec<String>,
    pub keep_empty_tags: Vec<String>,
    pub preserve_whitespace_tags: Vec<String>,
    pub block_tags: Vec<String>,

    // Scoring tables and weights.
    pub paragraph_tags: Vec<String>,
    pub negative_tags: Vec<String>,
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub paragraph_base_score: f64,
    pub negative_tag_score: f64,
    pub keyword_weight: f64,
    /// Characters of directly owned text per length-bonus point.
    pub length_bonus_chars: usize,
    pub length_bonus_cap: f64,
    pub comma_bonus_cap: f64,
    pub parent_weight: f64,
    pub grandparent_weight: f64,
    pub max_link_density: f64,

    // Selection.
    pub non_candidate_tags: Vec<String>,
    pub min_score: f64,
    pub min_text_length: usize,
    /// Fraction of the winning score a sibling or parent may fall short by and still merge.
    pub sibling_margin: f64,
    pub sibling_class_bonus: f64,
    pub sibling_max_link_density: f64,
    pub sibling_paragraph_min_chars: usize,

    // Pruning.
    pub keep_keywords: Vec<String>,
    pub density_prune_tags: Vec<String>,
    pub max_prune_fraction: f64,

    // Output.
    pub allowed_tags: Vec<String>,
    pub generic_attributes: Vec<String>,
    pub tag_attributes: BTreeMap<String, Vec<String>>,
    pub drop_content_tags: Vec<String>,
    pub url_schemes: Vec<String>,

    // Title.
    pub title_max_chars: usize,

    // Resource limits.
    pub max_input_bytes: usize,
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let mut tag_attributes = BTreeMap::new();
        tag_attributes.insert("a".to_string(), strings(&["href"]));
        tag_attributes.insert("img".to_string(), strings(&["src", "alt"]));

        Self {
            strip_tags: strings(STRIP_TAGS),
            keep_empty_tags: strings(KEEP_EMPTY_TAGS),
            preserve_whitespace_tags: strings(PRESERVE_WHITESPACE_TAGS),
            block_tags: strings(BLOCK_TAGS),

            paragraph_tags: strings(PARAGRAPH_TAGS),
            negative_tags: strings(NEGATIVE_TAGS),
            positive_keywords: strings(POSITIVE_KEYWORDS),
            negative_keywords: strings(NEGATIVE_KEYWORDS),
            paragraph_base_score: 3.0,
            negative_tag_score: -25.0,
            keyword_weight: 25.0,
            length_bonus_chars: 100,
            length_bonus_cap: 3.0,
            comma_bonus_cap: 3.0,
            parent_weight: 0.5,
            grandparent_weight: 0.25,
            max_link_density: 0.5,

            non_candidate_tags: strings(NON_CANDIDATE_TAGS),
            min_score: 5.0,
            min_text_length: 25,
            sibling_margin: 0.25,
            sibling_class_bonus: 0.2,
            sibling_max_link_density: 0.25,
            sibling_paragraph_min_chars: 80,

            keep_keywords: strings(KEEP_KEYWORDS),
            density_prune_tags: strings(DENSITY_PRUNE_TAGS),
            max_prune_fraction: 0.7,

            allowed_tags: strings(ALLOWED_TAGS),
            generic_attributes: strings(&["title"]),
            tag_attributes,
            drop_content_tags: strings(DROP_CONTENT_TAGS),
            url_schemes: strings(URL_SCHEMES),

            title_max_chars: 200,

            max_input_bytes: 10 * 1024 * 1024,
            timeout_ms: 10_000,
        }
    }
}

fn contains(list: &[String], tag: &str) -> bool {
    list.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

impl Config {
    /// Parse a configuration from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The default per-call wall-clock budget.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn is_strip_tag(&self, tag: &str) -> bool {
        contains(&self.strip_tags, tag)
    }

    pub fn is_keep_empty_tag(&self, tag: &str) -> bool {
        contains(&self.keep_empty_tags, tag)
    }

    pub fn is_preserve_whitespace_tag(&self, tag: &str) -> bool {
        contains(&self.preserve_whitespace_tags, tag)
    }

    pub fn is_block_tag(&self, tag: &str) -> bool {
        contains(&self.block_tags, tag)
    }

    pub fn is_paragraph_tag(&self, tag: &str) -> bool {
        contains(&self.paragraph_tags, tag)
    }

    pub fn is_negative_tag(&self, tag: &str) -> bool {
        contains(&self.negative_tags, tag)
    }

    pub fn is_candidate_tag(&self, tag: &str) -> bool {
        !contains(&self.non_candidate_tags, tag)
    }

    pub fn is_density_prune_tag(&self, tag: &str) -> bool {
        contains(&self.density_prune_tags, tag)
    }
}
