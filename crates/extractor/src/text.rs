// ABOUTME: Text helpers shared by the pipeline: whitespace collapsing, entity decoding, keyword tokens.
// ABOUTME: Character counts here are Unicode scalar counts so non-Latin scripts score like Latin ones.

use crate::config::Config;

/// Collapse runs of whitespace into single spaces and trim both ends.
pub fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Count characters that are not whitespace.
pub fn visible_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Count clause separators, including the full-width and Arabic forms.
pub fn count_commas(text: &str) -> usize {
    text.chars()
        .filter(|c| matches!(c, ',' | '，' | '、' | '،'))
        .count()
}

/// Decodes HTML entities left in text after parsing (double-encoded metadata, mostly).
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut result = s.to_string();

    let entities = [
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&apos;", "'"),
        ("&#39;", "'"),
        ("&nbsp;", " "),
        ("&ndash;", "–"),
        ("&mdash;", "—"),
        ("&lsquo;", "\u{2018}"),
        ("&rsquo;", "\u{2019}"),
        ("&ldquo;", "\u{201C}"),
        ("&rdquo;", "\u{201D}"),
        ("&laquo;", "«"),
        ("&raquo;", "»"),
        ("&hellip;", "…"),
        ("&copy;", "©"),
        ("&reg;", "®"),
        ("&trade;", "™"),
        ("&bull;", "•"),
        ("&middot;", "·"),
        ("&euro;", "€"),
        ("&pound;", "£"),
    ];

    for (entity, replacement) in &entities {
        result = result.replace(entity, replacement);
    }

    result = decode_numeric_entities(&result);

    // Last, so "&amp;lt;" decodes one level only.
    result.replace("&amp;", "&")
}

/// Decodes numeric HTML entities like &#123; and &#x7B;
fn decode_numeric_entities(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '&' || chars.peek() != Some(&'#') {
            result.push(c);
            continue;
        }

        chars.next();
        let is_hex = matches!(chars.peek(), Some('x') | Some('X'));
        if is_hex {
            chars.next();
        }

        let mut num_str = String::new();
        let mut terminated = false;
        while let Some(&nc) = chars.peek() {
            if nc == ';' {
                chars.next();
                terminated = true;
                break;
            }
            let is_digit = if is_hex {
                nc.is_ascii_hexdigit()
            } else {
                nc.is_ascii_digit()
            };
            if !is_digit {
                break;
            }
            num_str.push(nc);
            chars.next();
        }

        let radix = if is_hex { 16 } else { 10 };
        let decoded = u32::from_str_radix(&num_str, radix)
            .ok()
            .and_then(char::from_u32);

        match decoded {
            Some(ch) if !num_str.is_empty() => result.push(ch),
            _ => {
                result.push_str("&#");
                if is_hex {
                    result.push('x');
                }
                result.push_str(&num_str);
                if terminated {
                    result.push(';');
                }
            }
        }
    }

    result
}

/// Split class and id values into lowercase alphanumeric tokens.
///
/// `"post-body entry_content"` yields `post`, `body`, `entry`, `content`.
pub fn keyword_tokens(class: &str, id: &str) -> Vec<String> {
    class
        .split(|c: char| !c.is_alphanumeric())
        .chain(id.split(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// A keyword matches a token exactly, or as a prefix when it is at least three
/// characters long (`comment` matches `comments`, `ad` does not match `address`).
pub fn keyword_matches(tokens: &[String], keywords: &[String]) -> bool {
    tokens.iter().any(|token| {
        keywords.iter().any(|kw| {
            token == kw || (kw.chars().count() >= 3 && token.starts_with(kw.as_str()))
        })
    })
}

/// Keyword signal for an element's class and id, as used by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeywordHits {
    pub positive: bool,
    pub negative: bool,
    pub keep: bool,
}

impl KeywordHits {
    pub fn classify(class: &str, id: &str, config: &Config) -> Self {
        let tokens = keyword_tokens(class, id);
        if tokens.is_empty() {
            return Self::default();
        }
        Self {
            positive: keyword_matches(&tokens, &config.positive_keywords),
            negative: keyword_matches(&tokens, &config.negative_keywords),
            keep: keyword_matches(&tokens, &config.keep_keywords),
        }
    }

    /// Net score contribution.
    pub fn weight(&self, keyword_weight: f64) -> f64 {
        let mut weight = 0.0;
        if self.positive {
            weight += keyword_weight;
        }
        if self.negative {
            weight -= keyword_weight;
        }
        weight
    }

    /// Boilerplate by name, with nothing in the name vouching for it.
    pub fn is_unlikely(&self) -> bool {
        self.negative && !self.keep
    }
}
