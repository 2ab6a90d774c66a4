// ABOUTME: The Extractor runs the full pipeline: parse, title, preprocess, score, select, prune, sanitize.
// ABOUTME: A cooperative Deadline is checked between phases; a miss fails the call with Timeout.

use std::borrow::Cow;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::config::Config;
use crate::dom::{parser, preprocess, scoring, Document};
use crate::error::ExtractError;
use crate::extractors::{content, title};
use crate::formats;
use crate::options::{ExtractOptions, ExtractorBuilder};
use crate::result::{ExtractionResult, Result};

static DEFAULT_EXTRACTOR: Lazy<Extractor> = Lazy::new(Extractor::default);

/// Extract an article with the default configuration.
pub fn extract(raw_html: &str, options: &ExtractOptions) -> Result<ExtractionResult> {
    DEFAULT_EXTRACTOR.extract(raw_html, options)
}

/// Decode a fetched body and extract an article with the default configuration.
pub fn extract_bytes(
    body: &[u8],
    content_type: Option<&str>,
    options: &ExtractOptions,
) -> Result<ExtractionResult> {
    DEFAULT_EXTRACTOR.extract_bytes(body, content_type, options)
}

/// Article extractor.
///
/// Immutable once built; one value may serve any number of threads. Each call
/// owns its own document tree.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: Config,
}

impl Extractor {
    /// Create an extractor with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Create a new ExtractorBuilder for custom configuration.
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract the title and cleaned body of a page.
    pub fn extract(&self, raw_html: &str, options: &ExtractOptions) -> Result<ExtractionResult> {
        let config = self.effective_config(options);
        let deadline = Deadline::start(options.timeout.unwrap_or_else(|| config.timeout()));

        let input = parser::truncate_input(raw_html, config.max_input_bytes);
        let doc = parser::parse(input)?;
        debug!(bytes = input.len(), "parsed text input");
        run_pipeline(doc, &config, deadline, options)
    }

    /// Decode an undecoded fetch body, then extract.
    ///
    /// `content_type` is the response's Content-Type header, if any; without
    /// a charset there the body's `<meta charset>` or byte statistics decide.
    pub fn extract_bytes(
        &self,
        body: &[u8],
        content_type: Option<&str>,
        options: &ExtractOptions,
    ) -> Result<ExtractionResult> {
        let config = self.effective_config(options);
        let deadline = Deadline::start(options.timeout.unwrap_or_else(|| config.timeout()));

        let doc = parser::parse_bytes(body, content_type, config.max_input_bytes)?;
        debug!(bytes = body.len(), content_type = ?content_type, "parsed byte input");
        run_pipeline(doc, &config, deadline, options)
    }

    fn effective_config(&self, options: &ExtractOptions) -> Cow<'_, Config> {
        if !options.overrides_config() {
            return Cow::Borrowed(&self.config);
        }
        let mut config = self.config.clone();
        options.apply(&mut config);
        Cow::Owned(config)
    }
}

/// Everything after parsing: title, preprocess, score, select, sanitize.
fn run_pipeline(
    mut doc: Document,
    config: &Config,
    deadline: Deadline,
    options: &ExtractOptions,
) -> Result<ExtractionResult> {
    let base_url = options.base_url.as_ref();
    debug!(elements = doc.element_count(), "parsed document");
    deadline.check("parse")?;

    let title = title::resolve_title(&doc, config, base_url);
    deadline.check("title")?;

    preprocess::clean(&mut doc, config);
    deadline.check("preprocess")?;

    let scores = scoring::score(&doc, config);
    deadline.check("score")?;

    let selection = content::select(&doc, &scores, config)?;
    content::prune(&mut doc, &selection, &scores, config);
    deadline.check("select")?;

    let html = formats::sanitize(&doc, &selection, config, base_url);
    if formats::html_to_text(&html).is_empty() {
        return Err(ExtractError::no_content(
            "sanitize",
            Some(anyhow::anyhow!("selected content has no text after sanitization")),
        ));
    }
    deadline.check("sanitize")?;

    debug!(title_chars = title.chars().count(), content_bytes = html.len(), "extracted article");
    Ok(ExtractionResult {
        title,
        content: html,
    })
}

/// Wall-clock budget for one call, checked between phases.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    fn start(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    fn check(&self, phase: &str) -> Result<()> {
        let elapsed = self.started.elapsed();
        if elapsed >= self.budget {
            return Err(ExtractError::timeout(
                phase,
                Some(anyhow::anyhow!(
                    "{}ms elapsed of a {}ms budget",
                    elapsed.as_millis(),
                    self.budget.as_millis()
                )),
            ));
        }
        Ok(())
    }
}
