// ABOUTME: Per-call ExtractOptions and the ExtractorBuilder used to construct configured extractors.
// ABOUTME: Both are fluent; options override the extractor's Config for a single call only.

use std::time::Duration;

use url::Url;

use crate::config::Config;
use crate::extractor::Extractor;

/// Per-call overrides.
///
/// ```
/// use std::time::Duration;
/// use epubpress_extractor::ExtractOptions;
///
/// let options = ExtractOptions::new()
///     .base_url(url::Url::parse("https://blog.example.com/post/1").unwrap())
///     .min_text_length(100)
///     .timeout(Duration::from_secs(2));
/// assert_eq!(options.min_text_length, Some(100));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractOptions {
    /// Base for resolving relative links and images, and a site-name hint
    /// for the title.
    pub base_url: Option<Url>,
    pub min_text_length: Option<usize>,
    pub timeout: Option<Duration>,
}

impl ExtractOptions {
    /// Options that change nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL.
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set the minimum text length of the content root.
    pub fn min_text_length(mut self, chars: usize) -> Self {
        self.min_text_length = Some(chars);
        self
    }

    /// Set the wall-clock budget for the call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether any field changes the extractor's configuration.
    pub(crate) fn overrides_config(&self) -> bool {
        self.min_text_length.is_some()
    }

    pub(crate) fn apply(&self, config: &mut Config) {
        if let Some(chars) = self.min_text_length {
            config.min_text_length = chars;
        }
    }
}

/// Builder for constructing Extractor instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ExtractorBuilder {
    config: Config,
}

impl ExtractorBuilder {
    /// Create a new ExtractorBuilder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the minimum text length of the content root.
    pub fn min_text_length(mut self, chars: usize) -> Self {
        self.config.min_text_length = chars;
        self
    }

    /// Set the default per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the input size above which pages are truncated before parsing.
    pub fn max_input_bytes(mut self, bytes: usize) -> Self {
        self.config.max_input_bytes = bytes;
        self
    }

    /// Build the Extractor with the configured options.
    pub fn build(self) -> Extractor {
        Extractor::new(self.config)
    }
}

impl Default for ExtractorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default_changes_nothing() {
        let options = ExtractOptions::default();
        assert!(!options.overrides_config());
        let mut config = Config::default();
        options.apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_options_apply_min_text_length() {
        let options = ExtractOptions::new().min_text_length(400);
        assert!(options.overrides_config());
        let mut config = Config::default();
        options.apply(&mut config);
        assert_eq!(config.min_text_length, 400);
    }

    #[test]
    fn test_builder_sets_config_fields() {
        let extractor = ExtractorBuilder::new()
            .min_text_length(10)
            .timeout(Duration::from_millis(250))
            .max_input_bytes(1024)
            .build();
        assert_eq!(extractor.config().min_text_length, 10);
        assert_eq!(extractor.config().timeout(), Duration::from_millis(250));
        assert_eq!(extractor.config().max_input_bytes, 1024);
    }

    #[test]
    fn test_builder_config_then_override() {
        let config = Config {
            min_score: 12.0,
            ..Config::default()
        };
        let extractor = ExtractorBuilder::new().config(config).min_text_length(50).build();
        assert_eq!(extractor.config().min_score, 12.0);
        assert_eq!(extractor.config().min_text_length, 50);
    }
}
