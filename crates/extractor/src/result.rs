// ABOUTME: ExtractionResult holding the sanitized title and body, plus the ExtractionRecord outcome summary.
// ABOUTME: Both are serde types handed to book assembly and persistence collaborators.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, ExtractError};
use crate::formats::html_to_text;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// A cleaned article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExtractionResult {
    /// Sanitized title; empty when the page offered none.
    pub title: String,
    /// Sanitized HTML fragment.
    pub content: String,
}

impl ExtractionResult {
    /// Plain-text rendering of the content, one block per line.
    pub fn text(&self) -> String {
        html_to_text(&self.content)
    }

    /// Count words in the content using whitespace splitting.
    ///
    /// Scripts without spaces between words count each run as one word.
    pub fn word_count(&self) -> usize {
        self.text().split_whitespace().count()
    }

    /// Returns true if the result has no meaningful content.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.content.is_empty()
    }

    /// Returns true if a title was resolved.
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }
}

/// What a persistence layer keeps about one extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub title: Option<String>,
    pub success: bool,
    pub error_kind: Option<ErrorCode>,
}

impl ExtractionRecord {
    /// Summarize any extraction outcome.
    pub fn from_outcome(outcome: &Result<ExtractionResult>) -> Self {
        match outcome {
            Ok(result) => Self {
                title: result.has_title().then(|| result.title.clone()),
                success: true,
                error_kind: None,
            },
            Err(err) => Self {
                title: None,
                success: false,
                error_kind: Some(err.code),
            },
        }
    }
}

impl From<&Result<ExtractionResult>> for ExtractionRecord {
    fn from(outcome: &Result<ExtractionResult>) -> Self {
        Self::from_outcome(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ExtractionResult {
        ExtractionResult {
            title: "Lighthouse".to_string(),
            content: "<h2>Arrival</h2><p>We reached the   lighthouse at dawn.</p><p>It was cold.</p>"
                .to_string(),
        }
    }

    #[test]
    fn test_text_renders_blocks_as_lines() {
        assert_eq!(
            sample().text(),
            "Arrival\nWe reached the lighthouse at dawn.\nIt was cold."
        );
    }

    #[test]
    fn test_word_count() {
        assert_eq!(sample().word_count(), 10);
        assert_eq!(ExtractionResult::default().word_count(), 0);
    }

    #[test]
    fn test_is_empty() {
        assert!(ExtractionResult::default().is_empty());
        assert!(!sample().is_empty());
    }

    #[test]
    fn test_record_from_success() {
        let record = ExtractionRecord::from_outcome(&Ok(sample()));
        assert_eq!(
            record,
            ExtractionRecord {
                title: Some("Lighthouse".to_string()),
                success: true,
                error_kind: None,
            }
        );
    }

    #[test]
    fn test_record_from_success_without_title() {
        let outcome = Ok(ExtractionResult {
            title: String::new(),
            content: "<p>x</p>".to_string(),
        });
        assert_eq!(ExtractionRecord::from(&outcome).title, None);
    }

    #[test]
    fn test_record_from_failure_serializes() {
        let outcome: Result<ExtractionResult> = Err(ExtractError::timeout("score", None));
        let record = ExtractionRecord::from_outcome(&outcome);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"title":null,"success":false,"error_kind":"timeout"}"#
        );
    }
}
