// ABOUTME: Error types for the extractor including the ErrorCode enum and ExtractError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error codes representing the ways a single extraction call can fail.
///
/// Every code is terminal for the call that produced it; the engine never
/// retries internally and never hands back a partial result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Empty input, or input without any element nodes.
    MalformedInput,
    /// No element reached the viability threshold.
    NoContentFound,
    /// The wall-clock budget ran out between two pipeline phases.
    Timeout,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::MalformedInput => "malformed input",
            ErrorCode::NoContentFound => "no content found",
            ErrorCode::Timeout => "extraction timeout",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for extraction.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epubpress: {}: {}", self.op, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    /// Create a MalformedInput error.
    pub fn malformed_input(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code: ErrorCode::MalformedInput,
            op: op.into(),
            source,
        }
    }

    /// Create a NoContentFound error.
    pub fn no_content(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code: ErrorCode::NoContentFound,
            op: op.into(),
            source,
        }
    }

    /// Create a Timeout error.
    pub fn timeout(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code: ErrorCode::Timeout,
            op: op.into(),
            source,
        }
    }

    /// Returns true if this is a MalformedInput error.
    pub fn is_malformed_input(&self) -> bool {
        self.code == ErrorCode::MalformedInput
    }

    /// Returns true if this is a NoContentFound error.
    pub fn is_no_content(&self) -> bool {
        self.code == ErrorCode::NoContentFound
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_op_code_and_source() {
        let err = ExtractError::no_content("select", Some(anyhow::anyhow!("best score 2.5")));
        assert_eq!(
            err.to_string(),
            "epubpress: select: no content found: best score 2.5"
        );
    }

    #[test]
    fn display_without_source() {
        let err = ExtractError::malformed_input("parse", None);
        assert_eq!(err.to_string(), "epubpress: parse: malformed input");
    }

    #[test]
    fn helpers_match_codes() {
        assert!(ExtractError::timeout("score", None).is_timeout());
        assert!(ExtractError::no_content("select", None).is_no_content());
        assert!(ExtractError::malformed_input("parse", None).is_malformed_input());
        assert!(!ExtractError::timeout("score", None).is_no_content());
    }

    #[test]
    fn error_code_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorCode::NoContentFound).unwrap();
        assert_eq!(json, "\"no_content_found\"");
    }
}
