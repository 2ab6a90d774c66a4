// ABOUTME: Main library entry point for the EpubPress article extractor.
// ABOUTME: Re-exports the public API: Extractor, ExtractOptions, Config, ExtractionResult, ExtractError.

//! EpubPress extractor - turns an arbitrary web page into one clean article.
//!
//! The engine parses raw HTML, scores every element for article-ness, selects
//! and prunes the best region, and sanitizes it into a fragment that can be
//! embedded in an ebook. The title is resolved from the untouched document.
//!
//! # Example
//!
//! ```
//! use epubpress_extractor::{extract, ExtractOptions};
//!
//! let html = r#"<html><head><title>A Day at the Lighthouse | Example Blog</title></head><body>
//!     <div class="post-body">
//!       <p>The first paragraph of a reasonably long article body, with enough words to count.</p>
//!       <p>The second paragraph continues the story, adding detail, context, and a conclusion.</p>
//!     </div></body></html>"#;
//!
//! let article = extract(html, &ExtractOptions::default()).unwrap();
//! assert_eq!(article.title, "A Day at the Lighthouse");
//! assert!(article.content.contains("second paragraph"));
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod extractor;
pub mod extractors;
pub mod formats;
pub mod options;
pub mod result;
pub mod text;

pub use crate::config::Config;
pub use crate::error::{ErrorCode, ExtractError};
pub use crate::extractor::{extract, extract_bytes, Extractor};
pub use crate::extractors::title::sanitize_title;
pub use crate::formats::sanitize_html;
pub use crate::options::{ExtractOptions, ExtractorBuilder};
pub use crate::result::{ExtractionRecord, ExtractionResult, Result};
