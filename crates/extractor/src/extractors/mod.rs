// ABOUTME: Extraction phases that run on a parsed Document: content selection/pruning and title resolution.
// ABOUTME: Field helpers read metadata from the untouched tree.

//! Extraction phases.
//!
//! Submodules:
//! - `content`: picks the article root, merges siblings, prunes boilerplate.
//! - `title`: resolves and sanitizes the article title.
//! - `fields`: meta/element text lookups shared by the title resolver.

pub mod content;
pub mod fields;
pub mod title;
