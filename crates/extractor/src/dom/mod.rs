// ABOUTME: DOM layer over scraper's arena tree: the per-call Document plus parse, clean and score phases.
// ABOUTME: Traversals always start at the root element so detached arena nodes are never revisited.

//! DOM utilities for the extraction pipeline.
//!
//! A [`Document`] owns one `scraper::Html` for the duration of a single
//! extraction. Elements are addressed by `ego_tree::NodeId`; parent links are
//! arena indices, so score propagation never needs owning back-pointers.

pub mod parser;
pub mod preprocess;
pub mod scoring;

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Node};

/// The parsed page for one extraction call.
#[derive(Debug)]
pub struct Document {
    html: Html,
}

impl Document {
    pub(crate) fn from_html(html: Html) -> Self {
        Self { html }
    }

    /// The `<html>` element.
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// Element by arena id.
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    /// Attached elements in document order, root included.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.root().descendants().filter_map(ElementRef::wrap)
    }

    pub fn element_count(&self) -> usize {
        self.elements().count()
    }

    /// Serialize an element and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        self.element(id).map(|el| el.html()).unwrap_or_default()
    }

    /// Unlink a node from its parent. The arena slot stays allocated but is
    /// unreachable from the root.
    pub(crate) fn detach(&mut self, id: NodeId) {
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Replace the contents of a text node.
    pub(crate) fn set_text(&mut self, id: NodeId, text: &str) {
        if let Some(mut node) = self.html.tree.get_mut(id) {
            if let Node::Text(t) = node.value() {
                t.text = text.into();
            }
        }
    }
}

/// Lowercase tag name of an element.
pub fn tag_name<'a>(el: &ElementRef<'a>) -> &'a str {
    el.value().name()
}
