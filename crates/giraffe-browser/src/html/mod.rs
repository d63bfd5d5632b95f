//! HTML engine: tokenizer, tree builder, and node tree.

pub mod dom;
pub mod tags;
pub mod tokenizer;
pub mod tree_builder;

use std::collections::BTreeMap;

pub use dom::{Document, ElementData, Node, NodeId, NodeKind};
pub use tokenizer::SOFT_HYPHEN;

use tree_builder::TreeBuilder;

/// Entry point for turning markup into a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct HtmlParser<'a> {
    body: &'a str,
    implicit_tags: bool,
}

impl<'a> HtmlParser<'a> {
    pub fn new(body: &'a str) -> Self {
        Self {
            body,
            implicit_tags: true,
        }
    }

    /// Enable or disable synthesis of missing `html`/`head`/`body`.
    pub fn with_implicit_tags(mut self, enabled: bool) -> Self {
        self.implicit_tags = enabled;
        self
    }

    pub fn parse(&self) -> Document {
        TreeBuilder::build(tokenizer::tokenize(self.body), self.implicit_tags)
    }

    /// Wrap the raw markup in a single `view-source` element without
    /// interpreting it.
    pub fn view_source(body: &str) -> Document {
        let mut doc = Document::new();
        let root = doc.add_element("view-source", BTreeMap::new(), None);
        doc.root = root;
        doc.add_text(body, Some(root));
        doc
    }
}
