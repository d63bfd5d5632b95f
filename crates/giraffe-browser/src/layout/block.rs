//! Block layout: the document box and vertically stacked blocks.

use super::font::FontCache;
use super::inline;
use super::tree::{BoxId, LayoutBox, LayoutKind, LayoutTree};
use super::LayoutContext;
use crate::config::BrowserConfig;
use crate::html::{Document, NodeId, NodeKind, tags};

/// How a node's content is arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// One block box per child, stacked top to bottom.
    Block,
    /// Words flowed into lines.
    Inline,
}

/// Block mode when any child element is block-level; inline for text and
/// for elements with children; block for empty elements.
pub fn layout_mode(doc: &Document, id: NodeId) -> LayoutMode {
    let node = doc.get(id);
    match &node.kind {
        NodeKind::Text(_) => LayoutMode::Inline,
        NodeKind::Element(_) => {
            if node
                .children
                .iter()
                .any(|&child| doc.tag(child).is_some_and(tags::is_block_level))
            {
                LayoutMode::Block
            } else if !node.children.is_empty() {
                LayoutMode::Inline
            } else {
                LayoutMode::Block
            }
        },
    }
}

fn is_rendered(doc: &Document, id: NodeId) -> bool {
    doc.tag(id).is_none_or(tags::is_rendered)
}

// -------------------------------------------------------------------
// Tree construction
// -------------------------------------------------------------------

impl LayoutTree {
    /// Lay out `doc` at the configured viewport width.
    pub fn build(doc: &Document, fonts: &mut FontCache, config: &BrowserConfig) -> Self {
        Self::build_with_width(doc, fonts, config, config.viewport_width)
    }

    /// Lay out `doc` for a viewport `viewport_width` pixels wide.
    pub fn build_with_width(
        doc: &Document,
        fonts: &mut FontCache,
        config: &BrowserConfig,
        viewport_width: u32,
    ) -> Self {
        let hstep = config.hstep as f32;
        let mut tree = LayoutTree::default();
        let mut document = LayoutBox::new(LayoutKind::Document, doc.root);
        document.x = hstep;
        document.y = config.vstep as f32;
        document.width = (viewport_width as f32 - 2.0 * hstep).max(0.0);
        tree.root = tree.push(document, None);
        if doc.is_empty() {
            return tree;
        }

        let mut cx = LayoutContext {
            doc,
            fonts,
            config,
            tree,
        };
        let root = cx.tree.root;
        let child = cx
            .tree
            .push(LayoutBox::new(LayoutKind::Block, doc.root), Some(root));
        cx.layout_block(child);
        cx.tree.get_mut(root).height = cx.tree.get(child).height;
        cx.tree
    }
}

impl LayoutContext<'_> {
    /// Position the block `id` under its parent and lay out its content.
    pub(crate) fn layout_block(&mut self, id: BoxId) {
        let (x, y, width) = {
            let this = self.tree.get(id);
            let parent = this.parent.map(|p| self.tree.get(p));
            let x = parent.map_or(0.0, |p| p.x);
            let width = parent.map_or(0.0, |p| p.width);
            let y = match (this.previous, parent) {
                (Some(prev), _) => self.tree.get(prev).bottom(),
                (None, Some(parent)) => parent.y,
                (None, None) => 0.0,
            };
            (x, y, width)
        };
        let this = self.tree.get_mut(id);
        this.x = x;
        this.y = y;
        this.width = width;

        let doc = self.doc;
        let node = this.node;
        let height = match layout_mode(doc, node) {
            LayoutMode::Block => {
                for &child in doc.children(node) {
                    if !is_rendered(doc, child) {
                        continue;
                    }
                    let child_box = self
                        .tree
                        .push(LayoutBox::new(LayoutKind::Block, child), Some(id));
                    self.layout_block(child_box);
                }
                self.tree
                    .children(id)
                    .iter()
                    .map(|&c| self.tree.get(c).height)
                    .sum()
            },
            LayoutMode::Inline => inline::layout_lines(self, id),
        };
        self.tree.get_mut(id).height = height;
    }
}
