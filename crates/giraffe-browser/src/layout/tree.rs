//! The layout tree: an arena of positioned boxes.

use std::sync::Arc;

use super::font::Font;
use crate::html::NodeId;

/// Index into the [`LayoutTree`]'s box arena.
pub type BoxId = usize;

/// What a box represents.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutKind {
    /// The viewport-wide root box.
    Document,
    /// A block holding either block children or lines.
    Block,
    /// One line of inline content.
    Line,
    /// A single word (or `pre` line) placed on a line.
    Text {
        word: String,
        font: Arc<Font>,
        color: String,
        superscript: bool,
    },
}

/// A positioned box. Coordinates are in pixels from the page origin.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub kind: LayoutKind,
    /// The DOM node this box was generated for.
    pub node: NodeId,
    pub parent: Option<BoxId>,
    /// The preceding sibling, if any.
    pub previous: Option<BoxId>,
    pub children: Vec<BoxId>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutBox {
    pub fn new(kind: LayoutKind, node: NodeId) -> Self {
        Self {
            kind,
            node,
            parent: None,
            previous: None,
            children: Vec::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// The word of a text box.
    pub fn word(&self) -> Option<&str> {
        match &self.kind {
            LayoutKind::Text { word, .. } => Some(word),
            _ => None,
        }
    }

    pub fn font(&self) -> Option<&Arc<Font>> {
        match &self.kind {
            LayoutKind::Text { font, .. } => Some(font),
            _ => None,
        }
    }
}

/// Boxes for one layout pass. Rebuilt from scratch each time.
#[derive(Debug, Clone, Default)]
pub struct LayoutTree {
    pub boxes: Vec<LayoutBox>,
    pub root: BoxId,
}

impl LayoutTree {
    /// Append `layout_box` under `parent`, linking it after the current
    /// last child.
    pub fn push(&mut self, mut layout_box: LayoutBox, parent: Option<BoxId>) -> BoxId {
        let id = self.boxes.len();
        layout_box.parent = parent;
        if let Some(pid) = parent {
            layout_box.previous = self.boxes[pid].children.last().copied();
            self.boxes[pid].children.push(id);
        }
        self.boxes.push(layout_box);
        id
    }

    pub fn get(&self, id: BoxId) -> &LayoutBox {
        &self.boxes[id]
    }

    pub fn get_mut(&mut self, id: BoxId) -> &mut LayoutBox {
        &mut self.boxes[id]
    }

    pub fn children(&self, id: BoxId) -> &[BoxId] {
        &self.boxes[id].children
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Total height of the laid-out content.
    pub fn height(&self) -> f32 {
        self.boxes.get(self.root).map_or(0.0, |b| b.height)
    }

    /// Box ids in pre-order (parents before children).
    pub fn preorder(&self) -> Vec<BoxId> {
        let mut out = Vec::with_capacity(self.boxes.len());
        if self.boxes.is_empty() {
            return out;
        }
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.boxes[id].children.iter().rev());
        }
        out
    }

    /// Every text box in document order.
    pub fn text_boxes(&self) -> Vec<&LayoutBox> {
        self.preorder()
            .into_iter()
            .map(|id| &self.boxes[id])
            .filter(|b| matches!(b.kind, LayoutKind::Text { .. }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_links_parent_and_previous() {
        let mut tree = LayoutTree::default();
        let root = tree.push(LayoutBox::new(LayoutKind::Document, 0), None);
        let a = tree.push(LayoutBox::new(LayoutKind::Block, 1), Some(root));
        let b = tree.push(LayoutBox::new(LayoutKind::Block, 2), Some(root));

        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.get(a).previous, None);
        assert_eq!(tree.get(b).previous, Some(a));
        assert_eq!(tree.get(b).parent, Some(root));
    }

    #[test]
    fn preorder_visits_parents_first() {
        let mut tree = LayoutTree::default();
        let root = tree.push(LayoutBox::new(LayoutKind::Document, 0), None);
        let a = tree.push(LayoutBox::new(LayoutKind::Block, 1), Some(root));
        let b = tree.push(LayoutBox::new(LayoutKind::Block, 2), Some(root));
        let a1 = tree.push(LayoutBox::new(LayoutKind::Line, 1), Some(a));
        assert_eq!(tree.preorder(), vec![root, a, a1, b]);
    }

    #[test]
    fn empty_tree() {
        let tree = LayoutTree::default();
        assert!(tree.is_empty());
        assert!(tree.preorder().is_empty());
        assert_eq!(tree.height(), 0.0);
    }
}
