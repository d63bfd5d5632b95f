//! Paint: flattens the layout tree into draw commands.
//!
//! Commands come out in document order, a block's background before its
//! content, so a surface can replay them front to back. Each command knows
//! its own vertical extent for clipping against the visible scroll range.

use std::sync::Arc;

use crate::html::Document;
use crate::layout::{Font, LayoutKind, LayoutTree};

/// A single drawing primitive, in page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Text {
        left: f32,
        top: f32,
        text: String,
        font: Arc<Font>,
        color: String,
    },
    Rect {
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        color: String,
    },
}

impl DrawCommand {
    pub fn top(&self) -> f32 {
        match self {
            DrawCommand::Text { top, .. } | DrawCommand::Rect { top, .. } => *top,
        }
    }

    pub fn bottom(&self) -> f32 {
        match self {
            DrawCommand::Text { top, font, .. } => top + font.linespace(),
            DrawCommand::Rect { bottom, .. } => *bottom,
        }
    }

    /// Whether any part of the command falls inside the window
    /// `[scroll, scroll + height)`.
    pub fn is_visible(&self, scroll: f32, height: f32) -> bool {
        self.bottom() >= scroll && self.top() < scroll + height
    }
}

// -------------------------------------------------------------------
// Tree walk
// -------------------------------------------------------------------

/// Emit the draw commands for `tree`. `doc` supplies the block styles.
pub fn paint_tree(tree: &LayoutTree, doc: &Document) -> Vec<DrawCommand> {
    let mut out = Vec::new();
    for id in tree.preorder() {
        let b = tree.get(id);
        match &b.kind {
            LayoutKind::Block => {
                let background = doc
                    .nodes
                    .get(b.node)
                    .and_then(|node| node.style.get("background-color"));
                if let Some(color) = background
                    && color != "transparent"
                {
                    out.push(DrawCommand::Rect {
                        left: b.x,
                        top: b.y,
                        right: b.right(),
                        bottom: b.bottom(),
                        color: color.clone(),
                    });
                }
            },
            // Blank lines keep their height in layout but draw nothing.
            LayoutKind::Text { word, .. } if word.is_empty() => {},
            LayoutKind::Text {
                word, font, color, ..
            } => out.push(DrawCommand::Text {
                left: b.x,
                top: b.y,
                text: word.clone(),
                font: Arc::clone(font),
                color: color.clone(),
            }),
            LayoutKind::Document | LayoutKind::Line => {},
        }
    }
    out
}
