//! Layout engine: turns a styled node tree into positioned boxes.
//!
//! A `Document` box spans the viewport minus the horizontal margins. Below
//! it, nodes with block-level children stack as blocks; everything else is
//! flowed into lines of words. Fonts come from a [`FontCache`].

pub mod block;
pub mod font;
pub mod inline;
pub mod tree;

pub use block::{LayoutMode, layout_mode};
pub use font::{Font, FontCache, FontKey, FontMetrics, SimpleTextMeasurer, Slant, TextMeasurer, Weight};
pub use tree::{BoxId, LayoutBox, LayoutKind, LayoutTree};

use crate::config::BrowserConfig;
use crate::html::Document;

/// State shared by the block and inline passes while a tree is built.
pub(crate) struct LayoutContext<'a> {
    pub doc: &'a Document,
    pub fonts: &'a mut FontCache,
    pub config: &'a BrowserConfig,
    pub tree: LayoutTree,
}
