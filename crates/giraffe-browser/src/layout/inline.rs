//! Inline layout: words flowed into lines.
//!
//! Text is split into words (or into source lines inside `pre`) and placed
//! left to right until the next word would overflow the block. Each line
//! then settles its words on a shared baseline so mixed sizes align.
//! Overflowing words that carry soft hyphens are broken at the right-most
//! hyphen that still fits.

use std::sync::Arc;

use super::LayoutContext;
use super::font::{Font, FontKey, Slant, Weight};
use super::tree::{BoxId, LayoutBox, LayoutKind};
use crate::css::cascade::parse_px;
use crate::html::{NodeId, NodeKind, SOFT_HYPHEN, tags};

/// CSS pixels to font points.
const PX_TO_PT: f32 = 0.75;
const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// Lay out the subtree under block `block` as lines. Returns the total
/// height of the lines.
pub(crate) fn layout_lines(cx: &mut LayoutContext<'_>, block: BoxId) -> f32 {
    let (node, x, y, width) = {
        let b = cx.tree.get(block);
        (b.node, b.x, b.y, b.width)
    };
    let mut lines = LineBuilder {
        cx,
        block,
        x,
        top: y,
        y,
        width,
        cursor_x: 0.0,
        line: Vec::new(),
    };
    lines.recurse(node);
    if !lines.line.is_empty() {
        lines.flush();
    }
    lines.y - lines.top
}

// -------------------------------------------------------------------
// Text style
// -------------------------------------------------------------------

/// Everything needed to place the words of one text node.
#[derive(Debug, Clone)]
struct TextStyle {
    font: Arc<Font>,
    color: String,
    superscript: bool,
    uppercase: bool,
    preformatted: bool,
}

impl LayoutContext<'_> {
    /// Resolve the font for a text node from its computed style, then
    /// apply the tag overrides of its ancestors.
    fn text_style(&mut self, node: NodeId) -> TextStyle {
        let doc = self.doc;
        let config = self.config;
        let style = &doc.get(node).style;
        let px = style
            .get("font-size")
            .and_then(|s| parse_px(s))
            .unwrap_or(DEFAULT_FONT_SIZE_PX);
        let mut size = (px * PX_TO_PT) as u32;
        let mut weight = style.get("font-weight").map_or(Weight::Normal, |v| Weight::from_css(v));
        let mut slant = style.get("font-style").map_or(Slant::Roman, |v| Slant::from_css(v));
        let color = style
            .get("color")
            .cloned()
            .unwrap_or_else(|| "black".to_string());

        let mut family = config.font_family.as_str();
        let mut superscript = false;
        let mut uppercase = false;
        let mut preformatted = false;
        for ancestor in doc.ancestors(node) {
            match doc.tag(ancestor) {
                Some("pre") => {
                    family = config.monospace_family.as_str();
                    preformatted = true;
                },
                Some("b") => weight = Weight::Bold,
                Some("abbr") => {
                    weight = Weight::Bold;
                    uppercase = true;
                },
                Some("i") => slant = Slant::Italic,
                Some("sup") => superscript = true,
                _ => {},
            }
        }
        if superscript {
            size /= 2;
        }

        let font = self.fonts.get(FontKey {
            weight,
            slant,
            ..FontKey::new(family, size)
        });
        TextStyle {
            font,
            color,
            superscript,
            uppercase,
            preformatted,
        }
    }
}

// -------------------------------------------------------------------
// Line builder
// -------------------------------------------------------------------

/// A word waiting for its line to be finished.
#[derive(Debug)]
struct PendingWord {
    node: NodeId,
    word: String,
    style: Arc<TextStyle>,
    /// Offset from the start of the line.
    x: f32,
    width: f32,
}

struct LineBuilder<'c, 'a> {
    cx: &'c mut LayoutContext<'a>,
    block: BoxId,
    x: f32,
    top: f32,
    /// Top of the line being filled.
    y: f32,
    width: f32,
    cursor_x: f32,
    line: Vec<PendingWord>,
}

impl LineBuilder<'_, '_> {
    fn recurse(&mut self, node: NodeId) {
        let doc = self.cx.doc;
        match &doc.get(node).kind {
            NodeKind::Text(text) => self.text(node, text),
            NodeKind::Element(el) => {
                if !tags::is_rendered(&el.tag) {
                    return;
                }
                if el.tag == "br" {
                    // A break on an empty line still leaves a blank line.
                    if self.line.is_empty() {
                        let style = Arc::new(self.cx.text_style(node));
                        self.push(node, "", 0.0, &style);
                    }
                    self.flush();
                    return;
                }
                for &child in doc.children(node) {
                    self.recurse(child);
                }
            },
        }
    }

    fn text(&mut self, node: NodeId, text: &str) {
        let style = Arc::new(self.cx.text_style(node));
        let text = if style.uppercase {
            text.to_uppercase()
        } else {
            text.to_string()
        };
        if style.preformatted {
            for (i, piece) in text.lines().enumerate() {
                if i > 0 {
                    self.flush();
                }
                self.word(node, piece, &style);
            }
        } else {
            for word in text.split_whitespace() {
                self.word(node, word, &style);
            }
        }
    }

    fn measure(&self, font: &Font, text: &str) -> f32 {
        self.cx.fonts.measure(font, text)
    }

    /// Place `word`, wrapping and hyphenating as needed.
    fn word(&mut self, node: NodeId, word: &str, style: &Arc<TextStyle>) {
        let mut word = word;
        loop {
            let width = self.measure(&style.font, word);
            if self.cursor_x + width <= self.width {
                self.push(node, word, width, style);
                return;
            }
            if !word.contains(SOFT_HYPHEN) {
                if !self.line.is_empty() {
                    self.flush();
                }
                self.push(node, word, width, style);
                return;
            }

            let room = self.width - self.cursor_x;
            let (head, tail) = match self.fit_at_soft_hyphen(word, &style.font, room) {
                Some(split) => split,
                None if !self.line.is_empty() => {
                    self.flush();
                    continue;
                },
                None => split_at_first_soft_hyphen(word),
            };
            let head_width = self.measure(&style.font, head);
            self.push(node, head, head_width, style);
            if tail.is_empty() {
                return;
            }
            self.flush();
            word = tail;
        }
    }

    /// Longest prefix ending in a soft hyphen that fits in `room`.
    fn fit_at_soft_hyphen<'w>(
        &self,
        word: &'w str,
        font: &Font,
        room: f32,
    ) -> Option<(&'w str, &'w str)> {
        word.match_indices(SOFT_HYPHEN).rev().find_map(|(i, shy)| {
            let cut = i + shy.len();
            let head = &word[..cut];
            (cut < word.len() && self.measure(font, head) <= room).then(|| (head, &word[cut..]))
        })
    }

    fn push(&mut self, node: NodeId, word: &str, width: f32, style: &Arc<TextStyle>) {
        self.line.push(PendingWord {
            node,
            word: word.to_string(),
            style: Arc::clone(style),
            x: self.cursor_x,
            width,
        });
        self.cursor_x += width;
        if !style.preformatted {
            self.cursor_x += self.measure(&style.font, " ");
        }
    }

    /// Finish the current line: settle its words on the baseline and
    /// start a new, empty line below it.
    fn flush(&mut self) {
        let spacing = self.cx.config.line_spacing;
        let max_ascent = self
            .line
            .iter()
            .map(|w| w.style.font.ascent())
            .fold(0.0, f32::max);
        let max_descent = self
            .line
            .iter()
            .map(|w| w.style.font.descent())
            .fold(0.0, f32::max);
        let baseline = self.y + spacing * max_ascent;
        let height = if self.line.is_empty() {
            0.0
        } else {
            spacing * (max_ascent + max_descent)
        };

        let block_node = self.cx.tree.get(self.block).node;
        let mut line = LayoutBox::new(LayoutKind::Line, block_node);
        line.x = self.x;
        line.y = self.y;
        line.width = self.width;
        line.height = height;
        let line_id = self.cx.tree.push(line, Some(self.block));

        for word in self.line.drain(..) {
            let font = &word.style.font;
            let mut text = LayoutBox::new(
                LayoutKind::Text {
                    word: word.word,
                    font: Arc::clone(font),
                    color: word.style.color.clone(),
                    superscript: word.style.superscript,
                },
                word.node,
            );
            text.x = self.x + word.x;
            text.y = if word.style.superscript {
                baseline - max_ascent
            } else {
                baseline - font.ascent()
            };
            text.width = word.width;
            text.height = font.linespace();
            self.cx.tree.push(text, Some(line_id));
        }

        self.y += height;
        self.cursor_x = 0.0;
    }
}

/// Cut after the first soft hyphen, keeping the hyphen on the head.
fn split_at_first_soft_hyphen(word: &str) -> (&str, &str) {
    match word.find(SOFT_HYPHEN) {
        Some(i) => word.split_at(i + SOFT_HYPHEN.len_utf8()),
        None => (word, ""),
    }
}
