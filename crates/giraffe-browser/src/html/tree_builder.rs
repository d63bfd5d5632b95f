//! Tree builder.
//!
//! Consumes the token stream and builds the arena tree with a stack of
//! open elements. Malformed markup never fails: stray closing tags are
//! dropped, repeated `p`/`li` siblings close their predecessor, and missing
//! `html`/`head`/`body` elements are synthesized.

use std::collections::BTreeMap;

use super::dom::{Document, NodeId};
use super::tags;
use super::tokenizer::Token;

// ------------------------------------------------------------------
// Tag body parsing
// ------------------------------------------------------------------

/// Split a raw tag body (`div id="main" hidden`) into a lower-case name and
/// its attributes. Quoted values are kept verbatim; bare words become
/// attributes with an empty value.
pub fn parse_tag(body: &str) -> (String, BTreeMap<String, String>) {
    let body = body.trim();
    let body = match body.strip_suffix('/') {
        Some(inner) if !inner.is_empty() => inner.trim_end(),
        _ => body,
    };

    let mut parts = split_outside_quotes(body).into_iter();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();

    let mut attributes = BTreeMap::new();
    for part in parts {
        let (key, value) = match part.split_once('=') {
            Some((key, value)) => (key, unquote(value)),
            None => (part.as_str(), ""),
        };
        if !key.is_empty() {
            attributes.insert(key.to_ascii_lowercase(), value.to_string());
        }
    }
    (name, attributes)
}

/// Split on whitespace that is not inside a quoted value.
fn split_outside_quotes(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for ch in s.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            },
            None if ch == '"' || ch == '\'' => {
                current.push(ch);
                quote = Some(ch);
            },
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            },
            None => current.push(ch),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

// ------------------------------------------------------------------
// TreeBuilder
// ------------------------------------------------------------------

/// Builds a [`Document`] from tokens.
pub struct TreeBuilder {
    doc: Document,
    /// Stack of open element node IDs; index 0 is the root.
    unfinished: Vec<NodeId>,
    implicit_tags: bool,
}

impl TreeBuilder {
    pub fn new(implicit_tags: bool) -> Self {
        Self {
            doc: Document::new(),
            unfinished: Vec::new(),
            implicit_tags,
        }
    }

    /// Build a tree from a token stream.
    pub fn build(tokens: Vec<Token>, implicit_tags: bool) -> Document {
        let mut builder = TreeBuilder::new(implicit_tags);
        for token in tokens {
            match token {
                Token::Text(text) => builder.add_text(&text),
                Token::Tag(body) => builder.add_tag(&body),
            }
        }
        builder.finish()
    }

    /// Append a text run to the innermost open element.
    pub fn add_text(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.insert_implicit_tags(None);
        match self.unfinished.last() {
            Some(&parent) => {
                self.doc.add_text(text, Some(parent));
            },
            None => log::debug!("dropping text outside any element"),
        }
    }

    /// Process one raw tag body.
    pub fn add_tag(&mut self, body: &str) {
        let (tag, attributes) = parse_tag(body);
        if tag.is_empty() || tag.starts_with('!') {
            return;
        }
        self.insert_implicit_tags(Some(&tag));

        if let Some(name) = tag.strip_prefix('/') {
            self.close(name);
        } else if self.unfinished.is_empty() {
            self.push_element(&tag, attributes);
        } else if tags::is_void(&tag) {
            let parent = self.unfinished.last().copied();
            self.doc.add_element(&tag, attributes, parent);
        } else {
            if tag == "p" || tag == "li" {
                // Repeated siblings close their predecessor instead of nesting.
                if let Some(index) = self.find_open(&tag) {
                    self.unfinished.truncate(index);
                }
            }
            self.push_element(&tag, attributes);
        }
    }

    /// Close every open element and return the document.
    pub fn finish(mut self) -> Document {
        if self.doc.is_empty() {
            if self.implicit_tags {
                self.insert_implicit_tags(None);
            } else {
                self.push_element("html", BTreeMap::new());
            }
        }
        self.unfinished.clear();
        self.doc
    }

    // -- helpers ------------------------------------------------------------

    fn push_element(&mut self, tag: &str, attributes: BTreeMap<String, String>) {
        let parent = self.unfinished.last().copied();
        let id = self.doc.add_element(tag, attributes, parent);
        if parent.is_none() {
            self.doc.root = id;
        }
        self.unfinished.push(id);
    }

    fn close(&mut self, name: &str) {
        if name == "p" || name == "li" {
            if let Some(index) = self.find_open(name) {
                self.unfinished.truncate(index);
            }
            return;
        }
        // The root is only closed by `finish`.
        let is_open = self
            .unfinished
            .iter()
            .skip(1)
            .any(|&id| self.doc.tag(id) == Some(name));
        if is_open {
            self.unfinished.pop();
        }
    }

    /// Stack index of the innermost open `tag` above the root. List items
    /// are not searched for past an enclosing list.
    fn find_open(&self, tag: &str) -> Option<usize> {
        for (index, &id) in self.unfinished.iter().enumerate().skip(1).rev() {
            let open = self.doc.tag(id);
            if open == Some(tag) {
                return Some(index);
            }
            if tag == "li" && matches!(open, Some("ul" | "ol")) {
                return None;
            }
        }
        None
    }

    fn stack_is(&self, expected: &[&str]) -> bool {
        self.unfinished.len() == expected.len()
            && self
                .unfinished
                .iter()
                .zip(expected)
                .all(|(&id, tag)| self.doc.tag(id) == Some(*tag))
    }

    /// Synthesize `html`, `head`, `body`, or `/head` until the tree shape
    /// admits `tag` (`None` for text).
    fn insert_implicit_tags(&mut self, tag: Option<&str>) {
        if !self.implicit_tags {
            return;
        }
        loop {
            if self.unfinished.is_empty() && tag != Some("html") {
                self.push_element("html", BTreeMap::new());
            } else if self.stack_is(&["html"]) && !matches!(tag, Some("head" | "body" | "/html")) {
                let implicit = if tag.is_some_and(tags::is_head_tag) {
                    "head"
                } else {
                    "body"
                };
                self.push_element(implicit, BTreeMap::new());
            } else if self.stack_is(&["html", "head"])
                && tag != Some("/head")
                && !tag.is_some_and(tags::is_head_tag)
            {
                self.unfinished.pop();
            } else {
                break;
            }
        }
    }
}
