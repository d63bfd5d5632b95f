//! Arena-based node tree.
//!
//! Nodes are stored in a flat `Vec` arena and linked by index. Parents own
//! their children through the `children` list; `parent` is a plain lookup
//! link back up the tree.

use std::collections::BTreeMap;
use std::fmt;

use super::tags;

/// Index into the [`Document`]'s node arena.
pub type NodeId = usize;

// ------------------------------------------------------------------
// Node types
// ------------------------------------------------------------------

/// A parsed document. `root` is the single top-level element.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub nodes: Vec<Node>,
    pub root: NodeId,
}

/// A single node in the tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Computed style. Empty until the cascade has visited the node.
    pub style: BTreeMap<String, String>,
}

/// The kind of node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
}

/// Data associated with an element node.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Lower-case tag name.
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
}

impl Node {
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(el) => Some(el.tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(t) => Some(t.as_str()),
            NodeKind::Element(_) => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(el) => el.attributes.get(name).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }
}

// ------------------------------------------------------------------
// Document
// ------------------------------------------------------------------

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node under `parent` (or detached when `None`).
    pub fn add_node(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
            style: BTreeMap::new(),
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        id
    }

    pub fn add_element(
        &mut self,
        tag: &str,
        attributes: BTreeMap<String, String>,
        parent: Option<NodeId>,
    ) -> NodeId {
        self.add_node(
            NodeKind::Element(ElementData {
                tag: tag.to_string(),
                attributes,
            }),
            parent,
        )
    }

    pub fn add_text(&mut self, text: &str, parent: Option<NodeId>) -> NodeId {
        self.add_node(NodeKind::Text(text.to_string()), parent)
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).and_then(Node::tag)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Proper ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.nodes[id].parent,
        }
    }

    /// `id` and everything below it in document (pre-)order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n].children.iter().rev());
        }
        out
    }

    /// Every element with the given tag, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        if self.is_empty() {
            return Vec::new();
        }
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.tag(id) == Some(tag))
            .collect()
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.nodes[n].text())
            .collect()
    }

    /// Serialize the subtree at `id` back to markup.
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id];
        match &node.kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attributes {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(value);
                        out.push('"');
                    }
                }
                out.push('>');
                for &child in &node.children {
                    self.write_html(child, out);
                }
                if !tags::is_void(&el.tag) {
                    out.push_str("</");
                    out.push_str(&el.tag);
                    out.push('>');
                }
            },
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        f.write_str(&self.to_html(self.root))
    }
}

/// Iterator over proper ancestors, nearest first.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.doc.nodes[id].parent;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let html = doc.add_element("html", BTreeMap::new(), None);
        doc.root = html;
        let body = doc.add_element("body", BTreeMap::new(), Some(html));
        let mut attrs = BTreeMap::new();
        attrs.insert("id".to_string(), "main".to_string());
        attrs.insert("hidden".to_string(), String::new());
        let div = doc.add_element("div", attrs, Some(body));
        let text = doc.add_text("hi", Some(div));
        doc.add_element("br", BTreeMap::new(), Some(body));
        (doc, div, text)
    }

    #[test]
    fn serializes_markup() {
        let (doc, _, _) = sample();
        assert_eq!(
            doc.to_string(),
            "<html><body><div hidden id=\"main\">hi</div><br></body></html>"
        );
    }

    #[test]
    fn ancestors_nearest_first() {
        let (doc, div, text) = sample();
        let tags: Vec<_> = doc.ancestors(text).filter_map(|id| doc.tag(id)).collect();
        assert_eq!(tags, ["div", "body", "html"]);
        assert_eq!(doc.ancestors(div).count(), 2);
        assert_eq!(doc.ancestors(doc.root).count(), 0);
    }

    #[test]
    fn descendants_in_document_order() {
        let (doc, _, _) = sample();
        let order: Vec<String> = doc
            .descendants(doc.root)
            .into_iter()
            .map(|id| match &doc.get(id).kind {
                NodeKind::Element(el) => el.tag.clone(),
                NodeKind::Text(t) => format!("#{t}"),
            })
            .collect();
        assert_eq!(order, ["html", "body", "div", "#hi", "br"]);
    }

    #[test]
    fn lookup_helpers() {
        let (doc, div, text) = sample();
        assert_eq!(doc.elements_by_tag("div"), vec![div]);
        assert_eq!(doc.get(div).attribute("id"), Some("main"));
        assert_eq!(doc.get(text).text(), Some("hi"));
        assert_eq!(doc.text_content(doc.root), "hi");
    }

    #[test]
    fn empty_document_prints_nothing() {
        assert_eq!(Document::new().to_string(), "");
        assert!(Document::new().elements_by_tag("p").is_empty());
    }
}
