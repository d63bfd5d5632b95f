//! Tag and descendant selectors.

use std::fmt;

use crate::html::{Document, NodeId};

/// A selector: a tag name, or a descendant chain like `body p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Tag(String),
    /// `ancestor descendant`.
    Descendant(Box<Selector>, Box<Selector>),
}

impl Selector {
    /// Tag selectors count 1; descendant selectors sum their parts.
    pub fn specificity(&self) -> u32 {
        match self {
            Selector::Tag(_) => 1,
            Selector::Descendant(ancestor, descendant) => {
                ancestor.specificity() + descendant.specificity()
            },
        }
    }

    /// Whether the node `id` matches this selector.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        match self {
            Selector::Tag(tag) => doc.tag(id) == Some(tag.as_str()),
            Selector::Descendant(ancestor, descendant) => {
                descendant.matches(doc, id)
                    && doc.ancestors(id).any(|a| ancestor.matches(doc, a))
            },
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Tag(tag) => f.write_str(tag),
            Selector::Descendant(ancestor, descendant) => write!(f, "{ancestor} {descendant}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::HtmlParser;

    fn tag(name: &str) -> Selector {
        Selector::Tag(name.to_string())
    }

    fn descendant(a: Selector, d: Selector) -> Selector {
        Selector::Descendant(Box::new(a), Box::new(d))
    }

    fn doc() -> Document {
        HtmlParser::new("<body><div><p>text</p></div><p>x</p></body>").parse()
    }

    #[test]
    fn tag_selector() {
        let doc = doc();
        let div = doc.elements_by_tag("div")[0];
        assert!(tag("div").matches(&doc, div));
        assert!(!tag("p").matches(&doc, div));
    }

    #[test]
    fn text_nodes_never_match() {
        let doc = doc();
        let p = doc.elements_by_tag("p")[0];
        let text = doc.children(p)[0];
        assert!(!tag("p").matches(&doc, text));
    }

    #[test]
    fn descendant_matches_parent() {
        let doc = doc();
        let div = doc.elements_by_tag("div")[0];
        assert!(descendant(tag("body"), tag("div")).matches(&doc, div));
        assert!(!descendant(tag("body"), tag("p")).matches(&doc, div));
    }

    #[test]
    fn descendant_matches_grandparent() {
        let doc = doc();
        let inner_p = doc.elements_by_tag("p")[0];
        assert!(descendant(tag("body"), tag("p")).matches(&doc, inner_p));
        assert!(descendant(tag("div"), tag("p")).matches(&doc, inner_p));
    }

    #[test]
    fn descendant_requires_proper_ancestor() {
        let doc = doc();
        let outer_p = doc.elements_by_tag("p")[1];
        assert!(!descendant(tag("div"), tag("p")).matches(&doc, outer_p));
        let div = doc.elements_by_tag("div")[0];
        assert!(!descendant(tag("div"), tag("div")).matches(&doc, div));
    }

    #[test]
    fn chained_descendants() {
        let doc = doc();
        let inner_p = doc.elements_by_tag("p")[0];
        let chain = descendant(descendant(tag("html"), tag("div")), tag("p"));
        assert!(chain.matches(&doc, inner_p));
        assert_eq!(chain.specificity(), 3);
        assert_eq!(chain.to_string(), "html div p");
    }
}
