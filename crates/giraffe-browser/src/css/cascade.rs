//! Cascade and inheritance.
//!
//! One top-down pass over the tree. Each node starts from its parent's
//! inherited properties, then every matching rule is applied in cascade
//! order, then the inline `style` attribute. Percentage font sizes are
//! turned into pixels against the parent as the node is visited.

use std::collections::BTreeMap;

use super::parser::{self, Declarations};
use super::selector::Selector;
use crate::html::{Document, NodeId};

/// Inherited properties and their values at the root.
pub const INHERITED_PROPERTIES: &[(&str, &str)] = &[
    ("font-size", "16px"),
    ("font-style", "normal"),
    ("font-weight", "normal"),
    ("color", "black"),
];

/// Root font size in pixels, used when a parent size cannot be read.
const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// A selector with its declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: Selector,
    pub declarations: Declarations,
    pub specificity: u32,
}

impl Rule {
    pub fn new(selector: Selector, declarations: Declarations) -> Self {
        let specificity = selector.specificity();
        Self {
            selector,
            declarations,
            specificity,
        }
    }

    /// Sort key: rules with a higher priority are applied later.
    pub fn cascade_priority(&self) -> u32 {
        self.specificity
    }
}

/// Stable sort by ascending priority, so sheet order breaks ties.
pub fn sort_rules(rules: &mut [Rule]) {
    rules.sort_by_key(Rule::cascade_priority);
}

/// Compute `style` for every node in `doc`.
///
/// `rules` may be in any order; they are applied by ascending priority with
/// ties broken by position in the slice.
pub fn style_tree(doc: &mut Document, rules: &[Rule]) {
    if doc.is_empty() {
        return;
    }
    let mut ordered: Vec<&Rule> = rules.iter().collect();
    ordered.sort_by_key(|rule| rule.cascade_priority());

    // Pre-order: every parent is styled before its children.
    for id in doc.descendants(doc.root) {
        let style = compute_style(doc, id, &ordered);
        doc.get_mut(id).style = style;
    }
}

fn compute_style(doc: &Document, id: NodeId, rules: &[&Rule]) -> BTreeMap<String, String> {
    let parent_style = doc.get(id).parent.map(|p| &doc.get(p).style);

    let mut style = BTreeMap::new();
    for &(property, default) in INHERITED_PROPERTIES {
        let value = parent_style
            .and_then(|s| s.get(property))
            .map_or(default, String::as_str);
        style.insert(property.to_string(), value.to_string());
    }

    for rule in rules {
        if rule.selector.matches(doc, id) {
            for (property, value) in &rule.declarations {
                style.insert(property.clone(), value.clone());
            }
        }
    }

    if let Some(inline) = doc.get(id).attribute("style") {
        style.extend(parser::parse_inline(inline));
    }

    if let Some(size) = style.get("font-size")
        && let Some(percent) = size.strip_suffix('%')
    {
        let parent_px = parent_style
            .and_then(|s| s.get("font-size"))
            .and_then(|s| parse_px(s))
            .unwrap_or(DEFAULT_FONT_SIZE_PX);
        let resolved = match percent.trim().parse::<f32>() {
            Ok(percent) => format!("{}px", parent_px * percent / 100.0),
            Err(_) => format!("{parent_px}px"),
        };
        style.insert("font-size".to_string(), resolved);
    }

    style
}

/// Parse `"12px"` (or a bare number) into pixels.
pub fn parse_px(value: &str) -> Option<f32> {
    let value = value.trim();
    value.strip_suffix("px").unwrap_or(value).trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::CssParser;
    use crate::html::HtmlParser;

    fn styled(html: &str, css: &str) -> Document {
        let mut doc = HtmlParser::new(html).parse();
        let rules = CssParser::new(css).parse().unwrap();
        style_tree(&mut doc, &rules);
        doc
    }

    fn style_of<'a>(doc: &'a Document, tag: &str, property: &str) -> &'a str {
        let id = doc.elements_by_tag(tag)[0];
        doc.get(id).style[property].as_str()
    }

    #[test]
    fn defaults_at_root() {
        let doc = styled("<p>x</p>", "");
        for &(property, default) in INHERITED_PROPERTIES {
            assert_eq!(doc.get(doc.root).style[property], default);
        }
    }

    #[test]
    fn every_node_gets_inherited_properties() {
        let doc = styled("<p>x<b>y</b></p>", "p { color: red; }");
        for node in &doc.nodes {
            for &(property, _) in INHERITED_PROPERTIES {
                assert!(node.style.contains_key(property));
            }
        }
    }

    #[test]
    fn values_inherit_to_text() {
        let doc = styled("<p>x</p>", "p { color: red; }");
        let p = doc.elements_by_tag("p")[0];
        let text = doc.children(p)[0];
        assert_eq!(doc.get(text).style["color"], "red");
    }

    #[test]
    fn non_inherited_properties_stay_put() {
        let doc = styled("<div><p>x</p></div>", "div { background-color: gray; }");
        assert_eq!(style_of(&doc, "div", "background-color"), "gray");
        let p = doc.elements_by_tag("p")[0];
        assert!(!doc.get(p).style.contains_key("background-color"));
    }

    #[test]
    fn more_specific_rule_wins_regardless_of_order() {
        for css in [
            "body { color: blue; } body p { color: red; }",
            "body p { color: red; } body { color: blue; }",
            "p { color: green; } body p { color: red; }",
            "body p { color: red; } p { color: green; }",
        ] {
            let doc = styled("<body><p>x</p></body>", css);
            assert_eq!(style_of(&doc, "p", "color"), "red", "css: {css}");
        }
    }

    #[test]
    fn later_rule_wins_on_equal_specificity() {
        let doc = styled("<p>x</p>", "p { color: red; } p { color: blue; }");
        assert_eq!(style_of(&doc, "p", "color"), "blue");
    }

    #[test]
    fn inline_style_beats_rules() {
        let doc = styled(
            "<p style=\"color: green; margin: 0\">x</p>",
            "body p { color: red; }",
        );
        assert_eq!(style_of(&doc, "p", "color"), "green");
        assert_eq!(style_of(&doc, "p", "margin"), "0");
    }

    #[test]
    fn percentage_font_size_resolves_against_parent() {
        let doc = styled(
            "<div><small>x<small>y</small></small></div>",
            "div { font-size: 20px; } small { font-size: 50%; }",
        );
        let outer = doc.elements_by_tag("small")[0];
        let inner = doc.elements_by_tag("small")[1];
        assert_eq!(doc.get(outer).style["font-size"], "10px");
        assert_eq!(doc.get(inner).style["font-size"], "5px");
    }

    #[test]
    fn inline_percentage_is_resolved_too() {
        let doc = styled("<p style=\"font-size: 150%\">x</p>", "");
        assert_eq!(style_of(&doc, "p", "font-size"), "24px");
    }

    #[test]
    fn bad_percentage_falls_back_to_parent_size() {
        let doc = styled("<p style=\"font-size: abc%\">x</p>", "");
        assert_eq!(style_of(&doc, "p", "font-size"), "16px");
    }

    #[test]
    fn sort_rules_is_stable() {
        let mut rules = CssParser::new("a b { x: 1; } i { x: 2; } b { x: 3; }")
            .parse()
            .unwrap();
        sort_rules(&mut rules);
        let order: Vec<String> = rules.iter().map(|r| r.selector.to_string()).collect();
        assert_eq!(order, ["i", "b", "a b"]);
    }

    #[test]
    fn px_parsing() {
        assert_eq!(parse_px("16px"), Some(16.0));
        assert_eq!(parse_px(" 12.5px "), Some(12.5));
        assert_eq!(parse_px("14"), Some(14.0));
        assert_eq!(parse_px("1em"), None);
    }
}
