//! CSS engine: parser, selectors, and cascade.

pub mod cascade;
pub mod parser;
pub mod selector;

pub use cascade::{INHERITED_PROPERTIES, Rule, sort_rules, style_tree};
pub use parser::{CssParser, Declarations, ParseError};
pub use selector::Selector;

/// Source of the user-agent stylesheet.
pub const BROWSER_CSS: &str = include_str!("browser.css");

/// The user-agent stylesheet, always the first layer of rules.
pub fn default_stylesheet() -> Vec<Rule> {
    CssParser::new(BROWSER_CSS).parse().unwrap_or_default()
}
