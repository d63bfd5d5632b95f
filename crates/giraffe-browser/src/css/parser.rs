//! CSS parser.
//!
//! A scanning parser over a borrowed string. It understands the small
//! grammar the engine needs: rules made of tag and descendant selectors and
//! `property: value;` declarations. In the default (lenient) mode errors
//! are recovered by skipping ahead; strict mode reports the first one.

use std::collections::BTreeMap;

use super::cascade::Rule;
use super::selector::Selector;

/// A parse failure and the byte offset where it happened.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    fn new(message: &str, position: usize) -> Self {
        Self {
            message: message.to_string(),
            position,
        }
    }
}

/// Declarations keyed by lower-case property name.
pub type Declarations = BTreeMap<String, String>;

/// Scanning CSS parser.
#[derive(Debug, Clone)]
pub struct CssParser<'a> {
    s: &'a str,
    i: usize,
    strict: bool,
}

impl<'a> CssParser<'a> {
    /// A lenient parser that recovers from errors.
    pub fn new(s: &'a str) -> Self {
        Self {
            s,
            i: 0,
            strict: false,
        }
    }

    /// A parser that fails on the first error.
    pub fn strict(s: &'a str) -> Self {
        Self {
            strict: true,
            ..Self::new(s)
        }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.i
    }

    fn peek(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    // -- productions --------------------------------------------------------

    pub fn whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.i += ch.len_utf8();
        }
    }

    /// A run of alphanumerics and `#-.%`.
    pub fn word(&mut self) -> Result<&'a str, ParseError> {
        let start = self.i;
        while let Some(ch) = self.peek() {
            if !(ch.is_alphanumeric() || "#-.%".contains(ch)) {
                break;
            }
            self.i += ch.len_utf8();
        }
        if self.i == start {
            return Err(ParseError::new("expected a word", self.i));
        }
        Ok(&self.s[start..self.i])
    }

    pub fn literal(&mut self, expected: char) -> Result<(), ParseError> {
        if self.peek() != Some(expected) {
            return Err(ParseError::new(&format!("expected '{expected}'"), self.i));
        }
        self.i += expected.len_utf8();
        Ok(())
    }

    /// `property : value`, with the property lower-cased.
    pub fn pair(&mut self) -> Result<(String, String), ParseError> {
        let property = self.word()?.to_lowercase();
        self.whitespace();
        self.literal(':')?;
        self.whitespace();
        let value = self.word()?.to_string();
        Ok((property, value))
    }

    /// Declarations up to a closing `}` or the end of input.
    pub fn body(&mut self) -> Result<Declarations, ParseError> {
        let mut pairs = Declarations::new();
        while self.peek().is_some_and(|ch| ch != '}') {
            if let Err(e) = self.declaration(&mut pairs) {
                if self.strict {
                    return Err(e);
                }
                log::debug!("skipping bad declaration: {e}");
                match self.skip_until(&[';', '}']) {
                    Some(';') => {
                        self.i += 1;
                        self.whitespace();
                    },
                    _ => break,
                }
            }
        }
        Ok(pairs)
    }

    fn declaration(&mut self, pairs: &mut Declarations) -> Result<(), ParseError> {
        let (property, value) = self.pair()?;
        // Recorded before the `;` check so a final declaration without one
        // still counts.
        pairs.insert(property, value);
        self.whitespace();
        self.literal(';')?;
        self.whitespace();
        Ok(())
    }

    /// A tag selector, left-folded into descendant selectors.
    pub fn selector(&mut self) -> Result<Selector, ParseError> {
        let mut out = Selector::Tag(self.word()?.to_lowercase());
        self.whitespace();
        while self.peek().is_some_and(|ch| ch != '{') {
            let tag = self.word()?.to_lowercase();
            out = Selector::Descendant(Box::new(out), Box::new(Selector::Tag(tag)));
            self.whitespace();
        }
        Ok(out)
    }

    /// A whole stylesheet.
    pub fn parse(&mut self) -> Result<Vec<Rule>, ParseError> {
        let mut rules = Vec::new();
        self.whitespace();
        while self.i < self.s.len() {
            match self.rule() {
                Ok(rule) => rules.push(rule),
                Err(e) if self.strict => return Err(e),
                Err(e) => {
                    log::debug!("skipping bad rule: {e}");
                    match self.skip_until(&['}']) {
                        Some(_) => self.i += 1,
                        None => break,
                    }
                },
            }
            self.whitespace();
        }
        Ok(rules)
    }

    fn rule(&mut self) -> Result<Rule, ParseError> {
        let selector = self.selector()?;
        self.literal('{')?;
        self.whitespace();
        let declarations = self.body()?;
        self.literal('}')?;
        Ok(Rule::new(selector, declarations))
    }

    /// Advance to the next character in `stops`, returning it.
    fn skip_until(&mut self, stops: &[char]) -> Option<char> {
        while let Some(ch) = self.peek() {
            if stops.contains(&ch) {
                return Some(ch);
            }
            self.i += ch.len_utf8();
        }
        None
    }
}

/// Parse an inline `style` attribute leniently.
pub fn parse_inline(style: &str) -> Declarations {
    CssParser::new(style).body().unwrap_or_default()
}
