//! Markup tokenizer.
//!
//! A single left-to-right scan that splits input into text runs and raw
//! tag bodies (the text between `<` and `>`). Tag bodies are interpreted
//! later by the tree builder. The tokenizer never fails: an unterminated
//! tag at end of input is dropped and pending text is flushed.

use super::tags;

/// Soft hyphen (U+00AD), produced by `&shy;`.
pub const SOFT_HYPHEN: char = '\u{ad}';

/// Entities decoded in text content.
const ENTITIES: &[(&str, char)] = &[("&lt;", '<'), ("&gt;", '>'), ("&shy;", SOFT_HYPHEN)];

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

/// A single token emitted by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Decoded character data.
    Text(String),
    /// Everything between `<` and `>`, e.g. `a href="x"` or `/p`.
    Tag(String),
}

// ---------------------------------------------------------------------------
// Internal types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Data,
    Tag,
    /// Inside a quoted attribute value within a tag.
    TagQuoted(char),
    /// Inside `<!-- ... -->`.
    Comment,
    /// Content of `script`/`style`; no tags until the matching end tag.
    RawText(String),
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Tokenizer over a borrowed input string.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    state: State,
    buffer: String,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            state: State::Data,
            buffer: String::new(),
            tokens: Vec::new(),
        }
    }

    /// Consume the input and return the token stream.
    pub fn tokenize(mut self) -> Vec<Token> {
        while let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
            match self.state.clone() {
                State::Data => self.state_data(ch),
                State::Tag => self.state_tag(ch),
                State::TagQuoted(quote) => self.state_tag_quoted(ch, quote),
                State::Comment => self.state_comment(ch),
                State::RawText(name) => self.state_raw_text(ch, &name),
            }
        }
        // Unterminated tags and comments are dropped.
        if matches!(self.state, State::Data | State::RawText(_)) {
            self.flush_text();
        }
        self.tokens
    }

    // -- helpers ------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn flush_text(&mut self) {
        if !self.buffer.is_empty() {
            self.tokens.push(Token::Text(std::mem::take(&mut self.buffer)));
        }
    }

    fn emit_tag(&mut self) {
        let body = std::mem::take(&mut self.buffer);
        let name = body
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        self.state = if tags::is_raw_text(&name) {
            State::RawText(name)
        } else {
            State::Data
        };
        self.tokens.push(Token::Tag(body));
    }

    // -----------------------------------------------------------------------
    // State implementations
    // -----------------------------------------------------------------------

    /// **Data**: text content; `&` may start an entity, `<` a tag.
    fn state_data(&mut self, ch: char) {
        match ch {
            '<' => {
                self.flush_text();
                self.state = State::Tag;
            },
            '&' => {
                // `pos` is already past the `&`.
                let start = self.pos - 1;
                let matched = ENTITIES
                    .iter()
                    .find(|(name, _)| self.input[start..].starts_with(name));
                match matched {
                    Some(&(name, decoded)) => {
                        self.buffer.push(decoded);
                        self.pos = start + name.len();
                    },
                    None => self.buffer.push('&'),
                }
            },
            _ => self.buffer.push(ch),
        }
    }

    /// **Tag**: after `<`, until an unquoted `>`.
    fn state_tag(&mut self, ch: char) {
        match ch {
            '>' => self.emit_tag(),
            '"' | '\'' => {
                self.buffer.push(ch);
                self.state = State::TagQuoted(ch);
            },
            '-' if self.buffer == "!-" => {
                self.buffer.clear();
                self.state = State::Comment;
            },
            _ => self.buffer.push(ch),
        }
    }

    /// **TagQuoted**: `<` and `>` are literal until the closing quote.
    fn state_tag_quoted(&mut self, ch: char, quote: char) {
        self.buffer.push(ch);
        if ch == quote {
            self.state = State::Tag;
        }
    }

    /// **Comment**: discarded through `-->`; `<!-->` and `<!--->` are
    /// complete (empty) comments.
    fn state_comment(&mut self, ch: char) {
        if ch == '>' && (self.buffer.is_empty() || self.buffer == "-" || self.buffer.ends_with("--"))
        {
            self.buffer.clear();
            self.state = State::Data;
        } else {
            self.buffer.push(ch);
        }
    }

    /// **RawText**: accumulate until `</name`, which starts the end tag.
    fn state_raw_text(&mut self, ch: char, name: &str) {
        if ch == '<' && self.rest().starts_with('/') {
            let candidate = &self.rest()[1..];
            let is_end = candidate
                .get(..name.len())
                .is_some_and(|s| s.eq_ignore_ascii_case(name));
            if is_end {
                self.flush_text();
                self.state = State::Tag;
                return;
            }
        }
        self.buffer.push(ch);
    }
}

/// Tokenize `input` in one call.
pub fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Token {
        Token::Text(s.to_string())
    }

    fn tag(s: &str) -> Token {
        Token::Tag(s.to_string())
    }

    #[test]
    fn text_and_tags() {
        assert_eq!(
            tokenize("<html>hi</html>"),
            vec![tag("html"), text("hi"), tag("/html")]
        );
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(tokenize("&lt;div&gt;"), vec![text("<div>")]);
        assert_eq!(tokenize("Hi&shy;!"), vec![text("Hi\u{ad}!")]);
    }

    #[test]
    fn unknown_entities_are_kept() {
        assert_eq!(tokenize("a &amp; b &lt"), vec![text("a &amp; b &lt")]);
    }

    #[test]
    fn quoted_attribute_may_contain_angle_brackets() {
        assert_eq!(
            tokenize("<a title=\"1 > 0\">x</a>"),
            vec![tag("a title=\"1 > 0\""), text("x"), tag("/a")]
        );
    }

    #[test]
    fn single_quotes_work_too() {
        assert_eq!(tokenize("<a b='<'>"), vec![tag("a b='<'")]);
    }

    #[test]
    fn unterminated_tag_is_dropped() {
        assert_eq!(tokenize("Hi!<hr"), vec![text("Hi!")]);
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            tokenize("a<!-- x > y -->b"),
            vec![text("a"), text("b")]
        );
        assert_eq!(tokenize("<!-->hi"), vec![text("hi")]);
        assert_eq!(tokenize("<!--->hi"), vec![text("hi")]);
    }

    #[test]
    fn doctype_is_a_bang_tag() {
        assert_eq!(tokenize("<!doctype html>"), vec![tag("!doctype html")]);
    }

    #[test]
    fn script_content_is_not_scanned() {
        assert_eq!(
            tokenize("<script>if (a<b) { x = '</p>'; }</script>after"),
            vec![
                tag("script"),
                text("if (a<b) { x = '</p>'; }"),
                tag("/script"),
                text("after"),
            ]
        );
    }

    #[test]
    fn style_content_keeps_entities_raw() {
        assert_eq!(
            tokenize("<style>p{}&lt;</STYLE>"),
            vec![tag("style"), text("p{}&lt;"), tag("/STYLE")]
        );
    }

    #[test]
    fn multibyte_text() {
        assert_eq!(tokenize("<p>⛄ 😀</p>")[1], text("⛄ 😀"));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn never_panics(input in "\\PC{0,200}") {
                let _ = tokenize(&input);
            }

            #[test]
            fn plain_text_passes_through(input in "[a-zA-Z0-9 ,.!?]{1,80}") {
                prop_assert_eq!(tokenize(&input), vec![Token::Text(input.clone())]);
            }
        }
    }
}
