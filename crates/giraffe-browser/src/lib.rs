//! Giraffe document pipeline.
//!
//! Fetches a document through [`giraffe_net`], parses it into a node tree,
//! cascades the user-agent sheet plus the page's own stylesheets onto it,
//! and lays it out into a flat list of draw commands. The [`Engine`] owns
//! the network session and the font cache; each load produces a [`Page`].

pub mod config;
pub mod css;
pub mod html;
pub mod layout;
pub mod paint;

// -----------------------------------------------------------------------
// Public re-exports
// -----------------------------------------------------------------------

pub use config::BrowserConfig;
pub use giraffe_net::{Session, Url};
pub use giraffe_types::error::{GiraffeError, Result};
pub use html::{Document, HtmlParser};
pub use layout::{FontCache, LayoutTree, SimpleTextMeasurer, TextMeasurer};
pub use paint::DrawCommand;

use css::{CssParser, Rule, style_tree};
use giraffe_net::ABOUT_BLANK;

// -----------------------------------------------------------------------
// LoadTarget
// -----------------------------------------------------------------------

/// What to load: a URL string still to be parsed, or a parsed [`Url`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    Str(String),
    Url(Url),
}

impl From<&str> for LoadTarget {
    fn from(s: &str) -> Self {
        LoadTarget::Str(s.to_string())
    }
}

impl From<String> for LoadTarget {
    fn from(s: String) -> Self {
        LoadTarget::Str(s)
    }
}

impl From<Url> for LoadTarget {
    fn from(url: Url) -> Self {
        LoadTarget::Url(url)
    }
}

impl From<&Url> for LoadTarget {
    fn from(url: &Url) -> Self {
        LoadTarget::Url(url.clone())
    }
}

// -----------------------------------------------------------------------
// Page
// -----------------------------------------------------------------------

/// A loaded, styled, and laid-out document.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub document: Document,
    pub layout: LayoutTree,
    pub display_list: Vec<DrawCommand>,
    /// Height of the page including the top and bottom margins.
    pub height: f32,
}

impl Page {
    /// Largest useful scroll offset for a viewport `viewport_height` tall.
    pub fn max_scroll(&self, viewport_height: f32) -> f32 {
        (self.height - viewport_height).max(0.0)
    }

    /// Draw commands that intersect the window starting at `scroll`.
    pub fn visible(&self, scroll: f32, viewport_height: f32) -> impl Iterator<Item = &DrawCommand> {
        self.display_list
            .iter()
            .filter(move |c| c.is_visible(scroll, viewport_height))
    }
}

// -----------------------------------------------------------------------
// Engine
// -----------------------------------------------------------------------

/// Loads documents and keeps the state shared between loads.
pub struct Engine {
    config: BrowserConfig,
    session: Session,
    fonts: FontCache,
    /// The parsed user-agent stylesheet.
    default_rules: Vec<Rule>,
}

impl Engine {
    pub fn new(config: BrowserConfig) -> Self {
        let measurer = SimpleTextMeasurer::new(&config.monospace_family);
        Self::with_measurer(config, Box::new(measurer))
    }

    /// An engine that measures text with `measurer`.
    pub fn with_measurer(config: BrowserConfig, measurer: Box<dyn TextMeasurer>) -> Self {
        Self {
            session: Session::new(config.net.clone()),
            fonts: FontCache::new(measurer),
            default_rules: css::default_stylesheet(),
            config,
        }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn fonts(&self) -> &FontCache {
        &self.fonts
    }

    /// Fetch, parse, style, and lay out `target`.
    pub fn load(&mut self, target: impl Into<LoadTarget>) -> Result<Page> {
        let url = match target.into() {
            LoadTarget::Str(s) => Url::parse(&s)?,
            LoadTarget::Url(url) => url,
        };
        log::info!("loading {url}");
        let body = self.session.request(&url)?;
        Ok(self.render(url, &body))
    }

    /// Like [`load`](Self::load), but any failure yields `about:blank`.
    pub fn load_or_blank(&mut self, target: impl Into<LoadTarget>) -> Page {
        match self.load(target) {
            Ok(page) => page,
            Err(e) => {
                log::warn!("load failed, showing about:blank: {e}");
                self.render(Url::about_blank(), ABOUT_BLANK)
            },
        }
    }

    /// Recompute layout and paint for a viewport `width` pixels wide.
    pub fn relayout(&mut self, page: &mut Page, width: u32) {
        page.layout =
            LayoutTree::build_with_width(&page.document, &mut self.fonts, &self.config, width);
        page.display_list = paint::paint_tree(&page.layout, &page.document);
        page.height = page.layout.height() + 2.0 * self.config.vstep as f32;
    }

    fn render(&mut self, url: Url, body: &str) -> Page {
        let mut document = if url.is_viewsource {
            HtmlParser::view_source(body)
        } else {
            HtmlParser::new(body).parse()
        };

        let mut rules = self.default_rules.clone();
        if !url.is_viewsource {
            rules.extend(self.page_rules(&url, &document));
        }
        style_tree(&mut document, &rules);

        let mut page = Page {
            url,
            document,
            layout: LayoutTree::default(),
            display_list: Vec::new(),
            height: 0.0,
        };
        let width = self.config.viewport_width;
        self.relayout(&mut page, width);
        page
    }

    /// Rules from `<link rel="stylesheet">` and `<style>`, in document
    /// order. Stylesheets that fail to load are skipped.
    fn page_rules(&mut self, url: &Url, doc: &Document) -> Vec<Rule> {
        let mut rules = Vec::new();
        for id in doc.descendants(doc.root) {
            let node = doc.get(id);
            let css = match node.tag() {
                Some("link")
                    if node
                        .attribute("rel")
                        .is_some_and(|rel| rel.eq_ignore_ascii_case("stylesheet")) =>
                {
                    let Some(href) = node.attribute("href") else {
                        continue;
                    };
                    match url
                        .resolve(href)
                        .and_then(|sheet| self.session.request(&sheet))
                    {
                        Ok(css) => css,
                        Err(e) => {
                            log::warn!("skipping stylesheet {href}: {e}");
                            continue;
                        },
                    }
                },
                Some("style") => doc.text_content(id),
                _ => continue,
            };
            match CssParser::new(&css).parse() {
                Ok(sheet) => rules.extend(sheet),
                Err(e) => log::warn!("skipping stylesheet: {e}"),
            }
        }
        rules
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(BrowserConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};

    use super::*;

    fn read_request(stream: &mut TcpStream) -> Option<String> {
        let mut buf = Vec::new();
        let mut byte = [0u8; 1];
        while !buf.ends_with(b"\r\n\r\n") {
            match stream.read(&mut byte) {
                Ok(0) | Err(_) => return None,
                Ok(_) => buf.push(byte[0]),
            }
        }
        Some(String::from_utf8(buf).unwrap())
    }

    /// Serve `(path, body)` pairs with keep-alive; anything else is a 404.
    fn serve(routes: &'static [(&'static str, &'static str)]) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                while let Some(head) = read_request(&mut stream) {
                    let path = head.split(' ').nth(1).unwrap_or("");
                    let (status, body) = routes
                        .iter()
                        .find(|(p, _)| *p == path)
                        .map_or(("404 Not Found", ""), |(_, body)| ("200 OK", *body));
                    let resp = format!(
                        "HTTP/1.1 {status}\r\nContent-Length: {}\r\n\r\n{body}",
                        body.len()
                    );
                    if stream.write_all(resp.as_bytes()).is_err() {
                        break;
                    }
                }
            }
        });
        port
    }

    fn texts(page: &Page) -> Vec<&str> {
        page.display_list
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                DrawCommand::Rect { .. } => None,
            })
            .collect()
    }

    fn color_of<'p>(page: &'p Page, word: &str) -> &'p str {
        page.display_list
            .iter()
            .find_map(|c| match c {
                DrawCommand::Text { text, color, .. } if text == word => Some(color.as_str()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn load_data_url() {
        let mut engine = Engine::default();
        let page = engine.load("data:text/html,<p>Hello world!</p>").unwrap();
        assert_eq!(texts(&page), ["Hello", "world!"]);
        assert_eq!(page.document.tag(page.document.root), Some("html"));
        assert!(page.height > 0.0);
    }

    #[test]
    fn load_parsed_url() {
        let mut engine = Engine::default();
        let url = Url::parse("data:text/html,hi").unwrap();
        let page = engine.load(&url).unwrap();
        assert_eq!(page.url, url);
        assert_eq!(texts(&page), ["hi"]);
    }

    #[test]
    fn load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "<html><body><p>from disk</p></body></html>").unwrap();
        let mut engine = Engine::default();
        let page = engine.load(format!("file://{}", path.display())).unwrap();
        assert_eq!(texts(&page), ["from", "disk"]);
    }

    #[test]
    fn malformed_url_is_an_error() {
        let mut engine = Engine::default();
        assert!(matches!(
            engine.load("gopher://example.org/").unwrap_err(),
            GiraffeError::UnknownScheme(_)
        ));
        assert!(matches!(
            engine.load("no-colon-here").unwrap_err(),
            GiraffeError::MalformedUrl(_)
        ));
    }

    #[test]
    fn load_or_blank_falls_back() {
        let mut engine = Engine::default();
        let page = engine.load_or_blank("gopher://example.org/");
        assert_eq!(page.url, Url::about_blank());
        assert!(page.display_list.is_empty());
        assert_eq!(page.document.to_string(), ABOUT_BLANK);
    }

    #[test]
    fn view_source_shows_markup() {
        let mut engine = Engine::default();
        let page = engine.load("view-source:data:text/html,<b>hi</b>").unwrap();
        assert_eq!(page.document.tag(page.document.root), Some("view-source"));
        assert_eq!(texts(&page), ["<b>hi</b>"]);
    }

    #[test]
    fn style_block_applies() {
        let mut engine = Engine::default();
        let page = engine
            .load("data:text/html,<style>p { color: red; }</style><p>x</p><div>y</div>")
            .unwrap();
        assert_eq!(color_of(&page, "x"), "red");
        assert_eq!(color_of(&page, "y"), "black");
    }

    #[test]
    fn user_agent_sheet_is_first_layer() {
        let mut engine = Engine::default();
        let page = engine
            .load("data:text/html,<style>a { color: green; }</style><a>x</a><a>y</a>")
            .unwrap();
        assert_eq!(color_of(&page, "x"), "green");
        let page = engine.load("data:text/html,<a>x</a>").unwrap();
        assert_eq!(color_of(&page, "x"), "blue");
    }

    #[test]
    fn linked_stylesheet_is_fetched() {
        let port = serve(&[
            (
                "/dir/index.html",
                "<link rel=\"stylesheet\" href=\"style.css\"><p>styled</p>",
            ),
            ("/dir/style.css", "p { color: purple; }"),
        ]);
        let mut engine = Engine::default();
        let page = engine
            .load(format!("http://127.0.0.1:{port}/dir/index.html"))
            .unwrap();
        assert_eq!(color_of(&page, "styled"), "purple");
        assert_eq!(engine.session().num_sockets(), 1);
    }

    #[test]
    fn broken_stylesheet_link_is_skipped() {
        let mut engine = Engine::default();
        let page = engine
            .load("data:text/html,<link rel=\"stylesheet\" href=\"gopher://x/a.css\"><p>ok</p>")
            .unwrap();
        assert_eq!(texts(&page), ["ok"]);
        assert_eq!(color_of(&page, "ok"), "black");
    }

    #[test]
    fn relayout_narrower_is_taller() {
        let mut engine = Engine::default();
        let words = "word ".repeat(200);
        let mut page = engine.load(format!("data:text/html,<p>{words}</p>")).unwrap();
        let wide = page.height;
        engine.relayout(&mut page, 200);
        assert!(page.height > wide);
        assert_eq!(texts(&page).len(), 200);
    }

    #[test]
    fn scroll_range() {
        let mut engine = Engine::default();
        let page = engine.load("data:text/html,<p>x</p>").unwrap();
        assert_eq!(page.max_scroll(10_000.0), 0.0);
        assert_eq!(page.max_scroll(10.0), page.height - 10.0);
        assert_eq!(page.visible(0.0, 600.0).count(), 1);
        assert_eq!(page.visible(page.height, 600.0).count(), 0);
    }

    #[test]
    fn fonts_are_shared_across_loads() {
        let mut engine = Engine::default();
        engine.load("data:text/html,<p>a <b>b</b></p>").unwrap();
        let fonts = engine.fonts().len();
        engine.load("data:text/html,<p>c <b>d</b></p>").unwrap();
        assert_eq!(engine.fonts().len(), fonts);
    }
}
