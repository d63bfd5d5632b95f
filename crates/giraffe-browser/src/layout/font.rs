//! Font descriptors, metrics, and the font cache.
//!
//! Layout never talks to a font backend directly. It asks a
//! [`FontCache`] for an `Arc<Font>` keyed by family, size, weight, and
//! slant, and measures text through the cache's [`TextMeasurer`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// -------------------------------------------------------------------
// Font descriptor
// -------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slant {
    Roman,
    Italic,
}

impl Weight {
    /// Map a CSS `font-weight` value. Anything but `bold` is normal.
    pub fn from_css(value: &str) -> Self {
        if value.eq_ignore_ascii_case("bold") {
            Weight::Bold
        } else {
            Weight::Normal
        }
    }
}

impl Slant {
    /// Map a CSS `font-style` value. Anything but `italic` is roman.
    pub fn from_css(value: &str) -> Self {
        if value.eq_ignore_ascii_case("italic") {
            Slant::Italic
        } else {
            Slant::Roman
        }
    }
}

/// Everything that identifies a font. Size is in points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    pub family: String,
    pub size: u32,
    pub weight: Weight,
    pub slant: Slant,
}

impl FontKey {
    pub fn new(family: &str, size: u32) -> Self {
        Self {
            family: family.to_string(),
            size: size.max(1),
            weight: Weight::Normal,
            slant: Slant::Roman,
        }
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}pt", self.family, self.size)?;
        if self.weight == Weight::Bold {
            f.write_str(" bold")?;
        }
        if self.slant == Slant::Italic {
            f.write_str(" italic")?;
        }
        Ok(())
    }
}

/// Vertical metrics, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
}

impl FontMetrics {
    /// Distance from the top of the tallest glyph to the bottom of the
    /// lowest one.
    pub fn linespace(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// A resolved font. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub key: FontKey,
    pub metrics: FontMetrics,
}

impl Font {
    pub fn ascent(&self) -> f32 {
        self.metrics.ascent
    }

    pub fn descent(&self) -> f32 {
        self.metrics.descent
    }

    pub fn linespace(&self) -> f32 {
        self.metrics.linespace()
    }
}

// -------------------------------------------------------------------
// TextMeasurer trait
// -------------------------------------------------------------------

/// Source of font metrics and text widths.
///
/// Backends with real font files implement this; the layout engine only
/// relies on these two calls.
pub trait TextMeasurer {
    fn metrics(&self, key: &FontKey) -> FontMetrics;

    /// Width in pixels of `text` set in the font `key`.
    fn measure_text(&self, key: &FontKey, text: &str) -> f32;
}

/// Fixed-advance approximation used when no font backend is present.
///
/// Every character advances by a fraction of the point size; the
/// monospace family and bold weight are a little wider.
#[derive(Debug, Clone)]
pub struct SimpleTextMeasurer {
    monospace_family: String,
}

const ADVANCE: f32 = 0.58;
const BOLD_ADVANCE: f32 = 0.62;
const MONOSPACE_ADVANCE: f32 = 0.6;
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;

impl SimpleTextMeasurer {
    pub fn new(monospace_family: &str) -> Self {
        Self {
            monospace_family: monospace_family.to_string(),
        }
    }

    fn advance(&self, key: &FontKey) -> f32 {
        let factor = if key.family == self.monospace_family {
            MONOSPACE_ADVANCE
        } else if key.weight == Weight::Bold {
            BOLD_ADVANCE
        } else {
            ADVANCE
        };
        key.size as f32 * factor
    }
}

impl Default for SimpleTextMeasurer {
    fn default() -> Self {
        Self::new("Courier")
    }
}

impl TextMeasurer for SimpleTextMeasurer {
    fn metrics(&self, key: &FontKey) -> FontMetrics {
        let size = key.size as f32;
        FontMetrics {
            ascent: size * ASCENT,
            descent: size * DESCENT,
        }
    }

    fn measure_text(&self, key: &FontKey, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance(key)
    }
}

// -------------------------------------------------------------------
// Font cache
// -------------------------------------------------------------------

/// Memoizes fonts by key. Entries live as long as the cache.
pub struct FontCache {
    measurer: Box<dyn TextMeasurer>,
    fonts: HashMap<FontKey, Arc<Font>>,
}

impl FontCache {
    pub fn new(measurer: Box<dyn TextMeasurer>) -> Self {
        Self {
            measurer,
            fonts: HashMap::new(),
        }
    }

    /// The font for `key`, creating it on first use.
    pub fn get(&mut self, key: FontKey) -> Arc<Font> {
        if let Some(font) = self.fonts.get(&key) {
            return Arc::clone(font);
        }
        let metrics = self.measurer.metrics(&key);
        log::trace!("new font: {key}");
        let font = Arc::new(Font {
            key: key.clone(),
            metrics,
        });
        self.fonts.insert(key, Arc::clone(&font));
        font
    }

    pub fn measure(&self, font: &Font, text: &str) -> f32 {
        self.measurer.measure_text(&font.key, text)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new(Box::new(SimpleTextMeasurer::default()))
    }
}

impl fmt::Debug for FontCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCache")
            .field("fonts", &self.fonts.len())
            .finish_non_exhaustive()
    }
}
