//! Engine configuration.
//!
//! Loaded from TOML; every key is optional and falls back to its default.
//!
//! ```toml
//! viewport_width = 1024
//! line_spacing = 1.5
//!
//! [net]
//! user_agent = "Giraffe/0.1"
//! ```

use std::path::Path;

use serde::Deserialize;

use giraffe_net::NetConfig;
use giraffe_types::error::{GiraffeError, Result};

/// Layout and network settings for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BrowserConfig {
    /// Width in pixels that pages are laid out for.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    /// Horizontal page margin.
    #[serde(default = "default_hstep")]
    pub hstep: u32,
    /// Vertical page margin.
    #[serde(default = "default_vstep")]
    pub vstep: u32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Family used inside `pre`.
    #[serde(default = "default_monospace_family")]
    pub monospace_family: String,
    /// Line height as a multiple of the tallest font on the line.
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f32,
    #[serde(default)]
    pub net: NetConfig,
}

fn default_viewport_width() -> u32 {
    800
}

fn default_hstep() -> u32 {
    13
}

fn default_vstep() -> u32 {
    18
}

fn default_font_family() -> String {
    "Times".to_string()
}

fn default_monospace_family() -> String {
    "Courier".to_string()
}

fn default_line_spacing() -> f32 {
    1.25
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            hstep: default_hstep(),
            vstep: default_vstep(),
            font_family: default_font_family(),
            monospace_family: default_monospace_family(),
            line_spacing: default_line_spacing(),
            net: NetConfig::default(),
        }
    }
}

impl BrowserConfig {
    /// Parse from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self> {
        let config: BrowserConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.viewport_width < self.hstep.saturating_mul(2) {
            return Err(GiraffeError::Config(format!(
                "viewport_width {} is narrower than the margins ({} each side)",
                self.viewport_width, self.hstep
            )));
        }
        if self.line_spacing.is_nan() || self.line_spacing <= 0.0 {
            return Err(GiraffeError::Config(format!(
                "line_spacing must be positive, got {}",
                self.line_spacing
            )));
        }
        if self.font_family.trim().is_empty() || self.monospace_family.trim().is_empty() {
            return Err(GiraffeError::Config("font families must not be empty".into()));
        }
        self.net.validate()
    }
}
