//! Error types for the Giraffe pipeline.

use std::io;

/// Errors produced while fetching, decoding, or configuring a page load.
#[derive(Debug, thiserror::Error)]
pub enum GiraffeError {
    #[error("unknown scheme: {0}")]
    UnknownScheme(String),

    #[error("malformed URL: {0}")]
    MalformedUrl(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("too many redirects (limit {0})")]
    TooManyRedirects(u8),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GiraffeError>;
