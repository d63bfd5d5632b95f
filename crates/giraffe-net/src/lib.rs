//! Network layer for the Giraffe document pipeline.
//!
//! Parses and resolves URLs, dispatches on scheme (`http`, `https`, `file`,
//! `data`, `about`), keeps one socket per host for reuse, decodes chunked
//! and gzip bodies, follows `301` redirects, and caches responses that
//! carry a positive `Cache-Control: max-age`.

pub mod cache;
pub mod config;
pub mod connection;
pub mod http;
pub mod session;
#[cfg(feature = "tls-rustls")]
pub mod tls;
pub mod url;

pub use cache::ResponseCache;
pub use config::NetConfig;
pub use http::{ABOUT_BLANK, Headers, Response};
pub use session::Session;
pub use url::{Scheme, Url};
