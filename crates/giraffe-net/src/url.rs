//! URL parsing, resolution, and display.
//!
//! Only the five schemes the pipeline can fetch are recognised. A URL is a
//! plain value: equality and hashing cover every field, so it doubles as
//! the response-cache key.

use std::fmt;

use giraffe_types::error::{GiraffeError, Result};

/// Prefix that asks the pipeline to show markup instead of rendering it.
const VIEW_SOURCE_PREFIX: &str = "view-source:";

/// The only `about:` page the pipeline serves.
const ABOUT_BLANK_PAGE: &str = "blank";

/// Schemes the network layer knows how to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
    File,
    Data,
    About,
}

impl Scheme {
    /// Look up a scheme by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            "file" => Some(Scheme::File),
            "data" => Some(Scheme::Data),
            "about" => Some(Scheme::About),
            _ => None,
        }
    }

    /// Lower-case scheme name as it appears in a URL.
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::File => "file",
            Scheme::Data => "data",
            Scheme::About => "about",
        }
    }

    /// Port used when the URL does not name one.
    pub fn default_port(self) -> Option<u16> {
        match self {
            Scheme::Http => Some(80),
            Scheme::Https => Some(443),
            _ => None,
        }
    }

    /// Whether resources with this scheme are fetched over a socket.
    pub fn is_network(self) -> bool {
        matches!(self, Scheme::Http | Scheme::Https)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Url {
    pub scheme: Scheme,
    /// Host name. Empty for `file:` and `data:`; the page name for `about:`.
    pub host: String,
    /// Explicit port, or the scheme's default port.
    pub port: Option<u16>,
    /// Path starting with `/`. For `data:` URLs this holds `/<mime>,<payload>`.
    pub path: String,
    /// Set when the URL carried a `view-source:` prefix.
    pub is_viewsource: bool,
}

impl Url {
    /// Parse an absolute URL string.
    ///
    /// Fails with [`GiraffeError::UnknownScheme`] for schemes outside
    /// [`Scheme`] and with [`GiraffeError::MalformedUrl`] when the string has
    /// no scheme separator, a non-numeric port, a `data:` payload without a
    /// comma, or names an `about:` page other than `blank`.
    pub fn parse(input: &str) -> Result<Self> {
        let (is_viewsource, rest) = match input.strip_prefix(VIEW_SOURCE_PREFIX) {
            Some(inner) => (true, inner),
            None => (false, input),
        };

        let (scheme_name, rest) = rest
            .split_once(':')
            .ok_or_else(|| GiraffeError::MalformedUrl(format!("missing scheme in {input:?}")))?;
        let scheme = Scheme::from_name(scheme_name)
            .ok_or_else(|| GiraffeError::UnknownScheme(scheme_name.to_string()))?;

        let rest = rest.trim_start_matches('/');
        // Local schemes carry no authority; the leading slash keeps the
        // host empty so everything lands in the path.
        let rest = match scheme {
            Scheme::File | Scheme::Data => format!("/{rest}"),
            _ => rest.to_string(),
        };
        if scheme == Scheme::Data && !rest.contains(',') {
            return Err(GiraffeError::MalformedUrl(format!(
                "data URL without a comma: {input:?}"
            )));
        }

        let (authority, path) = rest.split_once('/').unwrap_or((rest.as_str(), ""));
        let (host, port) = match authority.split_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    GiraffeError::MalformedUrl(format!("bad port {port:?} in {input:?}"))
                })?;
                (host, Some(port))
            },
            None => (authority, scheme.default_port()),
        };

        if scheme == Scheme::About && host != ABOUT_BLANK_PAGE {
            return Err(GiraffeError::MalformedUrl(format!(
                "unsupported about page: {host:?}"
            )));
        }

        Ok(Url {
            scheme,
            host: host.to_string(),
            port,
            path: format!("/{path}"),
            is_viewsource,
        })
    }

    /// The `about:blank` URL.
    pub fn about_blank() -> Self {
        Url {
            scheme: Scheme::About,
            host: ABOUT_BLANK_PAGE.to_string(),
            port: None,
            path: "/".to_string(),
            is_viewsource: false,
        }
    }

    /// Resolve a reference found in a document against this URL.
    ///
    /// - `scheme://...` parses standalone.
    /// - `//host/path` keeps this URL's scheme.
    /// - `/path` keeps scheme, host and port.
    /// - anything else is relative to this URL's directory; each leading
    ///   `../` drops one directory component.
    pub fn resolve(&self, reference: &str) -> Result<Url> {
        if reference.contains("://") {
            return Url::parse(reference);
        }

        let mut path = reference.to_string();
        if !reference.starts_with('/') {
            let mut dir = self.path.rsplit_once('/').map_or("", |(dir, _)| dir);
            let mut rest = reference;
            while let Some(stripped) = rest.strip_prefix("../") {
                rest = stripped;
                if let Some((parent, _)) = dir.rsplit_once('/') {
                    dir = parent;
                }
            }
            path = format!("{dir}/{rest}");
        }

        if path.starts_with("//") {
            return Url::parse(&format!("{}:{path}", self.scheme));
        }

        Ok(Url {
            scheme: self.scheme,
            host: self.host.clone(),
            port: self.port,
            path,
            is_viewsource: false,
        })
    }

    /// Port to connect to: the explicit one or the scheme default.
    pub fn effective_port(&self) -> Option<u16> {
        self.port.or_else(|| self.scheme.default_port())
    }

    /// Payload of a `data:` URL (everything after the first comma).
    pub fn data_payload(&self) -> Option<&str> {
        if self.scheme != Scheme::Data {
            return None;
        }
        self.path.split_once(',').map(|(_, payload)| payload)
    }

    /// The same URL without the `view-source:` flag.
    pub fn without_viewsource(&self) -> Url {
        Url {
            is_viewsource: false,
            ..self.clone()
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_viewsource {
            f.write_str(VIEW_SOURCE_PREFIX)?;
        }
        match self.scheme {
            Scheme::Data => write!(f, "data:{}", self.path.trim_start_matches('/')),
            Scheme::About => write!(f, "about:{}", self.host),
            Scheme::File => write!(f, "file://{}", self.path),
            Scheme::Http | Scheme::Https => {
                write!(f, "{}://{}", self.scheme, self.host)?;
                match self.port {
                    Some(port) if Some(port) != self.scheme.default_port() => {
                        write!(f, ":{port}")?;
                    },
                    _ => {},
                }
                f.write_str(&self.path)
            },
        }
    }
}

impl std::str::FromStr for Url {
    type Err = GiraffeError;

    fn from_str(s: &str) -> Result<Self> {
        Url::parse(s)
    }
}
