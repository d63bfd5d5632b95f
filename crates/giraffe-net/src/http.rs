//! HTTP/1.1 message framing: request building and response parsing.
//!
//! Parsing works on any [`BufRead`] so the same code serves live sockets
//! and in-memory test fixtures. Bodies are delimited by chunked transfer
//! encoding, `Content-Length`, or end of stream, and gzip content encoding
//! is undone before the body is decoded as UTF-8.

use std::io::{BufRead, Read};

use flate2::read::GzDecoder;

use giraffe_types::error::{GiraffeError, Result};

use crate::url::Url;

/// Body served for `about:blank` and for local responses without content.
pub const ABOUT_BLANK: &str = "<html><head></head><body></body></html>";

// -------------------------------------------------------------------
// Headers
// -------------------------------------------------------------------

/// Response headers in arrival order, keyed by lower-cased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header. A repeated name replaces the earlier value in place.
    pub fn insert(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// -------------------------------------------------------------------
// Response
// -------------------------------------------------------------------

/// A fully decoded response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Protocol version from the status line, empty for local schemes.
    pub version: String,
    pub status: u16,
    /// Reason phrase from the status line.
    pub explanation: String,
    pub headers: Headers,
    pub body: String,
}

impl Response {
    /// A response produced without any network traffic (`file:`, `data:`,
    /// `about:`).
    pub fn local(body: impl Into<String>) -> Self {
        Response {
            version: String::new(),
            status: 200,
            explanation: "OK".to_string(),
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// The `about:blank` document.
    pub fn about_blank() -> Self {
        Self::local(ABOUT_BLANK)
    }

    pub fn is_redirect(&self) -> bool {
        self.status == 301
    }

    /// Whether the connection that carried this response can be reused.
    pub fn keeps_alive(&self) -> bool {
        let connection = self.headers.get("connection").map(str::to_ascii_lowercase);
        if connection.as_deref() == Some("close") {
            return false;
        }
        if self.version == "HTTP/1.0" && connection.as_deref() != Some("keep-alive") {
            return false;
        }
        // Without explicit framing the body ran to end of stream.
        is_chunked(&self.headers) || self.headers.contains("content-length")
    }
}

// -------------------------------------------------------------------
// Requests
// -------------------------------------------------------------------

/// Build the GET request sent for `url`.
pub fn build_request(url: &Url, user_agent: &str) -> String {
    format!(
        "GET {path} HTTP/1.1\r\n\
         Host: {host}\r\n\
         User-Agent: {user_agent}\r\n\
         Accept-Encoding: gzip\r\n\
         \r\n",
        path = url.path,
        host = url.host,
    )
}

// -------------------------------------------------------------------
// Response parsing
// -------------------------------------------------------------------

/// Read one response from `reader`.
///
/// Returns `Ok(None)` when the peer closed the stream before sending a
/// status line, which is how a stale keep-alive connection shows up.
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Option<Response>> {
    let Some(status_line) = read_line(reader)? else {
        return Ok(None);
    };
    let (version, status, explanation) = parse_status_line(&status_line)?;
    let headers = read_headers(reader)?;

    let content_encoding = headers.get("content-encoding").map(str::to_ascii_lowercase);
    if let Some(encoding) = &content_encoding
        && encoding != "gzip"
    {
        return Err(GiraffeError::Http(format!(
            "unsupported content encoding: {encoding}"
        )));
    }

    let raw = if is_chunked(&headers) {
        decode_chunked(reader)?
    } else if let Some(transfer) = headers.get("transfer-encoding") {
        return Err(GiraffeError::Http(format!(
            "unsupported transfer encoding: {transfer}"
        )));
    } else if let Some(length) = headers.get("content-length") {
        let length: u64 = length
            .parse()
            .map_err(|_| GiraffeError::Http(format!("bad Content-Length: {length}")))?;
        let mut body = Vec::new();
        let read = reader.by_ref().take(length).read_to_end(&mut body)?;
        if read as u64 != length {
            return Err(GiraffeError::Http(format!(
                "body of {read} bytes is shorter than Content-Length {length}"
            )));
        }
        body
    } else {
        let mut body = Vec::new();
        reader.read_to_end(&mut body)?;
        body
    };

    let bytes = if content_encoding.is_some() {
        gunzip(&raw)?
    } else {
        raw
    };
    let body = String::from_utf8(bytes)
        .map_err(|e| GiraffeError::Decode(format!("body is not UTF-8: {e}")))?;

    Ok(Some(Response {
        version,
        status,
        explanation,
        headers,
        body,
    }))
}

/// Split `HTTP/1.1 200 OK` into version, status code and reason phrase.
fn parse_status_line(line: &str) -> Result<(String, u16, String)> {
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or("");
    let status = parts.next().unwrap_or("");
    let explanation = parts.next().unwrap_or("");
    if !version.starts_with("HTTP/") {
        return Err(GiraffeError::Http(format!("bad status line: {line}")));
    }
    let status = status
        .parse()
        .map_err(|_| GiraffeError::Http(format!("bad status code in: {line}")))?;
    Ok((version.to_string(), status, explanation.trim().to_string()))
}

/// Read header lines up to the blank line that ends the header block.
fn read_headers<R: BufRead>(reader: &mut R) -> Result<Headers> {
    let mut headers = Headers::new();
    loop {
        let line = read_line(reader)?
            .ok_or_else(|| GiraffeError::Http("connection closed inside headers".to_string()))?;
        if line.is_empty() {
            return Ok(headers);
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| GiraffeError::Http(format!("bad header line: {line}")))?;
        headers.insert(name.trim(), value.trim());
    }
}

/// Decode a chunked body: hex size line, that many bytes, CRLF, repeated
/// until a zero-size chunk. Trailer lines after the last chunk are skipped.
pub fn decode_chunked<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let line = read_line(reader)?
            .ok_or_else(|| GiraffeError::Http("connection closed before last chunk".to_string()))?;
        // Strip optional chunk extensions (after `;`).
        let size = line.split(';').next().unwrap_or("").trim();
        let size = u64::from_str_radix(size, 16)
            .map_err(|_| GiraffeError::Http(format!("bad chunk size: {line:?}")))?;

        if size == 0 {
            while let Some(trailer) = read_line(reader)? {
                if trailer.is_empty() {
                    break;
                }
            }
            return Ok(body);
        }

        let read = reader.by_ref().take(size).read_to_end(&mut body)?;
        if read as u64 != size {
            return Err(GiraffeError::Http(format!(
                "chunk of {read} bytes is shorter than its declared {size}"
            )));
        }

        let mut crlf = [0u8; 2];
        reader
            .read_exact(&mut crlf)
            .map_err(|e| GiraffeError::Http(format!("missing CRLF after chunk: {e}")))?;
        if &crlf != b"\r\n" {
            return Err(GiraffeError::Http(
                "chunk data longer than its declared size".to_string(),
            ));
        }
    }
}

fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| GiraffeError::Decode(format!("gzip: {e}")))?;
    Ok(out)
}

fn is_chunked(headers: &Headers) -> bool {
    headers
        .get("transfer-encoding")
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"))
}

/// Read one line without its line terminator. `None` at end of stream.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| GiraffeError::Http("non-UTF-8 line in response head".to_string()))
}
