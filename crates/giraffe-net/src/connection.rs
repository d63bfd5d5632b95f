//! Persistent HTTP(S) connections, one per `(host, port)`.
//!
//! A connection stays in the pool after each exchange unless the response
//! says it cannot be reused. A reused connection that turns out to be stale
//! (the write fails, or the peer hangs up before a status line) is reopened
//! and the request is sent once more.

use std::collections::HashMap;
use std::io::{self, BufReader, Read, Write};
use std::net::TcpStream;

use giraffe_types::error::{GiraffeError, Result};

use crate::http::{self, Response};
use crate::url::{Scheme, Url};

#[cfg(feature = "tls-rustls")]
use crate::tls::{TlsConnector, TlsStream};

/// A plain or TLS-wrapped socket.
pub enum Stream {
    Plain(TcpStream),
    #[cfg(feature = "tls-rustls")]
    Tls(Box<TlsStream>),
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Stream::Plain(s) => s.read(buf),
            #[cfg(feature = "tls-rustls")]
            Stream::Tls(s) => s.read(buf),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Plain(s) => s.write(buf),
            #[cfg(feature = "tls-rustls")]
            Stream::Tls(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Plain(s) => s.flush(),
            #[cfg(feature = "tls-rustls")]
            Stream::Tls(s) => s.flush(),
        }
    }
}

type Connection = BufReader<Stream>;

/// Outcome of one request/response exchange on a connection.
enum Exchange {
    Done(Response),
    /// The peer was gone before anything was read back.
    Stale,
}

/// Open connections keyed by `(host, port)`.
#[derive(Default)]
pub struct ConnectionPool {
    connections: HashMap<(String, u16), Connection>,
    #[cfg(feature = "tls-rustls")]
    tls: Option<TlsConnector>,
}

impl ConnectionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of connections currently held open.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Send `request` to the server for `url` and read back one response.
    pub fn send(&mut self, url: &Url, request: &[u8]) -> Result<Response> {
        let port = url
            .effective_port()
            .ok_or_else(|| GiraffeError::MalformedUrl(format!("no port for {url}")))?;
        let key = (url.host.clone(), port);

        if let Some(mut conn) = self.connections.remove(&key) {
            match exchange(&mut conn, request)? {
                Exchange::Done(response) => {
                    log::debug!("reused connection to {}:{}", key.0, key.1);
                    self.check_in(key, conn, &response);
                    return Ok(response);
                },
                Exchange::Stale => {
                    log::debug!("stale connection to {}:{}, reopening", key.0, key.1);
                },
            }
        }

        let mut conn = self.open(url.scheme, &key.0, port)?;
        match exchange(&mut conn, request)? {
            Exchange::Done(response) => {
                self.check_in(key, conn, &response);
                Ok(response)
            },
            Exchange::Stale => Err(GiraffeError::Http(format!(
                "{}:{} closed the connection without responding",
                key.0, key.1
            ))),
        }
    }

    fn check_in(&mut self, key: (String, u16), conn: Connection, response: &Response) {
        if response.keeps_alive() {
            self.connections.insert(key, conn);
        } else {
            log::debug!("dropping connection to {}:{}", key.0, key.1);
        }
    }

    fn open(&mut self, scheme: Scheme, host: &str, port: u16) -> Result<Connection> {
        log::debug!("connecting to {host}:{port}");
        let tcp = TcpStream::connect((host, port))?;
        let stream = match scheme {
            Scheme::Http => Stream::Plain(tcp),
            Scheme::Https => self.wrap_tls(host, tcp)?,
            other => {
                return Err(GiraffeError::Http(format!(
                    "{other} URLs are not fetched over the network"
                )));
            },
        };
        Ok(BufReader::new(stream))
    }

    #[cfg(feature = "tls-rustls")]
    fn wrap_tls(&mut self, host: &str, tcp: TcpStream) -> Result<Stream> {
        let connector = self.tls.get_or_insert_with(TlsConnector::new);
        Ok(Stream::Tls(Box::new(connector.connect(host, tcp)?)))
    }

    #[cfg(not(feature = "tls-rustls"))]
    fn wrap_tls(&mut self, _host: &str, _tcp: TcpStream) -> Result<Stream> {
        Err(GiraffeError::Tls(
            "HTTPS requires the tls-rustls feature".to_string(),
        ))
    }
}

/// Write the request and read one response. Failures that mean the socket
/// was already dead are reported as [`Exchange::Stale`].
fn exchange(conn: &mut Connection, request: &[u8]) -> Result<Exchange> {
    let stream = conn.get_mut();
    if let Err(e) = stream.write_all(request).and_then(|()| stream.flush()) {
        log::debug!("request write failed: {e}");
        return Ok(Exchange::Stale);
    }
    match http::read_response(conn) {
        Ok(Some(response)) => Ok(Exchange::Done(response)),
        Ok(None) => Ok(Exchange::Stale),
        Err(GiraffeError::Io(e)) if is_disconnect(&e) => Ok(Exchange::Stale),
        Err(e) => Err(e),
    }
}

fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Read one request head from a test client.
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

    fn respond(stream: &mut TcpStream, body: &str) {
        let resp = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(resp.as_bytes()).unwrap();
    }

    fn request_for(url: &Url) -> Vec<u8> {
        http::build_request(url, "Giraffe").into_bytes()
    }

    #[test]
    fn connection_is_reused_for_same_host() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let accepts = Arc::new(AtomicUsize::new(0));
        let accepts_srv = Arc::clone(&accepts);

        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            accepts_srv.fetch_add(1, Ordering::SeqCst);
            for body in ["first", "second"] {
                read_request(&mut stream).unwrap();
                respond(&mut stream, body);
            }
        });

        let url = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let mut pool = ConnectionPool::new();
        assert_eq!(pool.send(&url, &request_for(&url)).unwrap().body, "first");
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.send(&url, &request_for(&url)).unwrap().body, "second");
        assert_eq!(pool.len(), 1);
        server.join().unwrap();
        assert_eq!(accepts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stale_connection_is_reopened_once() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = std::thread::spawn(move || {
            let (mut first, _) = listener.accept().unwrap();
            read_request(&mut first).unwrap();
            respond(&mut first, "one");
            // Swallow the second request and hang up without answering.
            read_request(&mut first);
            drop(first);

            let (mut second, _) = listener.accept().unwrap();
            read_request(&mut second).unwrap();
            respond(&mut second, "two");
        });

        let url = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let mut pool = ConnectionPool::new();
        assert_eq!(pool.send(&url, &request_for(&url)).unwrap().body, "one");
        assert_eq!(pool.send(&url, &request_for(&url)).unwrap().body, "two");
        server.join().unwrap();
    }

    #[test]
    fn fresh_connection_closed_without_response_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            read_request(&mut stream);
        });

        let url = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let err = ConnectionPool::new().send(&url, &request_for(&url)).unwrap_err();
        assert!(matches!(err, GiraffeError::Http(_)));
        server.join().unwrap();
    }

    #[test]
    fn connection_close_is_not_pooled() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            read_request(&mut stream).unwrap();
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nConnection: close\r\nContent-Length: 2\r\n\r\nok")
                .unwrap();
        });

        let url = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let mut pool = ConnectionPool::new();
        assert_eq!(pool.send(&url, &request_for(&url)).unwrap().body, "ok");
        assert!(pool.is_empty());
        server.join().unwrap();
    }

    #[test]
    fn request_bytes_reach_the_server() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let head = read_request(&mut stream).unwrap();
            respond(&mut stream, "");
            head
        });

        let url = Url::parse(&format!("http://127.0.0.1:{port}/a/b.html")).unwrap();
        ConnectionPool::new().send(&url, &request_for(&url)).unwrap();
        let head = server.join().unwrap();
        assert!(head.starts_with("GET /a/b.html HTTP/1.1\r\n"));
        assert!(head.contains("Host: 127.0.0.1\r\n"));
        assert!(head.contains("User-Agent: Giraffe\r\n"));
        assert!(head.contains("Accept-Encoding: gzip\r\n"));
    }

    #[test]
    fn local_schemes_are_not_opened() {
        let url = Url::parse("data:text/html,hi").unwrap();
        let err = ConnectionPool::new().send(&url, b"").unwrap_err();
        assert!(matches!(err, GiraffeError::MalformedUrl(_)));
    }
}
