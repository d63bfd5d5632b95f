//! TLS client setup backed by rustls + ring.
//!
//! Enabled by the `tls-rustls` feature (on by default). The handshake is
//! driven to completion eagerly so certificate problems surface as
//! [`GiraffeError::Tls`] at connect time rather than on the first read.

use std::net::TcpStream;
use std::sync::Arc;

use rustls::{ClientConfig, ClientConnection, StreamOwned};
use rustls_pki_types::ServerName;

use giraffe_types::error::{GiraffeError, Result};

/// A TLS session layered over a TCP socket.
pub type TlsStream = StreamOwned<ClientConnection, TcpStream>;

/// Shared, reusable TLS client configuration (one per session).
pub struct TlsConnector {
    config: Arc<ClientConfig>,
}

impl TlsConnector {
    /// Build a connector that trusts Mozilla's root CA bundle.
    pub fn new() -> Self {
        let root_store =
            rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Self {
            config: Arc::new(config),
        }
    }

    /// Wrap `tcp` in a TLS session for `host` and finish the handshake.
    pub fn connect(&self, host: &str, mut tcp: TcpStream) -> Result<TlsStream> {
        let sni = ServerName::try_from(host.to_owned())
            .map_err(|e| GiraffeError::Tls(format!("invalid server name {host:?}: {e}")))?;

        let mut conn = ClientConnection::new(Arc::clone(&self.config), sni)
            .map_err(|e| GiraffeError::Tls(format!("TLS init: {e}")))?;

        while conn.is_handshaking() {
            conn.complete_io(&mut tcp)
                .map_err(|e| GiraffeError::Tls(format!("handshake with {host}: {e}")))?;
        }
        log::debug!("TLS handshake with {host} complete");

        Ok(StreamOwned::new(conn, tcp))
    }
}

impl Default for TlsConnector {
    fn default() -> Self {
        Self::new()
    }
}
