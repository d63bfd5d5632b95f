//! Scheme dispatch, redirect following, and caching for one browsing
//! context.

use std::sync::Arc;
use std::time::Instant;

use giraffe_types::error::{GiraffeError, Result};

use crate::cache::ResponseCache;
use crate::config::NetConfig;
use crate::connection::ConnectionPool;
use crate::http::{self, Response};
use crate::url::{Scheme, Url};

/// Owns the sockets and the response cache used to fetch documents.
///
/// Requests are synchronous and run to completion; there are no timeouts.
pub struct Session {
    config: NetConfig,
    pool: ConnectionPool,
    cache: ResponseCache,
}

impl Session {
    pub fn new(config: NetConfig) -> Self {
        Self {
            config,
            pool: ConnectionPool::new(),
            cache: ResponseCache::new(),
        }
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Number of sockets held open for reuse.
    pub fn num_sockets(&self) -> usize {
        self.pool.len()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Fetch `url` and return its body.
    pub fn request(&mut self, url: &Url) -> Result<String> {
        Ok(self.request_response(url)?.body.clone())
    }

    /// Fetch `url`, following redirects and consulting the cache.
    pub fn request_response(&mut self, url: &Url) -> Result<Arc<Response>> {
        self.request_response_at(url, Instant::now())
    }

    /// [`request_response`](Self::request_response) with an explicit clock
    /// reading for cache freshness.
    pub fn request_response_at(&mut self, url: &Url, now: Instant) -> Result<Arc<Response>> {
        match url.scheme {
            Scheme::File => {
                let body = std::fs::read_to_string(&url.path)?;
                Ok(Arc::new(Response::local(body)))
            },
            Scheme::Data => {
                let payload = url.data_payload().ok_or_else(|| {
                    GiraffeError::MalformedUrl(format!("data URL without a comma: {url}"))
                })?;
                Ok(Arc::new(Response::local(payload)))
            },
            Scheme::About => Ok(Arc::new(Response::about_blank())),
            Scheme::Http | Scheme::Https => self.fetch_http(url, now),
        }
    }

    fn fetch_http(&mut self, url: &Url, now: Instant) -> Result<Arc<Response>> {
        let mut current = url.clone();
        let mut hops = 0u8;
        loop {
            let response = match self.cache.get(&current, now) {
                Some(cached) => cached,
                None => {
                    log::info!("GET {current}");
                    let request = http::build_request(&current, &self.config.user_agent);
                    let response = Arc::new(self.pool.send(&current, request.as_bytes())?);
                    self.cache.store(&current, Arc::clone(&response), now);
                    response
                },
            };

            if !response.is_redirect() {
                return Ok(response);
            }

            let location = response.headers.get("location").ok_or_else(|| {
                GiraffeError::Http(format!("301 from {current} without a Location header"))
            })?;
            if hops >= self.config.max_redirects {
                return Err(GiraffeError::TooManyRedirects(self.config.max_redirects));
            }
            hops += 1;

            let next = current.resolve(location)?;
            log::info!("redirect {current} -> {next}");
            current = next;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(NetConfig::default())
    }
}
