//! Response cache driven by `Cache-Control: max-age`.
//!
//! Entries are keyed by the requesting [`Url`] and expire `max-age` seconds
//! after they were fetched. Lookups take the current [`Instant`] from the
//! caller, which keeps expiry deterministic under test.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::http::Response;
use crate::url::Url;

/// Longest lifetime granted to an entry, one year.
const MAX_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug)]
struct CacheEntry {
    expires: Instant,
    response: Arc<Response>,
}

/// Fetched responses that are still fresh.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: HashMap<Url, CacheEntry>,
    hits: u64,
    misses: u64,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached response for `url` if it is still fresh at `now`.
    /// An expired entry is evicted and counts as a miss.
    pub fn get(&mut self, url: &Url, now: Instant) -> Option<Arc<Response>> {
        match self.entries.get(url) {
            Some(entry) if now < entry.expires => {
                self.hits += 1;
                log::debug!("cache hit: {url}");
                Some(Arc::clone(&entry.response))
            },
            Some(_) => {
                self.entries.remove(url);
                self.misses += 1;
                log::debug!("cache entry expired: {url}");
                None
            },
            None => {
                self.misses += 1;
                None
            },
        }
    }

    /// Store `response` under `url` if its headers allow it. Returns whether
    /// the response was cached.
    pub fn store(&mut self, url: &Url, response: Arc<Response>, now: Instant) -> bool {
        let Some(max_age) = response.headers.get("cache-control").and_then(cacheable_max_age)
        else {
            return false;
        };
        let max_age = max_age.min(MAX_LIFETIME_SECS);
        let Some(expires) = now.checked_add(Duration::from_secs(max_age)) else {
            return false;
        };
        log::debug!("caching {url} for {max_age}s");
        self.entries.insert(url.clone(), CacheEntry { expires, response });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

/// Lifetime in seconds granted by a `Cache-Control` value, or `None` when
/// the response must not be cached (`no-store`, missing or zero `max-age`).
pub fn cacheable_max_age(cache_control: &str) -> Option<u64> {
    let mut max_age = None;
    for directive in cache_control.split(',') {
        let directive = directive.trim().to_ascii_lowercase();
        if directive == "no-store" {
            return None;
        }
        if let Some(value) = directive.strip_prefix("max-age") {
            let value = value.trim_start().strip_prefix('=')?.trim().trim_matches('"');
            max_age = value.parse::<u64>().ok();
        }
    }
    max_age.filter(|&secs| secs > 0)
}
