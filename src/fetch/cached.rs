//! Cache-check / cache-populate wrapper around network fetches.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::client::HttpClient;
use super::error::FetchError;
use crate::cache::ByteCache;

/// Serves `key` from `cache` when fresh, otherwise runs `fetch` and stores
/// its result under `key`.
///
/// Cache failures are logged and treated as a miss (on read) or ignored (on
/// write); they never turn into an error for the caller. A failed `fetch`
/// leaves the cache untouched.
///
/// # Errors
///
/// Returns whatever error `fetch` produced on a cache miss.
pub async fn cached_call<F, Fut>(
    cache: &ByteCache,
    key: &str,
    ttl: Duration,
    fetch: F,
) -> Result<Vec<u8>, FetchError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<u8>, FetchError>>,
{
    match cache.get(key, ttl).await {
        Ok(Some(body)) => {
            debug!(key, bytes = body.len(), "served from cache");
            return Ok(body);
        }
        Ok(None) => {}
        Err(error) => warn!(key, error = %error, "cache read failed; fetching live"),
    }

    let body = fetch().await?;

    if let Err(error) = cache.set(key, &body).await {
        warn!(key, error = %error, "cache write failed; continuing with fetched body");
    }
    Ok(body)
}

/// Source of page bodies for the catalog pipeline.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the body for `url`, possibly from a cache no older than `ttl`.
    async fn fetch(&self, url: &str, ttl: Duration) -> Result<Vec<u8>, FetchError>;
}

/// HTTP fetcher fronted by the persistent byte cache.
///
/// Holds the run's shared cache handle and HTTP client; construct it once
/// and pass it to every component that needs pages.
#[derive(Debug, Clone)]
pub struct CachedFetcher {
    cache: ByteCache,
    client: HttpClient,
}

impl CachedFetcher {
    /// Creates a fetcher over an explicit cache and client.
    #[must_use]
    pub fn new(cache: ByteCache, client: HttpClient) -> Self {
        Self { cache, client }
    }

    /// Returns the HTTP client, for uncached operations like download streams.
    #[must_use]
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Returns the cache handle.
    #[must_use]
    pub fn cache(&self) -> &ByteCache {
        &self.cache
    }

    /// Fetches `url`, keyed by the URL itself.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when the cache misses and the live fetch fails.
    #[instrument(skip(self), fields(url = %url, ttl_secs = ttl.as_secs()))]
    pub async fn fetch(&self, url: &str, ttl: Duration) -> Result<Vec<u8>, FetchError> {
        cached_call(&self.cache, url, ttl, || self.client.get_bytes(url)).await
    }
}

#[async_trait]
impl PageFetcher for CachedFetcher {
    async fn fetch(&self, url: &str, ttl: Duration) -> Result<Vec<u8>, FetchError> {
        CachedFetcher::fetch(self, url, ttl).await
    }
}
