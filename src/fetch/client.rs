//! HTTP client wrapper for catalog pages and download streams.
//!
//! This module provides the `HttpClient` struct, the only place that talks to
//! the network. Status handling lives here so a non-success response can never
//! reach the cache or the downloader as if it were content.

use std::time::Duration;

use futures_util::Stream;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::FetchError;
use crate::user_agent;

/// HTTP client for page fetches and streaming downloads.
///
/// Created once and passed to the components that need it, so connection
/// pooling is shared across the whole run.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

/// An opened response body ready to be streamed to disk.
#[derive(Debug)]
pub struct RemoteBody {
    url: String,
    response: reqwest::Response,
}

impl RemoteBody {
    /// Declared body length, when the server sent `Content-Length`.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// URL the body was requested from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Consumes the response into a stream of body chunks.
    pub fn into_stream(
        self,
    ) -> impl Stream<Item = Result<impl AsRef<[u8]>, reqwest::Error>> {
        self.response.bytes_stream()
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes between body reads
    /// - Gzip decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialized.
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .read_timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the full body.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the URL is invalid, the request fails, the
    /// server answers with a non-success status, or the body cannot be read.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.send_get(url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        debug!(bytes = body.len(), "page fetched");
        Ok(body.to_vec())
    }

    /// Issues a GET for `url` and returns the body unread, for streaming.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the URL is invalid, the request fails, or the
    /// server answers with a non-success status.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn open_stream(&self, url: &str) -> Result<RemoteBody, FetchError> {
        let response = self.send_get(url).await?;
        debug!(content_length = ?response.content_length(), "download stream opened");
        Ok(RemoteBody {
            url: url.to_string(),
            response,
        })
    }

    async fn send_get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}
