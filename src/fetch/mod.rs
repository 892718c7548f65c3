//! Outbound HTTP: the reqwest client and the cache-fronted page fetcher.
//!
//! # Example
//!
//! ```no_run
//! use bookfetch_core::{ByteCache, CachedFetcher, Database, HttpClient};
//! use bookfetch_core::fetch::DEFAULT_PAGE_TTL;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = ByteCache::new(Database::new_in_memory().await?);
//! let fetcher = CachedFetcher::new(cache, HttpClient::new());
//! let page = fetcher.fetch("https://catalog.example/search.php?req=dune", DEFAULT_PAGE_TTL).await?;
//! println!("{} bytes", page.len());
//! # Ok(())
//! # }
//! ```

mod cached;
mod client;
mod constants;
mod error;

pub use cached::{CachedFetcher, PageFetcher, cached_call};
pub use client::{HttpClient, RemoteBody};
pub use constants::{CONNECT_TIMEOUT_SECS, DEFAULT_PAGE_TTL, READ_TIMEOUT_SECS};
pub use error::FetchError;
