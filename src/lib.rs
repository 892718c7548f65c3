//! bookfetch core library
//!
//! Finds a document on a remote catalog and downloads it with end-to-end
//! integrity verification.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`db`] - SQLite connection and schema management
//! - [`cache`] - Persistent TTL-aware byte cache
//! - [`fetch`] - HTTP client and the cache-fronted page fetcher
//! - [`catalog`] - Search URL construction, page parsing, filtering, pagination
//! - [`download`] - Verified, atomically committed streaming downloads
//! - [`selection`] - Numbered-choice operator prompt

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod catalog;
pub mod db;
pub mod download;
pub mod fetch;
pub mod selection;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use cache::{ByteCache, CacheError};
pub use catalog::{
    CandidateRecord, CatalogEndpoints, CatalogSearch, MirrorKind, MirrorPage, SearchOutcome,
    SearchQuery,
};
pub use db::{Database, DatabaseOptions, DbError};
pub use download::{
    DownloadError, DownloadReport, MovingAverage, ProgressObserver, TransferProgress,
    VerifiedStreamDownloader,
};
pub use fetch::{CachedFetcher, FetchError, HttpClient, PageFetcher, cached_call};
pub use selection::{SelectionError, parse_choice, prompt_choice};
