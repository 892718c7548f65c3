//! Catalog search: URL construction, page parsing, filtering, pagination,
//! and mirror resolution.
//!
//! # Example
//!
//! ```no_run
//! use bookfetch_core::catalog::{CatalogEndpoints, CatalogSearch, SearchQuery};
//! use bookfetch_core::fetch::DEFAULT_PAGE_TTL;
//! use bookfetch_core::{ByteCache, CachedFetcher, Database, HttpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = ByteCache::new(Database::new_in_memory().await?);
//! let fetcher = CachedFetcher::new(cache, HttpClient::new());
//! let search = CatalogSearch::new(&fetcher, CatalogEndpoints::default(), DEFAULT_PAGE_TTL)?;
//!
//! let query = SearchQuery::new(["dune"]).with_extension(Some("epub".into()));
//! let outcome = search.search(&query, |record| println!("{}", record.title)).await;
//! println!("{} matches", outcome.records.len());
//! # Ok(())
//! # }
//! ```

mod error;
pub mod filter;
mod mirror;
pub mod parser;
mod pipeline;
mod query;
mod record;

pub use error::{MirrorError, ParseError};
pub use filter::{SearchFilters, fuzzy_match, matches_language};
pub use mirror::{MirrorKind, MirrorPage, fetch_mirror_page, parse_mirror_page};
pub use parser::{SearchPageParser, parse_search_page};
pub use pipeline::{CatalogSearch, SearchOutcome, StopReason};
pub use query::{
    CatalogEndpoints, DEFAULT_CATALOG_URL, DEFAULT_MAX_PAGES, DEFAULT_MIRROR_URL,
    RESULTS_PER_PAGE, SearchQuery,
};
pub use record::CandidateRecord;
