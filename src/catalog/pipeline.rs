//! Paginated catalog search.

use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::error::ParseError;
use super::filter::SearchFilters;
use super::parser::SearchPageParser;
use super::query::{CatalogEndpoints, SearchQuery};
use super::record::CandidateRecord;
use crate::fetch::PageFetcher;

/// Why pagination ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page produced no result rows at all.
    EmptyPage {
        /// The empty page number.
        page: u32,
    },
    /// The configured page bound was reached.
    PageLimit {
        /// The bound.
        max_pages: u32,
    },
}

/// Result of a full search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Records that passed every filter, in catalog order.
    pub records: Vec<CandidateRecord>,
    /// Pages whose body was obtained (from cache or network).
    pub pages_fetched: u32,
    /// Pages whose fetch failed and were skipped.
    pub pages_failed: u32,
    /// Rows seen before filtering.
    pub raw_entries: usize,
    /// Why pagination stopped.
    pub stop_reason: StopReason,
}

/// Drives pagination over the catalog through a [`PageFetcher`].
#[derive(Debug)]
pub struct CatalogSearch<'a, F: ?Sized> {
    fetcher: &'a F,
    endpoints: CatalogEndpoints,
    parser: SearchPageParser,
    page_ttl: Duration,
}

impl<'a, F> CatalogSearch<'a, F>
where
    F: PageFetcher + ?Sized,
{
    /// Creates a search over `endpoints`, caching pages for `page_ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Selector`] if the page selectors fail to compile.
    pub fn new(
        fetcher: &'a F,
        endpoints: CatalogEndpoints,
        page_ttl: Duration,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            fetcher,
            endpoints,
            parser: SearchPageParser::new()?,
            page_ttl,
        })
    }

    /// Catalog endpoints in use.
    #[must_use]
    pub fn endpoints(&self) -> &CatalogEndpoints {
        &self.endpoints
    }

    /// Runs the search, calling `on_match` for each accepted record as soon
    /// as its page is parsed.
    ///
    /// A page whose fetch fails is logged and skipped; pagination continues.
    /// Pagination stops at the first page with zero rows or after
    /// `query.max_pages` pages.
    #[instrument(skip(self, query, on_match), fields(terms = %query.title_query(), max_pages = query.max_pages))]
    pub async fn search<M>(&self, query: &SearchQuery, mut on_match: M) -> SearchOutcome
    where
        M: FnMut(&CandidateRecord),
    {
        let filters = SearchFilters::from_query(query);
        let mut records = Vec::new();
        let mut pages_fetched = 0;
        let mut pages_failed = 0;
        let mut raw_entries = 0;
        let mut stop_reason = StopReason::PageLimit {
            max_pages: query.max_pages,
        };

        for page in 1..=query.max_pages {
            let url = self.endpoints.search_page_url(query, page);
            let body = match self.fetcher.fetch(url.as_str(), self.page_ttl).await {
                Ok(body) => body,
                Err(error) => {
                    warn!(page, error = %error, "search page fetch failed; skipping");
                    pages_failed += 1;
                    continue;
                }
            };
            pages_fetched += 1;

            let rows = self.parser.parse(&body);
            debug!(page, rows = rows.len(), "search page parsed");
            if rows.is_empty() {
                stop_reason = StopReason::EmptyPage { page };
                break;
            }
            raw_entries += rows.len();

            for record in rows {
                if !filters.accepts(&record) {
                    continue;
                }
                if !record.has_digest() {
                    warn!(id = %record.id, title = %record.title, "record has no content digest; it cannot be verified");
                }
                on_match(&record);
                records.push(record);
            }
        }

        info!(
            matched = records.len(),
            raw_entries, pages_fetched, pages_failed, "search finished"
        );
        SearchOutcome {
            records,
            pages_fetched,
            pages_failed,
            raw_entries,
            stop_reason,
        }
    }
}
