//! Mirror page resolution for a chosen record.

use std::fmt;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use super::error::{MirrorError, ParseError};
use super::parser::compile;
use super::query::CatalogEndpoints;
use super::record::CandidateRecord;
use crate::fetch::PageFetcher;

const DIRECT_SELECTOR: &str = "#download h2 a";
const IPFS_GATEWAY_SELECTOR: &str = "#download ul li:nth-child(2) a";
const LOCAL_IPFS_GATEWAY_SELECTOR: &str = "#download ul li:nth-child(4) a";
const DETAIL_SELECTORS: [&str; 4] = [
    "#info > p:nth-child(4)",
    "#info > p:nth-child(5)",
    "#info > p:nth-child(6)",
    "#info > p:nth-child(7)",
];

/// Download source offered by a mirror page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorKind {
    /// Plain HTTP download from the mirror.
    Direct,
    /// Public IPFS.io gateway.
    IpfsGateway,
    /// IPFS gateway on the local machine.
    LocalIpfsGateway,
}

impl MirrorKind {
    /// All kinds in menu order.
    pub const ALL: [Self; 3] = [Self::Direct, Self::IpfsGateway, Self::LocalIpfsGateway];

    /// Menu label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Direct => "Direct download",
            Self::IpfsGateway => "Download from IPFS.io gateway",
            Self::LocalIpfsGateway => "Download from local IPFS gateway",
        }
    }
}

impl fmt::Display for MirrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Links and descriptive lines extracted from a mirror page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorPage {
    /// Direct download link.
    pub direct: Option<Url>,
    /// IPFS.io gateway link.
    pub ipfs_gateway: Option<Url>,
    /// Local IPFS gateway link.
    pub local_ipfs_gateway: Option<Url>,
    /// Non-empty descriptive paragraphs (title, authors, publisher, ...).
    pub details: Vec<String>,
}

impl MirrorPage {
    /// Link for `kind`, if the page offered one.
    #[must_use]
    pub fn link(&self, kind: MirrorKind) -> Option<&Url> {
        match kind {
            MirrorKind::Direct => self.direct.as_ref(),
            MirrorKind::IpfsGateway => self.ipfs_gateway.as_ref(),
            MirrorKind::LocalIpfsGateway => self.local_ipfs_gateway.as_ref(),
        }
    }

    /// True when no download link was found at all.
    #[must_use]
    pub fn has_no_links(&self) -> bool {
        MirrorKind::ALL.iter().all(|&kind| self.link(kind).is_none())
    }
}

/// Extracts mirror links and details from `body`, resolving relative links
/// against `page_url`.
///
/// Links that are absent or cannot be resolved are `None`.
///
/// # Errors
///
/// Returns [`ParseError::Selector`] if a selector fails to compile.
pub fn parse_mirror_page(body: &[u8], page_url: &Url) -> Result<MirrorPage, ParseError> {
    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);

    let link = |selector: &str| -> Result<Option<Url>, ParseError> {
        let selector = compile(selector)?;
        Ok(first_href(&document, &selector).and_then(|href| page_url.join(href).ok()))
    };

    let mut details = Vec::with_capacity(DETAIL_SELECTORS.len());
    for selector in DETAIL_SELECTORS {
        let selector = compile(selector)?;
        if let Some(paragraph) = document.select(&selector).next() {
            let text = normalized_text(paragraph);
            if !text.is_empty() {
                details.push(text);
            }
        }
    }

    Ok(MirrorPage {
        direct: link(DIRECT_SELECTOR)?,
        ipfs_gateway: link(IPFS_GATEWAY_SELECTOR)?,
        local_ipfs_gateway: link(LOCAL_IPFS_GATEWAY_SELECTOR)?,
        details,
    })
}

/// Fetches and parses the mirror page for `record` through `fetcher`.
///
/// # Errors
///
/// Returns [`MirrorError::MissingDigest`] for a record without a digest,
/// [`MirrorError::Fetch`] if the page cannot be retrieved, and
/// [`MirrorError::Parse`] if it cannot be parsed.
#[instrument(skip(fetcher, endpoints, record), fields(id = %record.id))]
pub async fn fetch_mirror_page<F>(
    fetcher: &F,
    endpoints: &CatalogEndpoints,
    record: &CandidateRecord,
    ttl: Duration,
) -> Result<(Url, MirrorPage), MirrorError>
where
    F: PageFetcher + ?Sized,
{
    if !record.has_digest() {
        return Err(MirrorError::MissingDigest {
            id: record.id.clone(),
        });
    }
    let page_url = endpoints.mirror_page_url(&record.digest);
    let body = fetcher.fetch(page_url.as_str(), ttl).await?;
    let page = parse_mirror_page(&body, &page_url)?;
    debug!(
        direct = page.direct.is_some(),
        ipfs = page.ipfs_gateway.is_some(),
        local_ipfs = page.local_ipfs_gateway.is_some(),
        "mirror page parsed"
    );
    Ok((page_url, page))
}

fn first_href<'a>(document: &'a Html, selector: &Selector) -> Option<&'a str> {
    document
        .select(selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
}

fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
