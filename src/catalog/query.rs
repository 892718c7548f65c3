//! Search parameters and catalog URL construction.

use url::Url;

use super::error::ParseError;

/// Default catalog host.
pub const DEFAULT_CATALOG_URL: &str = "https://libgen.is";

/// Default mirror host serving `/main/<md5>` pages.
pub const DEFAULT_MIRROR_URL: &str = "https://books.ms";

/// Default upper bound on search pages fetched per query.
pub const DEFAULT_MAX_PAGES: u32 = 30;

/// Results requested per search page.
pub const RESULTS_PER_PAGE: u32 = 100;

/// Base URLs for the catalog and its mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEndpoints {
    catalog: Url,
    mirror: Url,
}

impl CatalogEndpoints {
    /// Parses both base URLs. A base path is kept, so `https://host/lg` yields
    /// `https://host/lg/search.php`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidUrl`] if either value is not an absolute
    /// URL that can serve as a base.
    pub fn new(catalog_url: &str, mirror_url: &str) -> Result<Self, ParseError> {
        Ok(Self {
            catalog: parse_base(catalog_url)?,
            mirror: parse_base(mirror_url)?,
        })
    }

    /// Catalog base URL.
    #[must_use]
    pub fn catalog_url(&self) -> &Url {
        &self.catalog
    }

    /// Mirror base URL.
    #[must_use]
    pub fn mirror_url(&self) -> &Url {
        &self.mirror
    }

    /// URL of search result page `page` (1-based) for `query`.
    ///
    /// With an author filter the author column is searched with the author
    /// as the request; otherwise the title column with the joined terms.
    #[must_use]
    pub fn search_page_url(&self, query: &SearchQuery, page: u32) -> Url {
        let mut url = self.catalog.clone();
        url.set_path(&format!("{}search.php", self.catalog.path()));
        let (column, request) = match query.author.as_deref() {
            Some(author) => ("author", author.to_string()),
            None => ("title", query.title_query()),
        };
        url.query_pairs_mut()
            .append_pair("res", &RESULTS_PER_PAGE.to_string())
            .append_pair("page", &page.to_string())
            .append_pair("column", column)
            .append_pair("req", &request);
        url
    }

    /// URL of the mirror page for a record digest.
    #[must_use]
    pub fn mirror_page_url(&self, digest: &str) -> Url {
        let mut url = self.mirror.clone();
        url.set_path(&format!("{}main/{}", self.mirror.path(), digest.trim()));
        url
    }
}

impl Default for CatalogEndpoints {
    fn default() -> Self {
        Self {
            catalog: default_base(DEFAULT_CATALOG_URL),
            mirror: default_base(DEFAULT_MIRROR_URL),
        }
    }
}

fn parse_base(value: &str) -> Result<Url, ParseError> {
    let mut url = Url::parse(value.trim()).map_err(|e| ParseError::invalid_url(value, e))?;
    if url.cannot_be_a_base() {
        return Err(ParseError::invalid_url(value, "URL cannot be used as a base"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[allow(clippy::expect_used)]
fn default_base(value: &str) -> Url {
    parse_base(value).expect("built-in catalog URL is valid") // Static value, safe to panic
}

/// What to search for and how to filter the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Title words; every word must appear in a matching title.
    pub terms: Vec<String>,
    /// Author words; every word must appear in a matching author string.
    pub author: Option<String>,
    /// Exact file extension.
    pub extension: Option<String>,
    /// Language, compared on its first three characters.
    pub language: Option<String>,
    /// Upper bound on pages fetched.
    pub max_pages: u32,
}

impl SearchQuery {
    /// Creates a query for `terms` with no filters and the default page bound.
    #[must_use]
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            author: None,
            extension: None,
            language: None,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Sets the author filter; blank values clear it.
    #[must_use]
    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = non_blank(author);
        self
    }

    /// Sets the extension filter; blank values clear it.
    #[must_use]
    pub fn with_extension(mut self, extension: Option<String>) -> Self {
        self.extension = non_blank(extension);
        self
    }

    /// Sets the language filter; blank values clear it.
    #[must_use]
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = non_blank(language);
        self
    }

    /// Sets the page bound.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Title terms joined by single spaces.
    #[must_use]
    pub fn title_query(&self) -> String {
        self.terms.join(" ")
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
