//! Record filters applied to every parsed search row.

use tracing::warn;

use super::query::SearchQuery;
use super::record::CandidateRecord;

/// Number of leading characters compared by the language filter.
pub const LANGUAGE_PREFIX_CHARS: usize = 3;

/// True when every whitespace-separated token of `query` occurs in `text`,
/// ignoring case. An empty query matches everything.
#[must_use]
pub fn fuzzy_match(text: &str, query: &str) -> bool {
    let haystack = text.to_lowercase();
    query
        .split_whitespace()
        .all(|token| haystack.contains(&token.to_lowercase()))
}

/// True when the first three characters of `candidate` and `requested` are
/// equal ignoring case.
///
/// A candidate shorter than three characters never matches. Callers must
/// not pass a `requested` value shorter than three characters; see
/// [`SearchFilters::from_query`].
#[must_use]
pub fn matches_language(candidate: &str, requested: &str) -> bool {
    let Some(candidate) = language_prefix(candidate) else {
        return false;
    };
    language_prefix(requested).is_some_and(|requested| requested == candidate)
}

fn language_prefix(value: &str) -> Option<String> {
    let prefix: String = value
        .trim()
        .to_lowercase()
        .chars()
        .take(LANGUAGE_PREFIX_CHARS)
        .collect();
    (prefix.chars().count() == LANGUAGE_PREFIX_CHARS).then_some(prefix)
}

/// Conjunction of the extension, language, title and author filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    title_query: String,
    author: Option<String>,
    extension: Option<String>,
    language: Option<String>,
}

impl SearchFilters {
    /// Derives filters from a search query.
    ///
    /// A language shorter than three characters cannot be compared on its
    /// prefix, so that filter is dropped with a warning.
    #[must_use]
    pub fn from_query(query: &SearchQuery) -> Self {
        let language = query.language.clone().filter(|lang| {
            let usable = lang.trim().chars().count() >= LANGUAGE_PREFIX_CHARS;
            if !usable {
                warn!(
                    language = %lang,
                    "language filter needs at least {LANGUAGE_PREFIX_CHARS} characters; ignoring it"
                );
            }
            usable
        });

        Self {
            title_query: query.title_query(),
            author: query.author.clone(),
            extension: query.extension.clone(),
            language,
        }
    }

    /// True when `record` passes every active filter.
    #[must_use]
    pub fn accepts(&self, record: &CandidateRecord) -> bool {
        if let Some(extension) = &self.extension
            && record.extension != *extension
        {
            return false;
        }
        if !fuzzy_match(&record.title, &self.title_query) {
            return false;
        }
        if let Some(author) = &self.author
            && !fuzzy_match(&record.authors, author)
        {
            return false;
        }
        if let Some(language) = &self.language
            && !matches_language(&record.language, language)
        {
            return false;
        }
        true
    }
}
