//! Error types for catalog parsing and mirror resolution.

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors raised while extracting fields from catalog markup.
///
/// Missing cells or attributes are not errors; they yield empty fields.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// A CSS selector failed to compile.
    #[error("invalid selector '{selector}': {reason}")]
    Selector {
        /// The selector text.
        selector: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A catalog or mirror base URL could not be parsed or joined.
    #[error("invalid catalog URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl ParseError {
    /// Creates a `Selector` error.
    pub fn selector(selector: &str, reason: impl ToString) -> Self {
        Self::Selector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an `InvalidUrl` error.
    pub fn invalid_url(url: &str, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors from resolving a record's mirror page.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The mirror page could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The mirror page could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The record carries no digest, so no mirror page exists for it.
    #[error("record {id} has no content digest; cannot resolve mirrors")]
    MissingDigest {
        /// Catalog identifier of the record.
        id: String,
    },
}
