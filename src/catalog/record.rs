//! Catalog search result record.

use serde::{Deserialize, Serialize};

/// One entry extracted from a catalog search page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Catalog identifier.
    pub id: String,
    /// Title with trailing edition/ISBN annotations removed.
    pub title: String,
    /// Author string with parenthesised roles removed.
    pub authors: String,
    /// Publication year, `None` when unknown.
    pub year: Option<u32>,
    /// Trusted hex content digest (MD5). Empty when the markup omitted it.
    pub digest: String,
    /// File extension, e.g. `epub`.
    pub extension: String,
    /// Lower-cased language name.
    pub language: String,
    /// Upper-cased human-readable size, e.g. `1 MB`.
    pub size: String,
}

impl CandidateRecord {
    /// True when a digest is available to verify a download against.
    #[must_use]
    pub fn has_digest(&self) -> bool {
        !self.digest.trim().is_empty()
    }

    /// Year for display, `unk.` when unknown.
    #[must_use]
    pub fn year_label(&self) -> String {
        self.year.map_or_else(|| "unk.".to_string(), |y| y.to_string())
    }

    /// First three characters of the language, for compact listings.
    #[must_use]
    pub fn language_code(&self) -> String {
        self.language.chars().take(3).collect()
    }
}
