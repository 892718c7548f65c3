//! Field extraction from catalog search pages.
//!
//! Result rows live in `table.c`; the first row is the column header. Cells
//! are positional:
//!
//! | cell | field |
//! |------|-------|
//! | 0 | id |
//! | 1 | authors |
//! | 2 | title, with the digest in the last link's `md5` query parameter |
//! | 4 | year |
//! | 6 | language |
//! | 7 | size |
//! | 8 | extension |
//!
//! Missing cells leave the field empty; a row is still counted so pagination
//! can tell a sparse page from an empty one.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::error::ParseError;
use super::record::CandidateRecord;

/// Parenthesised author roles such as `(ed.)` or `(transl.)`.
#[allow(clippy::expect_used)]
static AUTHOR_ROLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(.*?\)").expect("author role regex is valid") // Static pattern, safe to panic
});

const ROW_SELECTOR: &str = "table.c tr";
const CELL_SELECTOR: &str = "td";
const LINK_SELECTOR: &str = "a";
const ANNOTATION_SELECTOR: &str = "i";

pub(crate) fn compile(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::selector(selector, e))
}

/// Compiled selectors for search result pages.
#[derive(Debug, Clone)]
pub struct SearchPageParser {
    row: Selector,
    cell: Selector,
    link: Selector,
    annotation: Selector,
}

impl SearchPageParser {
    /// Compiles the selectors.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Selector`] if a selector fails to compile.
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            row: compile(ROW_SELECTOR)?,
            cell: compile(CELL_SELECTOR)?,
            link: compile(LINK_SELECTOR)?,
            annotation: compile(ANNOTATION_SELECTOR)?,
        })
    }

    /// Extracts every result row of `body`, header excluded, in page order.
    #[must_use]
    pub fn parse(&self, body: &[u8]) -> Vec<CandidateRecord> {
        let html = String::from_utf8_lossy(body);
        let document = Html::parse_document(&html);
        document
            .select(&self.row)
            .skip(1)
            .map(|row| self.parse_row(row))
            .collect()
    }

    fn parse_row(&self, row: ElementRef<'_>) -> CandidateRecord {
        let mut record = CandidateRecord::default();
        for (index, cell) in row.select(&self.cell).enumerate() {
            let text = cell_text(cell);
            match index {
                0 => record.id = text,
                1 => record.authors = AUTHOR_ROLE_PATTERN.replace_all(&text, "").trim().to_string(),
                2 => {
                    record.digest = self.digest_from_links(cell);
                    record.title = self.title_without_annotation(cell, &text);
                }
                4 => record.year = text.parse::<u32>().ok().filter(|&y| y != 0),
                6 => record.language = text.to_lowercase(),
                7 => record.size = text.to_uppercase(),
                8 => record.extension = text,
                _ => {}
            }
        }
        record
    }

    fn digest_from_links(&self, cell: ElementRef<'_>) -> String {
        let Some(href) = cell
            .select(&self.link)
            .filter_map(|a| a.value().attr("href"))
            .last()
        else {
            return String::new();
        };
        let Some((_, query)) = href.rsplit_once('?') else {
            return String::new();
        };
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "md5")
            .map(|(_, value)| value.trim().to_string())
            .unwrap_or_default()
    }

    fn title_without_annotation(&self, cell: ElementRef<'_>, text: &str) -> String {
        let annotation: String = cell
            .select(&self.annotation)
            .map(cell_text)
            .collect::<String>();
        let annotation = annotation.trim();
        text.strip_suffix(annotation)
            .unwrap_or(text)
            .trim()
            .to_string()
    }
}

/// Parses a search result page with freshly compiled selectors.
///
/// # Errors
///
/// Returns [`ParseError::Selector`] if a selector fails to compile.
pub fn parse_search_page(body: &[u8]) -> Result<Vec<CandidateRecord>, ParseError> {
    Ok(SearchPageParser::new()?.parse(body))
}

fn cell_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
