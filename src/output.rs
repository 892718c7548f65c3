//! Console rendering: result table, mirror menu, and download progress bar.

use std::time::Duration;

use bookfetch_core::catalog::{CandidateRecord, MirrorKind, MirrorPage};
use bookfetch_core::download::{ProgressObserver, TransferProgress};
use indicatif::{ProgressBar, ProgressStyle};

const TITLE_WIDTH: usize = 70;
const AUTHORS_WIDTH: usize = 25;
const EXTENSION_WIDTH: usize = 4;
const SIZE_WIDTH: usize = 7;
const NO_DIGEST_MARKER: &str = " [no digest]";

const BAR_TEMPLATE: &str = "[{bar:50}] ({bytes}/{total_bytes}) [{msg}]";
const SPINNER_TEMPLATE: &str = "{spinner} {bytes} downloaded";

/// Pads `text` with spaces to `width` chars, or shortens it to exactly
/// `width` chars by replacing its middle with `...`.
#[must_use]
pub fn padded_text(text: &str, width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= width {
        return format!("{text:<width$}");
    }
    if width < 3 {
        return chars[..width].iter().collect();
    }
    let head = (width / 2).saturating_sub(3);
    let tail = width - head - 3;
    let mut out: String = chars[..head].iter().collect();
    out.push_str("...");
    out.extend(&chars[chars.len() - tail..]);
    out
}

/// Abbreviates an author list to `I. Surname; I. Surname`.
///
/// Authors are split on `;` when present, otherwise on `,`. A `Surname,
/// Given` entry is reordered.
#[must_use]
pub fn shorten_authors(authors: &str) -> String {
    let authors = authors.trim();
    if authors.is_empty() {
        return String::new();
    }
    let separator = if authors.contains(';') { ';' } else { ',' };

    authors
        .split(separator)
        .map(str::trim)
        .filter(|author| !author.is_empty())
        .map(|author| {
            let (given, surname) = match author.split_once(',') {
                Some((surname, given)) => (given.trim(), surname.trim()),
                None => {
                    let mut words = author.split_whitespace();
                    let first = words.next().unwrap_or_default();
                    (first, words.last().unwrap_or(first))
                }
            };
            match given.chars().next() {
                Some(initial) if given != surname => format!("{initial}. {surname}"),
                _ => surname.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Column header matching [`render_row`].
#[must_use]
pub fn render_header() -> String {
    format!(
        "{}  {}  YEAR  {}  LNG  {:<SIZE_WIDTH$}",
        padded_text("TITLE", TITLE_WIDTH),
        padded_text("AUTHOR", AUTHORS_WIDTH),
        padded_text("EXT", EXTENSION_WIDTH),
        "SIZE"
    )
}

/// One numbered result line.
#[must_use]
pub fn render_row(number: usize, record: &CandidateRecord) -> String {
    let mut line = format!(
        "{}  {}  {:<4}  {}  {:<3}  {:>SIZE_WIDTH$}",
        padded_text(&format!("{number}) {}", record.title), TITLE_WIDTH),
        padded_text(&shorten_authors(&record.authors), AUTHORS_WIDTH),
        record.year_label(),
        padded_text(&record.extension, EXTENSION_WIDTH),
        record.language_code(),
        record.size,
    );
    if !record.has_digest() {
        line.push_str(NO_DIGEST_MARKER);
    }
    line
}

/// Mirror page details followed by the numbered mirror menu.
#[must_use]
pub fn render_mirror_menu(page_url: &str, page: &MirrorPage) -> String {
    let mut lines = vec![String::new()];
    lines.extend(page.details.iter().cloned());
    lines.push(page_url.to_string());
    lines.push(String::new());
    lines.extend(MirrorKind::ALL.iter().enumerate().map(|(index, kind)| {
        let suffix = if page.link(*kind).is_some() {
            ""
        } else {
            " (unavailable)"
        };
        format!("{}) {kind}{suffix}", index + 1)
    }));
    lines.push(String::new());
    lines.join("\n")
}

/// Whole-second ETA label such as `1m5s`.
#[must_use]
pub fn format_eta(eta: Option<Duration>) -> String {
    let Some(eta) = eta else {
        return "--".to_string();
    };
    let secs = eta.as_secs();
    match (secs / 3600, secs % 3600 / 60, secs % 60) {
        (0, 0, s) => format!("{s}s"),
        (0, m, s) => format!("{m}m{s}s"),
        (h, m, s) => format!("{h}h{m}m{s}s"),
    }
}

/// Terminal progress bar fed by the download session.
pub struct BarObserver {
    bar: ProgressBar,
}

impl BarObserver {
    /// Creates a bar for `total_bytes`, or a spinner when the size is unknown.
    #[must_use]
    pub fn new(total_bytes: Option<u64>) -> Self {
        let bar = match total_bytes.filter(|&t| t > 0) {
            Some(total) => {
                let bar = ProgressBar::new(total);
                bar.set_style(
                    ProgressStyle::with_template(BAR_TEMPLATE)
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("=>-"),
                );
                bar
            }
            None => {
                let bar = ProgressBar::no_length();
                bar.set_style(
                    ProgressStyle::with_template(SPINNER_TEMPLATE)
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar
            }
        };
        Self { bar }
    }

    /// Hidden bar for quiet runs.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Clears the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressObserver for BarObserver {
    fn on_progress(&mut self, progress: &TransferProgress) {
        self.bar.set_position(progress.bytes_transferred);
        if progress.total_bytes.is_some() {
            self.bar.set_message(format_eta(progress.eta));
        } else {
            self.bar.tick();
        }
    }
}
