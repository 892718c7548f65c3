//! Deterministic artifact and staging file names.
//!
//! The final name is derived only from catalog metadata, so re-running the same
//! selection targets the same path. The staging name is the final name with a
//! fixed dot-prefix, which keeps interrupted downloads out of casual listings
//! while still being easy to find and clean up.

use std::path::{Path, PathBuf};

use super::constants::{MAX_FILENAME_BYTES, STAGING_PREFIX};

/// Builds `"<authors> - <title>.<extension>"` with unsafe characters replaced.
///
/// Empty components are dropped rather than leaving dangling separators, and
/// the result is bounded to [`MAX_FILENAME_BYTES`] on a char boundary with the
/// extension preserved.
#[must_use]
pub fn artifact_filename(authors: &str, title: &str, extension: &str) -> String {
    let authors = sanitize_filename_component(authors);
    let title = sanitize_filename_component(title);
    let extension = sanitize_filename_component(extension.trim_start_matches('.'));

    let stem = match (authors.is_empty(), title.is_empty()) {
        (false, false) => format!("{authors} - {title}"),
        (false, true) => authors,
        (true, false) => title,
        (true, true) => "download".to_string(),
    };

    let suffix = if extension.is_empty() {
        String::new()
    } else {
        format!(".{extension}")
    };

    let budget = MAX_FILENAME_BYTES.saturating_sub(suffix.len());
    format!("{}{suffix}", truncate_on_char_boundary(&stem, budget).trim_end())
}

/// Staging path for `destination`: same directory, [`STAGING_PREFIX`] + file name.
#[must_use]
pub fn staging_path_for(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map_or_else(|| "download".into(), |n| n.to_string_lossy());
    let staged = format!("{STAGING_PREFIX}{name}");
    match destination.parent() {
        Some(parent) => parent.join(staged),
        None => PathBuf::from(staged),
    }
}

/// Replaces path separators, reserved and control characters with `_`,
/// collapses whitespace runs, and strips leading dots so the name can never be
/// hidden or escape its directory.
pub(crate) fn sanitize_filename_component(value: &str) -> String {
    let mapped: String = value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    let collapsed = mapped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_start_matches('.').trim().to_string()
}

fn truncate_on_char_boundary(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
