//! Numbered-choice prompt for picking a search result or a mirror.
//!
//! The prompt reads from any [`BufRead`] and writes to any [`Write`] so it can
//! be driven by stdin in the binary and by byte slices in tests.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Prompt marker printed before each read.
pub const PROMPT: &str = ": ";

/// Message printed after an invalid choice.
pub const INVALID_CHOICE_MESSAGE: &str = "type a valid number";

/// Why an operator's answer was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The answer is not an integer.
    #[error("'{input}' is not a number")]
    NotANumber {
        /// The trimmed answer.
        input: String,
    },

    /// The number is outside `1..=max`.
    #[error("{choice} is not between 1 and {max}")]
    OutOfRange {
        /// The parsed number.
        choice: i64,
        /// Largest valid choice.
        max: usize,
    },

    /// The option exists but cannot be used.
    #[error("option {choice} is not available")]
    Unavailable {
        /// The rejected 1-based choice.
        choice: usize,
    },
}

/// Parses a 1-based choice in `1..=max`.
///
/// # Errors
///
/// Returns [`SelectionError::NotANumber`] or [`SelectionError::OutOfRange`].
pub fn parse_choice(input: &str, max: usize) -> Result<usize, SelectionError> {
    let trimmed = input.trim();
    let choice: i64 = trimmed.parse().map_err(|_| SelectionError::NotANumber {
        input: trimmed.to_string(),
    })?;
    usize::try_from(choice)
        .ok()
        .filter(|&n| (1..=max).contains(&n))
        .ok_or(SelectionError::OutOfRange { choice, max })
}

/// Prompts until a valid choice in `1..=max` is read.
///
/// # Errors
///
/// Returns an IO error if reading or writing fails, or
/// [`io::ErrorKind::UnexpectedEof`] when input ends before a valid choice.
pub fn prompt_choice<R, W>(reader: &mut R, writer: &mut W, max: usize) -> io::Result<usize>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    prompt_choice_with(reader, writer, max, |_| true)
}

/// Like [`prompt_choice`], additionally rejecting choices for which
/// `available` returns false.
///
/// # Errors
///
/// Same as [`prompt_choice`].
pub fn prompt_choice_with<R, W, A>(
    reader: &mut R,
    writer: &mut W,
    max: usize,
    available: A,
) -> io::Result<usize>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
    A: Fn(usize) -> bool,
{
    let mut line = String::new();
    loop {
        write!(writer, "{PROMPT}")?;
        writer.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input ended before a valid choice was made",
            ));
        }

        let outcome = parse_choice(&line, max).and_then(|choice| {
            if available(choice) {
                Ok(choice)
            } else {
                Err(SelectionError::Unavailable { choice })
            }
        });
        match outcome {
            Ok(choice) => return Ok(choice),
            Err(error) => {
                tracing::debug!(error = %error, "invalid selection");
                writeln!(writer, "{INVALID_CHOICE_MESSAGE}")?;
            }
        }
    }
}
