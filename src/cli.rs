//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Search a document catalog and download a verified copy.
///
/// Matching records are listed as a numbered table; pick one, then pick a
/// mirror. The file is saved as "<authors> - <title>.<ext>" only after its
/// digest matches the catalog's.
#[derive(Parser, Debug)]
#[command(name = "bookfetch")]
#[command(author, version, about)]
pub struct Args {
    /// Title words; every word must appear in a matching title
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,

    /// Only list files with this exact extension (e.g. epub, pdf)
    #[arg(short = 'e', long)]
    pub extension: Option<String>,

    /// Search by author; every word must appear in the author string
    #[arg(short = 'a', long)]
    pub author: Option<String>,

    /// Only list records whose language starts with the same 3 letters
    #[arg(short = 'l', long)]
    pub language: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Cache database path (overrides config file)
    #[arg(long, value_name = "PATH")]
    pub cache_path: Option<PathBuf>,

    /// Directory the downloaded file is saved to (overrides config file)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Page cache lifetime in hours, 0 to never expire (overrides config file)
    #[arg(long, value_name = "HOURS", value_parser = clap::value_parser!(u64).range(0..=8760))]
    pub ttl_hours: Option<u64>,

    /// Maximum number of search pages to fetch (overrides config file)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub max_pages: Option<u32>,

    /// Print matching records as JSON and exit without downloading
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// True when neither title words nor an author were given.
    #[must_use]
    pub fn has_no_search_terms(&self) -> bool {
        self.query.iter().all(|w| w.trim().is_empty())
            && self.author.as_deref().is_none_or(|a| a.trim().is_empty())
    }
}
