//! CLI entry point for bookfetch.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use bookfetch_core::catalog::{
    CatalogEndpoints, CatalogSearch, MirrorKind, SearchQuery, fetch_mirror_page,
};
use bookfetch_core::download::{VerifiedStreamDownloader, artifact_filename};
use bookfetch_core::selection::{prompt_choice, prompt_choice_with};
use bookfetch_core::{ByteCache, CachedFetcher, Database, HttpClient};
use clap::Parser;
use tracing::{debug, info, warn};

mod app_config;
mod cli;
mod output;

use app_config::{Settings, load_default_file_config, resolve_config_dir};
use cli::Args;
use output::BarObserver;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr; stdout carries the result table and prompts.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    if args.has_no_search_terms() {
        bail!("nothing to search for: pass title words or --author");
    }

    let loaded = load_default_file_config()?;
    if let Some(path) = loaded.path.as_deref().filter(|_| loaded.config.is_some()) {
        debug!(path = %path.display(), "config file loaded");
    }
    let settings = Settings::resolve(&args, loaded.config.as_ref(), resolve_config_dir().as_deref());
    debug!(?settings, "effective settings");

    // Explicit context: one cache handle and one HTTP client for the whole run.
    let db = Database::new(&settings.cache_path)
        .await
        .with_context(|| format!("opening cache {}", settings.cache_path.display()))?;
    let client = HttpClient::with_timeouts(settings.connect_timeout_secs, settings.read_timeout_secs)
        .context("building HTTP client")?;
    let fetcher = CachedFetcher::new(ByteCache::new(db), client);
    let endpoints = CatalogEndpoints::new(&settings.catalog_url, &settings.mirror_url)?;

    let query = SearchQuery::new(args.query.iter().cloned())
        .with_author(args.author.clone())
        .with_extension(args.extension.clone())
        .with_language(args.language.clone())
        .with_max_pages(settings.max_pages);

    let search = CatalogSearch::new(&fetcher, endpoints.clone(), settings.cache_ttl)?;

    let mut stdout = io::stdout();
    if !args.json {
        println!("{}", output::render_header());
    }
    let mut shown = 0usize;
    let outcome = search
        .search(&query, |record| {
            if !args.json {
                shown += 1;
                println!("{}", output::render_row(shown, record));
            }
        })
        .await;

    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &outcome.records)?;
        writeln!(stdout)?;
        return Ok(());
    }

    if outcome.records.is_empty() {
        if outcome.pages_fetched == 0 && outcome.pages_failed > 0 {
            bail!("catalog unreachable: all {} page fetches failed", outcome.pages_failed);
        }
        info!("no matching records");
        return Ok(());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let choice = prompt_choice(&mut input, &mut stdout, outcome.records.len())?;
    let record = &outcome.records[choice - 1];
    if !record.has_digest() {
        bail!(
            "record {} has no content digest; refusing to download unverified",
            record.id
        );
    }

    let (page_url, mirrors) = fetch_mirror_page(&fetcher, &endpoints, record, settings.cache_ttl)
        .await
        .context("resolving mirrors")?;
    print!("{}", output::render_mirror_menu(page_url.as_str(), &mirrors));
    if mirrors.has_no_links() {
        bail!("mirror page {page_url} offers no download links");
    }

    let mirror_choice = prompt_choice_with(&mut input, &mut stdout, MirrorKind::ALL.len(), |n| {
        mirrors.link(MirrorKind::ALL[n - 1]).is_some()
    })?;
    let kind = MirrorKind::ALL[mirror_choice - 1];
    let Some(download_url) = mirrors.link(kind) else {
        bail!("{kind} link disappeared");
    };
    println!("Starting...");

    let filename = artifact_filename(&record.authors, &record.title, &record.extension);
    let destination = settings.output_dir.join(&filename);
    let mut session =
        VerifiedStreamDownloader::with_eta_window(&destination, &record.digest, settings.eta_window)?;

    let body = fetcher.client().open_stream(download_url.as_str()).await?;
    let total = body.content_length();
    let mut observer = if args.quiet {
        BarObserver::hidden()
    } else {
        BarObserver::new(total)
    };
    let result = session.run(body.into_stream(), total, &mut observer).await;
    observer.finish();

    match result {
        Ok(report) => {
            println!("Successful downloaded file: {}", report.path.display());
            Ok(())
        }
        Err(error) => {
            warn!(state = ?session.state(), "download failed");
            Err(error).with_context(|| format!("downloading {filename}"))
        }
    }
}
