//! Application configuration: config file loading and CLI overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use bookfetch_core::catalog::{DEFAULT_CATALOG_URL, DEFAULT_MAX_PAGES, DEFAULT_MIRROR_URL};
use bookfetch_core::download::DEFAULT_ETA_WINDOW;
use bookfetch_core::fetch::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

use crate::cli::Args;

const APP_DIR: &str = "bookfetch";
const CONFIG_FILE: &str = "config.toml";
const CACHE_FILE: &str = "cache.sqlite3";
const DEFAULT_CACHE_TTL_HOURS: u64 = 24;

/// Values read from the optional config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Cache database path.
    pub cache_path: Option<PathBuf>,
    /// Directory downloads are saved to.
    pub output_dir: Option<PathBuf>,
    /// Page cache lifetime in hours; 0 never expires.
    pub cache_ttl_hours: Option<u64>,
    /// Catalog base URL.
    pub catalog_url: Option<String>,
    /// Mirror base URL.
    pub mirror_url: Option<String>,
    /// Search page bound.
    pub max_pages: Option<u32>,
    /// ETA smoothing window.
    pub eta_window: Option<usize>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(hours) = self.cache_ttl_hours
            && hours > 8760
        {
            bail!("Invalid config value for `cache_ttl_hours`: {hours}. Expected range: 0..=8760");
        }
        if let Some(pages) = self.max_pages
            && !(1..=1000).contains(&pages)
        {
            bail!("Invalid config value for `max_pages`: {pages}. Expected range: 1..=1000");
        }
        if let Some(window) = self.eta_window
            && !(1..=10_000).contains(&window)
        {
            bail!("Invalid config value for `eta_window`: {window}. Expected range: 1..=10000");
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        validate_url("catalog_url", self.catalog_url.as_deref())?;
        validate_url("mirror_url", self.mirror_url.as_deref())?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

fn validate_url(field: &str, value: Option<&str>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        bail!("Invalid config value for `{field}`: '{value}'. Expected an http(s) URL");
    }
    Ok(())
}

/// Effective settings after merging defaults, the config file, and CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Cache database path.
    pub cache_path: PathBuf,
    /// Directory downloads are saved to.
    pub output_dir: PathBuf,
    /// Page cache lifetime; zero never expires.
    pub cache_ttl: Duration,
    /// Catalog base URL.
    pub catalog_url: String,
    /// Mirror base URL.
    pub mirror_url: String,
    /// Search page bound.
    pub max_pages: u32,
    /// ETA smoothing window.
    pub eta_window: usize,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: u64,
}

impl Settings {
    /// Merges `file` over built-in defaults, then `args` over both.
    #[must_use]
    pub fn resolve(args: &Args, file: Option<&FileConfig>, config_dir: Option<&Path>) -> Self {
        let file = file.cloned().unwrap_or_default();
        let default_cache_path = config_dir.map_or_else(
            || PathBuf::from(format!(".{APP_DIR}-{CACHE_FILE}")),
            |dir| dir.join(APP_DIR).join(CACHE_FILE),
        );
        let ttl_hours = args
            .ttl_hours
            .or(file.cache_ttl_hours)
            .unwrap_or(DEFAULT_CACHE_TTL_HOURS);

        Self {
            cache_path: args
                .cache_path
                .clone()
                .or(file.cache_path)
                .unwrap_or(default_cache_path),
            output_dir: args
                .output_dir
                .clone()
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            cache_ttl: Duration::from_secs(ttl_hours * 3600),
            catalog_url: file
                .catalog_url
                .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
            mirror_url: file
                .mirror_url
                .unwrap_or_else(|| DEFAULT_MIRROR_URL.to_string()),
            max_pages: args.max_pages.or(file.max_pages).unwrap_or(DEFAULT_MAX_PAGES),
            eta_window: file.eta_window.unwrap_or(DEFAULT_ETA_WINDOW),
            connect_timeout_secs: file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
            read_timeout_secs: file.read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS),
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves the base configuration directory.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME`
/// 2. `$HOME/.config`
#[must_use]
pub fn resolve_config_dir() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home));
    }
    let home = env_var_non_empty_os("HOME")?;
    Some(PathBuf::from(home).join(".config"))
}

/// Resolves the default config file path, `<config dir>/bookfetch/config.toml`.
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    resolve_config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let context = || format!("Invalid `{key}` value on line {line_number}");

        match key {
            "cache_path" => {
                cfg.cache_path = Some(PathBuf::from(
                    parse_string_literal(value).with_context(context)?,
                ));
            }
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(
                    parse_string_literal(value).with_context(context)?,
                ));
            }
            "catalog_url" => {
                cfg.catalog_url = Some(parse_string_literal(value).with_context(context)?);
            }
            "mirror_url" => {
                cfg.mirror_url = Some(parse_string_literal(value).with_context(context)?);
            }
            "cache_ttl_hours" => {
                cfg.cache_ttl_hours = Some(parse_integer_u64(value).with_context(context)?);
            }
            "max_pages" => {
                let parsed = parse_integer_u64(value).with_context(context)?;
                cfg.max_pages = Some(
                    u32::try_from(parsed)
                        .map_err(|_| anyhow::anyhow!("max_pages out of range for u32"))?,
                );
            }
            "eta_window" => {
                let parsed = parse_integer_u64(value).with_context(context)?;
                cfg.eta_window = Some(
                    usize::try_from(parsed)
                        .map_err(|_| anyhow::anyhow!("eta_window out of range for usize"))?,
                );
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(context)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer_u64(value).with_context(context)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}
