//! Constants for the download module.

/// Default number of ETA samples kept by the moving average.
pub const DEFAULT_ETA_WINDOW: usize = 40;

/// Prefix marking an in-flight or rejected download next to its final name.
pub const STAGING_PREFIX: &str = ".partial.";

/// Upper bound on generated file names, in bytes, leaving room for the staging prefix.
pub const MAX_FILENAME_BYTES: usize = 200;
