//! Constants for the fetch module (timeouts, cache lifetimes).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes between body reads, for slow mirrors).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Default lifetime of cached catalog and mirror pages (24 hours).
pub const DEFAULT_PAGE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
