//! Error types for cache operations.

use std::fmt;

use thiserror::Error;

/// Structured classification for cache store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDbErrorKind {
    /// `SQLite` returned busy/locked while another process held the file.
    BusyOrLocked,
    /// Connection pool timed out waiting for a free connection.
    PoolTimeout,
    /// Connection pool is closed.
    PoolClosed,
    /// Filesystem or transport IO failure.
    Io,
    /// A stored value could not be decoded (wrong column type).
    Decode,
    /// Unclassified database failure.
    Other,
}

impl CacheDbErrorKind {
    #[must_use]
    pub fn from_sqlx(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => Self::PoolTimeout,
            sqlx::Error::PoolClosed => Self::PoolClosed,
            sqlx::Error::Io(_) => Self::Io,
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => Self::Decode,
            sqlx::Error::Database(database_error) => {
                classify_database_error(database_error.as_ref())
            }
            _ => Self::Other,
        }
    }
}

impl fmt::Display for CacheDbErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BusyOrLocked => "busy_or_locked",
            Self::PoolTimeout => "pool_timeout",
            Self::PoolClosed => "pool_closed",
            Self::Io => "io",
            Self::Decode => "decode",
            Self::Other => "other",
        };
        write!(f, "{label}")
    }
}

fn classify_database_error(
    database_error: &(dyn sqlx::error::DatabaseError + 'static),
) -> CacheDbErrorKind {
    let code = database_error.code();
    if matches!(
        code.as_deref(),
        Some("SQLITE_BUSY" | "SQLITE_LOCKED" | "5" | "6")
    ) {
        return CacheDbErrorKind::BusyOrLocked;
    }

    let message = database_error.message().to_ascii_lowercase();
    if message.contains("database is locked") || message.contains("database is busy") {
        return CacheDbErrorKind::BusyOrLocked;
    }

    CacheDbErrorKind::Other
}

/// Errors that can occur while reading or writing the response cache.
///
/// Callers treat these as a degraded signal: log and continue with a live fetch.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Database operation failed.
    #[error("cache {operation} failed for {key} ({kind}): {message}")]
    Database {
        /// Which cache operation failed (`get` or `set`).
        operation: &'static str,
        /// Cache key involved in the failed operation.
        key: String,
        /// Typed classification of the failure.
        kind: CacheDbErrorKind,
        /// Human-readable database error text.
        message: String,
    },
}

impl CacheError {
    pub(crate) fn database(operation: &'static str, key: &str, err: &sqlx::Error) -> Self {
        Self::Database {
            operation,
            key: key.to_string(),
            kind: CacheDbErrorKind::from_sqlx(err),
            message: err.to_string(),
        }
    }

    /// Returns the typed database error kind.
    #[must_use]
    pub fn kind(&self) -> CacheDbErrorKind {
        match self {
            Self::Database { kind, .. } => *kind,
        }
    }
}
