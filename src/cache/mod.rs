//! Persistent byte cache keyed by request URL.
//!
//! Every outbound page fetch goes through this cache. Entries are never
//! evicted; staleness is decided at read time against a caller-supplied TTL.
//!
//! - `ttl == 0`: return whatever is stored, however old ("cache forever").
//! - `ttl > 0`: return the value only if `now - stored_at <= ttl`, otherwise
//!   report absence. The stale row stays in place until the next `set`.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use bookfetch_core::{ByteCache, Database};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = ByteCache::new(Database::new_in_memory().await?);
//! cache.set("https://catalog.example/search.php?req=dune", b"<html>").await?;
//! let hit = cache.get("https://catalog.example/search.php?req=dune", Duration::from_secs(3600)).await?;
//! assert!(hit.is_some());
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::{CacheDbErrorKind, CacheError};

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, instrument};

use crate::db::Database;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// SQLite-backed key → bytes cache with write timestamps.
#[derive(Debug, Clone)]
pub struct ByteCache {
    db: Database,
}

impl ByteCache {
    /// Creates a cache over an opened database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Looks up `key`, honoring `ttl` relative to the current time.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the query fails.
    pub async fn get(&self, key: &str, ttl: Duration) -> Result<Option<Vec<u8>>> {
        self.get_at(key, ttl, SystemTime::now()).await
    }

    /// Looks up `key` as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the query fails.
    #[instrument(skip(self, now), fields(key = %key, ttl_secs = ttl.as_secs()))]
    pub async fn get_at(
        &self,
        key: &str,
        ttl: Duration,
        now: SystemTime,
    ) -> Result<Option<Vec<u8>>> {
        let row: Option<(Vec<u8>,)> = if ttl.is_zero() {
            sqlx::query_as::<_, (Vec<u8>,)>("SELECT value FROM cache WHERE key = ?")
                .bind(key)
                .fetch_optional(self.db.pool())
                .await
        } else {
            let cutoff = unix_millis(now.checked_sub(ttl).unwrap_or(UNIX_EPOCH));
            sqlx::query_as::<_, (Vec<u8>,)>("SELECT value FROM cache WHERE key = ? AND stored_at >= ?")
                .bind(key)
                .bind(cutoff)
                .fetch_optional(self.db.pool())
                .await
        }
        .map_err(|e| CacheError::database("get", key, &e))?;

        debug!(hit = row.is_some(), "cache lookup");
        Ok(row.map(|(value,)| value))
    }

    /// Inserts or replaces the entry for `key`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the upsert fails.
    pub async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.set_at(key, value, SystemTime::now()).await
    }

    /// Inserts or replaces the entry for `key`, stamped with `stored_at`.
    ///
    /// A single-row upsert: readers see either the previous value or the new
    /// one, never a partial write.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the upsert fails.
    #[instrument(skip(self, value, stored_at), fields(key = %key, bytes = value.len()))]
    pub async fn set_at(&self, key: &str, value: &[u8], stored_at: SystemTime) -> Result<()> {
        sqlx::query(
            "INSERT INTO cache (key, value, stored_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, stored_at = excluded.stored_at",
        )
        .bind(key)
        .bind(value)
        .bind(unix_millis(stored_at))
        .execute(self.db.pool())
        .await
        .map_err(|e| CacheError::database("set", key, &e))?;

        debug!("cache entry stored");
        Ok(())
    }

    /// Returns the number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the count query fails.
    pub async fn len(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cache")
            .fetch_one(self.db.pool())
            .await
            .map_err(|e| CacheError::database("count", "*", &e))?;
        Ok(count)
    }

    /// Returns true when no entries are stored.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the count query fails.
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

fn unix_millis(at: SystemTime) -> i64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
