//! Search cache operations.
//!
//! Rows are keyed by the composite search key and carry their creation
//! time; freshness is judged by the caller against a window rather than
//! stored as an expiry, so changing the window applies to existing rows.

use super::connection::{CacheDb, read_timestamp, timestamp};
use crate::Error;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::OptionalExtension;

/// A cached search result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCacheEntry {
    pub cache_key: String,
    pub query: String,
    pub results_json: String,
    pub created_at: DateTime<Utc>,
}

impl SearchCacheEntry {
    /// True while the entry is younger than `window` at `now`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.created_at < window
    }

    pub fn is_fresh(&self, window: Duration) -> bool {
        self.is_fresh_at(Utc::now(), window)
    }
}

impl CacheDb {
    /// Get a cached search entry by key, regardless of age.
    pub async fn get_search(&self, cache_key: &str) -> Result<Option<SearchCacheEntry>, Error> {
        let cache_key = cache_key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<SearchCacheEntry>, Error> {
                conn.query_row(
                    "SELECT cache_key, query, results_json, created_at FROM search_cache WHERE cache_key = ?1",
                    params![cache_key],
                    |row| {
                        Ok(SearchCacheEntry {
                            cache_key: row.get(0)?,
                            query: row.get(1)?,
                            results_json: row.get(2)?,
                            created_at: read_timestamp(row, 3)?,
                        })
                    },
                )
                .optional()
                .map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace a cached search result, stamped now.
    pub async fn put_search(&self, cache_key: &str, query: &str, results_json: &str) -> Result<(), Error> {
        self.put_search_at(cache_key, query, results_json, Utc::now()).await
    }

    /// Insert or replace a cached search result with an explicit timestamp.
    ///
    /// Uses UPSERT semantics: a stale row is overwritten, never duplicated.
    pub async fn put_search_at(
        &self, cache_key: &str, query: &str, results_json: &str, created_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let cache_key = cache_key.to_string();
        let query = query.to_string();
        let results_json = results_json.to_string();
        let created_at = timestamp(created_at);

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO search_cache (cache_key, query, results_json, created_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(cache_key) DO UPDATE SET
                        query = excluded.query,
                        results_json = excluded.results_json,
                        created_at = excluded.created_at",
                    params![cache_key, query, results_json, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete search cache entries older than `max_age`.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_stale_search(&self, max_age: Duration) -> Result<u64, Error> {
        let cutoff = timestamp(Utc::now() - max_age);
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM search_cache WHERE created_at <= ?1", params![cutoff])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn count_search(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM search_cache", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
