//! Article row operations.
//!
//! These are the raw, error-returning primitives. The soft-failing contract
//! callers rely on lives in [`super::store`].

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached article as fetched from a proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheEntry {
    pub key: String,
    pub source_url: String,
    pub raw_content: String,
    /// Collected page styles; empty when style extraction is off.
    pub styles: String,
    pub fetched_at_ms: i64,
}

impl CacheEntry {
    /// True once the entry is older than `retention_ms` at `now_ms`.
    pub fn is_expired(&self, now_ms: i64, retention_ms: i64) -> bool {
        now_ms.saturating_sub(self.fetched_at_ms) > retention_ms
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<CacheEntry> {
    Ok(CacheEntry {
        key: row.get(0)?,
        source_url: row.get(1)?,
        raw_content: row.get(2)?,
        styles: row.get(3)?,
        fetched_at_ms: row.get(4)?,
    })
}

impl CacheDb {
    /// Insert or replace an article. Last write wins.
    pub async fn upsert_article(&self, entry: &CacheEntry) -> Result<(), Error> {
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO articles (key, source_url, raw_content, styles, fetched_at_ms)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(key) DO UPDATE SET
                        source_url = excluded.source_url,
                        raw_content = excluded.raw_content,
                        styles = excluded.styles,
                        fetched_at_ms = excluded.fetched_at_ms",
                    params![entry.key, entry.source_url, entry.raw_content, entry.styles, entry.fetched_at_ms],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Upsert an article unless doing so would grow the table past `max_entries`.
    ///
    /// Overwriting an existing key is always allowed.
    pub async fn insert_article_within(&self, entry: &CacheEntry, max_entries: usize) -> Result<(), Error> {
        let entry = entry.clone();
        let max = max_entries as i64;
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                let exists: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM articles WHERE key = ?1)",
                    params![entry.key],
                    |row| row.get(0),
                )?;
                let count: i64 = tx.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
                if !exists && count >= max {
                    return Err(Error::QuotaExceeded(max_entries));
                }

                tx.execute(
                    "INSERT INTO articles (key, source_url, raw_content, styles, fetched_at_ms)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(key) DO UPDATE SET
                        source_url = excluded.source_url,
                        raw_content = excluded.raw_content,
                        styles = excluded.styles,
                        fetched_at_ms = excluded.fetched_at_ms",
                    params![entry.key, entry.source_url, entry.raw_content, entry.styles, entry.fetched_at_ms],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get an article by storage key.
    pub async fn get_article(&self, key: &str) -> Result<Option<CacheEntry>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let result = conn.query_row(
                    "SELECT key, source_url, raw_content, styles, fetched_at_ms
                     FROM articles WHERE key = ?1",
                    params![key],
                    row_to_entry,
                );

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Delete an article. Returns whether a row was removed.
    pub async fn delete_article(&self, key: &str) -> Result<bool, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM articles WHERE key = ?1", params![key])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of cached articles.
    pub async fn count_articles(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Remove up to `batch` of the oldest articles.
    ///
    /// Returns the number of deleted entries.
    pub async fn evict_oldest_articles(&self, batch: usize) -> Result<u64, Error> {
        let batch = batch as i64;
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let deleted = conn.execute(
                    "DELETE FROM articles WHERE key IN (
                        SELECT key FROM articles ORDER BY fetched_at_ms ASC LIMIT ?1
                    )",
                    params![batch],
                )?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete articles fetched before `cutoff_ms`.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_articles_before(&self, cutoff_ms: i64) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM articles WHERE fetched_at_ms < ?1", params![cutoff_ms])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Purge oldest entries until count <= max_entries.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_lru_articles(&self, max_entries: usize) -> Result<u64, Error> {
        let count = self.count_articles().await?;
        let max = max_entries as u64;
        if count <= max {
            return Ok(0);
        }
        self.evict_oldest_articles((count - max) as usize).await
    }
}
