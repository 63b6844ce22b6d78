//! Soft-failing article cache.
//!
//! Every operation here swallows storage errors: a failed read is a miss and
//! a failed write is dropped. Worst case the caller refetches.

use super::articles::CacheEntry;
use super::connection::CacheDb;
use super::hash::article_key;
use super::history::HistoryEntry;
use super::now_ms;
use crate::AppConfig;

/// Limits applied by [`CacheStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub retention_ms: i64,
    pub max_entries: usize,
    pub eviction_batch: usize,
    pub discovered_cap: usize,
}

impl From<&AppConfig> for CachePolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            retention_ms: config.retention_ms(),
            max_entries: config.cache_max_entries,
            eviction_batch: config.cache_eviction_batch,
            discovered_cap: config.discovered_cap,
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Article cache with read-time expiry and quota eviction.
#[derive(Clone, Debug)]
pub struct CacheStore {
    db: CacheDb,
    policy: CachePolicy,
}

impl CacheStore {
    pub fn new(db: CacheDb, policy: CachePolicy) -> Self {
        Self { db, policy }
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Look up a live entry for `url`.
    ///
    /// Expired entries are deleted and reported as absent.
    pub async fn get(&self, url: &str) -> Option<CacheEntry> {
        let key = article_key(url);
        let entry = match self.db.get_article(&key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(url, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        if entry.is_expired(now_ms(), self.policy.retention_ms) {
            tracing::debug!(url, fetched_at_ms = entry.fetched_at_ms, "cache entry expired");
            if let Err(e) = self.db.delete_article(&key).await {
                tracing::warn!(url, error = %e, "failed to delete expired cache entry");
            }
            return None;
        }

        tracing::debug!(url, "cache hit");
        Some(entry)
    }

    /// Store fetched content for `url`.
    ///
    /// On failure, evicts up to `eviction_batch` of the oldest entries and
    /// retries once; a second failure drops the write.
    pub async fn put(&self, url: &str, raw_content: &str, styles: &str) {
        let entry = CacheEntry {
            key: article_key(url),
            source_url: url.to_string(),
            raw_content: raw_content.to_string(),
            styles: styles.to_string(),
            fetched_at_ms: now_ms(),
        };

        let first = match self.db.insert_article_within(&entry, self.policy.max_entries).await {
            Ok(()) => {
                tracing::debug!(url, bytes = raw_content.len(), "cached article");
                return;
            }
            Err(e) => e,
        };

        tracing::warn!(url, error = %first, "cache write failed, evicting oldest entries");
        match self.db.evict_oldest_articles(self.policy.eviction_batch).await {
            Ok(evicted) => tracing::debug!(evicted, "evicted cache entries"),
            Err(e) => tracing::warn!(error = %e, "cache eviction failed"),
        }

        match self.db.insert_article_within(&entry, self.policy.max_entries).await {
            Ok(()) => tracing::debug!(url, "cached article after eviction"),
            Err(e) => tracing::warn!(url, error = %e, "cache write dropped"),
        }
    }

    /// Drop the entry for `url`, if any.
    pub async fn invalidate(&self, url: &str) {
        if let Err(e) = self.db.delete_article(&article_key(url)).await {
            tracing::warn!(url, error = %e, "cache invalidation failed");
        }
    }

    /// Delete every entry past the retention window.
    pub async fn purge_expired(&self) -> Result<u64, crate::Error> {
        self.db.purge_articles_before(now_ms() - self.policy.retention_ms).await
    }

    /// Delete the oldest entries until at most `max_entries` remain.
    pub async fn purge_to(&self, max_entries: usize) -> Result<u64, crate::Error> {
        self.db.purge_lru_articles(max_entries).await
    }

    pub async fn count(&self) -> Result<u64, crate::Error> {
        self.db.count_articles().await
    }

    pub async fn record_visited(&self, url: &str, title: Option<&str>) {
        if let Err(e) = self.db.record_visited(url, title, now_ms()).await {
            tracing::warn!(url, error = %e, "failed to record visit");
        }
    }

    pub async fn record_discovered(&self, links: &[(String, Option<String>)]) {
        if links.is_empty() {
            return;
        }
        match self.db.record_discovered(links, now_ms(), self.policy.discovered_cap).await {
            Ok(trimmed) => tracing::debug!(added = links.len(), trimmed, "recorded discovered links"),
            Err(e) => tracing::warn!(error = %e, "failed to record discovered links"),
        }
    }

    pub async fn visited(&self, limit: usize) -> Vec<HistoryEntry> {
        self.db.list_visited(limit).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to read visited list");
            Vec::new()
        })
    }

    pub async fn discovered(&self, limit: usize) -> Vec<HistoryEntry> {
        self.db.list_discovered(limit).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to read discovered list");
            Vec::new()
        })
    }

    pub async fn unvisited_discovered(&self) -> Vec<HistoryEntry> {
        self.db
            .list_unvisited_discovered(self.policy.discovered_cap)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to read discovered list");
                Vec::new()
            })
    }
}
