//! Visited and discovered URL lists.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{params, rusqlite};

/// A URL the reader has opened or an article has linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HistoryEntry {
    pub url: String,
    pub title: Option<String>,
    pub recorded_at_ms: i64,
}

fn row_to_history(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryEntry> {
    Ok(HistoryEntry { url: row.get(0)?, title: row.get(1)?, recorded_at_ms: row.get(2)? })
}

impl CacheDb {
    /// Record a visit, refreshing the timestamp of a repeat visit.
    pub async fn record_visited(&self, url: &str, title: Option<&str>, at_ms: i64) -> Result<(), Error> {
        let url = url.to_string();
        let title = title.map(str::to_string);
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO visited (url, title, recorded_at_ms) VALUES (?1, ?2, ?3)
                     ON CONFLICT(url) DO UPDATE SET
                        title = COALESCE(excluded.title, visited.title),
                        recorded_at_ms = excluded.recorded_at_ms",
                    params![url, title, at_ms],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Most recent visits first.
    pub async fn list_visited(&self, limit: usize) -> Result<Vec<HistoryEntry>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<HistoryEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, title, recorded_at_ms FROM visited
                     ORDER BY recorded_at_ms DESC, rowid DESC LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![limit], row_to_history)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await
            .map_err(Error::from)
    }

    /// Record newly discovered links and trim the list to the `cap` most recent.
    ///
    /// Returns how many entries were trimmed.
    pub async fn record_discovered(
        &self, links: &[(String, Option<String>)], at_ms: i64, cap: usize,
    ) -> Result<u64, Error> {
        let links = links.to_vec();
        let cap = cap as i64;
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO discovered (url, title, recorded_at_ms) VALUES (?1, ?2, ?3)
                         ON CONFLICT(url) DO UPDATE SET
                            title = COALESCE(excluded.title, discovered.title),
                            recorded_at_ms = excluded.recorded_at_ms",
                    )?;
                    for (url, title) in &links {
                        stmt.execute(params![url, title, at_ms])?;
                    }
                }
                let trimmed = tx.execute(
                    "DELETE FROM discovered WHERE url NOT IN (
                        SELECT url FROM discovered ORDER BY recorded_at_ms DESC, rowid DESC LIMIT ?1
                    )",
                    params![cap],
                )?;
                tx.commit()?;
                Ok(trimmed as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Most recently discovered first.
    pub async fn list_discovered(&self, limit: usize) -> Result<Vec<HistoryEntry>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<HistoryEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, title, recorded_at_ms FROM discovered
                     ORDER BY recorded_at_ms DESC, rowid DESC LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![limit], row_to_history)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await
            .map_err(Error::from)
    }

    /// Discovered URLs that have never been visited, most recent first.
    pub async fn list_unvisited_discovered(&self, limit: usize) -> Result<Vec<HistoryEntry>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<HistoryEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT d.url, d.title, d.recorded_at_ms FROM discovered d
                     LEFT JOIN visited v ON v.url = d.url
                     WHERE v.url IS NULL
                     ORDER BY d.recorded_at_ms DESC, d.rowid DESC LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![limit], row_to_history)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await
            .map_err(Error::from)
    }
}
