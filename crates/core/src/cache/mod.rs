//! SQLite-backed cache for fetched articles and URL history.
//!
//! This module provides a persistent, URL-keyed article cache using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Hashed storage keys derived from the canonical URL
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Read-time expiry and quota eviction
//! - Visited and discovered URL lists

pub mod articles;
pub mod connection;
pub mod hash;
pub mod history;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use articles::CacheEntry;
pub use connection::CacheDb;
pub use history::HistoryEntry;
pub use store::{CachePolicy, CacheStore};

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
