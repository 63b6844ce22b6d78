//! Core types and shared functionality for magpie.
//!
//! This crate provides:
//! - Article cache and URL history with SQLite backend
//! - Unified error types
//! - Configuration structures, including the proxy set

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CacheEntry, CacheStore, HistoryEntry};
pub use config::{AppConfig, ConfigError, FetchStrategy, ProxyDescriptor, ResponseFormat};
pub use error::Error;
