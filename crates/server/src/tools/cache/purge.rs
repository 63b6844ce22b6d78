//! cache_purge tool implementation.
//!
//! Purges cached articles by expiry or count.

use magpie_core::{CacheStore, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Purge entries past the retention window.
    #[serde(default)]
    pub expired: Option<bool>,

    /// Keep only the newest N entries (LRU purge).
    #[serde(default)]
    pub max_entries: Option<usize>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: u64,
    /// Entries left in the cache.
    pub remaining: u64,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(cache: &CacheStore, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let expired = params.expired.unwrap_or(false);
    if !expired && params.max_entries.is_none() {
        return Err(Error::InvalidInput("At least one of expired or max_entries must be specified".to_string()).into());
    }

    let mut deleted_total = 0u64;

    if expired {
        deleted_total += cache.purge_expired().await?;
    }

    if let Some(max_entries) = params.max_entries {
        deleted_total += cache.purge_to(max_entries).await?;
    }

    let remaining = cache.count().await?;
    tracing::info!(deleted = deleted_total, remaining, "purged cache");
    json_result(&CachePurgeOutput { deleted: deleted_total, remaining })
}
