//! cache_get tool implementation.
//!
//! Retrieves the cached article for a URL.

use magpie_client::fetch::canonicalize;
use magpie_core::{CacheEntry, CacheStore, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// The article URL; canonicalized the same way as article_open.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    /// The cached entry.
    pub entry: CacheEntry,
    /// When the entry stops being served, in Unix milliseconds.
    pub expires_at_ms: i64,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(cache: &CacheStore, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = canonicalize(&params.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

    let entry = cache
        .get(url.as_str())
        .await
        .ok_or_else(|| Error::CacheMiss(url.to_string()))?;

    let expires_at_ms = entry.fetched_at_ms + cache.policy().retention_ms;
    json_result(&CacheGetOutput { entry, expires_at_ms })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::result_text;
    use magpie_core::CacheDb;
    use magpie_core::cache::CachePolicy;

    async fn store() -> CacheStore {
        CacheStore::new(CacheDb::open_in_memory().await.unwrap(), CachePolicy::default())
    }

    #[tokio::test]
    async fn test_get_impl_missing() {
        let cache = store().await;
        let params = CacheGetParams { url: "https://example.com/nothing".to_string() };

        let err = get_impl(&cache, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let cache = store().await;
        cache.put("https://example.com/story", "<html>story</html>", "").await;

        let params = CacheGetParams { url: "HTTPS://Example.com/story#top".to_string() };
        let result = get_impl(&cache, params).await.unwrap();
        let output: CacheGetOutput = serde_json::from_str(&result_text(&result)).unwrap();

        assert_eq!(output.entry.source_url, "https://example.com/story");
        assert_eq!(output.entry.raw_content, "<html>story</html>");
        assert_eq!(output.expires_at_ms - output.entry.fetched_at_ms, 7 * 24 * 60 * 60 * 1000);
    }

    #[tokio::test]
    async fn test_get_impl_invalid_url() {
        let cache = store().await;
        let params = CacheGetParams { url: String::new() };
        assert!(get_impl(&cache, params).await.is_err());
    }
}
