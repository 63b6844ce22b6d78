//! MCP tool implementations.
//!
//! This module contains all tools exposed by the magpie server.

pub mod article;
pub mod cache;
pub mod poem;
pub mod words;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use magpie_core::Error;

/// Wrap a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Session over an in-memory cache whose only proxy refuses connections.
#[cfg(test)]
pub(crate) async fn test_session() -> magpie_client::Session {
    use magpie_core::{AppConfig, CacheDb, ProxyDescriptor, ResponseFormat};

    let config = AppConfig {
        proxies: vec![ProxyDescriptor::new("closed", "http://127.0.0.1:9/?url={url}", ResponseFormat::RawText)],
        race_timeout_ms: 1_000,
        ..AppConfig::default()
    };
    let db = CacheDb::open_in_memory().await.unwrap();
    magpie_client::Session::from_config(&config, db).unwrap()
}

/// Text of the first content item of a tool result.
#[cfg(test)]
pub(crate) fn result_text(result: &CallToolResult) -> String {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content")
        .to_string()
}
