//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::article::{ArticleOpenParams, ArticleSpinParams, open_impl, spin_impl};
use crate::tools::cache::{CacheGetParams, CachePurgeParams, get_impl, purge_impl};
use crate::tools::poem::{PoemRenderParams, render_impl};
use crate::tools::words::{RedactionsClearParams, WordToggleParams, clear_impl, toggle_impl};

use magpie_client::Session;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for magpie.
#[derive(Clone)]
pub struct MagpieServer {
    tool_router: ToolRouter<Self>,
    session: Arc<Session>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl MagpieServer {
    /// Create a new server handler around the shared session.
    pub fn new(session: Arc<Session>) -> Self {
        Self { tool_router: Self::tool_router(), session }
    }

    /// Load an article as the working text.
    ///
    /// Served from cache when fresh, otherwise fetched through the proxies.
    /// Falls back to a bundled passage when the article is unavailable.
    #[tool(description = "Open an article by URL as the working text. Returns its paragraphs and word tokens. \
                          Falls back to a bundled passage if the article cannot be fetched.")]
    async fn article_open(&self, params: Parameters<ArticleOpenParams>) -> Result<CallToolResult, McpError> {
        open_impl(&self.session, params.0).await
    }

    #[tool(description = "Open a randomly chosen article from the curated sources.")]
    async fn article_spin(&self, params: Parameters<ArticleSpinParams>) -> Result<CallToolResult, McpError> {
        spin_impl(&self.session, params.0).await
    }

    #[tool(description = "Toggle the blackout of one word, addressed by paragraph and word index.")]
    async fn word_toggle(&self, params: Parameters<WordToggleParams>) -> Result<CallToolResult, McpError> {
        toggle_impl(&self.session, params.0).await
    }

    #[tool(description = "Remove every blackout from the working text.")]
    async fn redactions_clear(&self, params: Parameters<RedactionsClearParams>) -> Result<CallToolResult, McpError> {
        clear_impl(&self.session, params.0).await
    }

    /// Render the working text.
    ///
    /// Returns both the blacked-out page and the poem formed by the words left visible.
    #[tool(description = "Render the blacked-out page and the poem formed by the remaining words.")]
    async fn poem_render(&self, params: Parameters<PoemRenderParams>) -> Result<CallToolResult, McpError> {
        render_impl(&self.session, params.0).await
    }

    #[tool(description = "Get the cached raw content for an article URL, if present and unexpired.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(self.session.articles().cache(), params.0).await
    }

    #[tool(description = "Purge cached articles: expired entries, or all but the newest N.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(self.session.articles().cache(), params.0).await
    }
}

impl ServerHandler for MagpieServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "magpie".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Blackout poetry over web articles. Open or spin an article, toggle words, then render the poem."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
