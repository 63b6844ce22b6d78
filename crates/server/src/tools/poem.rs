//! poem_render tool implementation.
//!
//! Text rendering of the page in two forms: the blacked-out page with block
//! characters over redacted words, and the poem made of what is left.

use magpie_client::Session;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for poem_render tool (none).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PoemRenderParams {}

/// Implementation of the poem_render tool.
pub async fn render_impl(session: &Session, _params: PoemRenderParams) -> Result<CallToolResult, McpError> {
    json_result(&session.render().await)
}
