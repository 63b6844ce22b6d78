//! article_open and article_spin tool implementations.
//!
//! Both replace the working text. Results of a request that was overtaken by
//! a newer one come back with status `superseded` and change nothing.

use magpie_client::Session;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for article_open tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArticleOpenParams {
    /// The article URL. A missing scheme defaults to https.
    pub url: String,
}

/// Input parameters for article_spin tool (none).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ArticleSpinParams {}

/// Implementation of the article_open tool.
pub async fn open_impl(session: &Session, params: ArticleOpenParams) -> Result<CallToolResult, McpError> {
    let outcome = session.open(&params.url).await?;
    json_result(&outcome)
}

/// Implementation of the article_spin tool.
pub async fn spin_impl(session: &Session, _params: ArticleSpinParams) -> Result<CallToolResult, McpError> {
    let outcome = session.spin().await?;
    json_result(&outcome)
}
