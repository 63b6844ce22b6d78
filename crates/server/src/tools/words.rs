//! word_toggle and redactions_clear tool implementations.

use magpie_client::{Session, WordId};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for word_toggle tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WordToggleParams {
    /// Zero-based paragraph number.
    pub paragraph: usize,
    /// Zero-based word index within the paragraph; punctuation is not counted.
    pub index: usize,
}

/// Output structure for word_toggle tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WordToggleOutput {
    pub paragraph: usize,
    pub index: usize,
    /// Whether the word is blacked out after the toggle.
    pub redacted: bool,
}

/// Input parameters for redactions_clear tool (none).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RedactionsClearParams {}

/// Output structure for redactions_clear tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RedactionsClearOutput {
    /// Number of words that were blacked out.
    pub cleared: usize,
}

/// Implementation of the word_toggle tool.
pub async fn toggle_impl(session: &Session, params: WordToggleParams) -> Result<CallToolResult, McpError> {
    let id = WordId { paragraph: params.paragraph, index: params.index };
    let redacted = session.toggle(id).await?;

    json_result(&WordToggleOutput { paragraph: params.paragraph, index: params.index, redacted })
}

/// Implementation of the redactions_clear tool.
pub async fn clear_impl(session: &Session, _params: RedactionsClearParams) -> Result<CallToolResult, McpError> {
    let cleared = session.clear_redactions().await;
    json_result(&RedactionsClearOutput { cleared })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::article::{ArticleOpenParams, open_impl};
    use crate::tools::{result_text, test_session};

    #[tokio::test]
    async fn test_toggle_without_text() {
        let session = test_session().await;
        let params = WordToggleParams { paragraph: 0, index: 0 };

        let err = toggle_impl(&session, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_toggle_then_clear() {
        let session = test_session().await;
        open_impl(&session, ArticleOpenParams { url: "https://example.org/a".into() })
            .await
            .unwrap();

        let result = toggle_impl(&session, WordToggleParams { paragraph: 0, index: 1 }).await.unwrap();
        let output: WordToggleOutput = serde_json::from_str(&result_text(&result)).unwrap();
        assert!(output.redacted);

        let result = clear_impl(&session, RedactionsClearParams::default()).await.unwrap();
        let output: RedactionsClearOutput = serde_json::from_str(&result_text(&result)).unwrap();
        assert_eq!(output.cleared, 1);
    }

    #[tokio::test]
    async fn test_toggle_out_of_range() {
        let session = test_session().await;
        open_impl(&session, ArticleOpenParams { url: "https://example.org/a".into() })
            .await
            .unwrap();

        let result = toggle_impl(&session, WordToggleParams { paragraph: 99, index: 0 }).await;
        assert!(result.is_err());
    }
}
