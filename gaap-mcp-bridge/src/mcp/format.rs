//! Rendering of tool responses as MCP text content.

use serde::Serialize;

use crate::models::ToolResponse;

/// Content type tag of [`TextContent`].
const TEXT_CONTENT_TYPE: &str = "text";

/// One text block of a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    /// Always `"text"`.
    #[serde(rename = "type")]
    pub content_type: &'static str,
    /// Rendered text.
    pub text: String,
}

impl TextContent {
    /// Creates a text block.
    #[must_use]
    pub const fn new(text: String) -> Self {
        Self { content_type: TEXT_CONTENT_TYPE, text }
    }
}

/// Result of an MCP `tools/call`.
///
/// # Examples
///
/// ```
/// use gaap_mcp_bridge::mcp::format::CallToolResult;
///
/// let ok = serde_json::to_value(CallToolResult::text("done"))?;
/// assert_eq!(ok, serde_json::json!({"content": [{"type": "text", "text": "done"}]}));
///
/// let failed = serde_json::to_value(CallToolResult::error("Error: boom"))?;
/// assert_eq!(failed["isError"], true);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallToolResult {
    /// Content blocks; this bridge always emits exactly one.
    pub content: Vec<TextContent>,
    /// Set for failed calls.
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl CallToolResult {
    /// Successful result carrying `text`.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for constructors"
    )]
    pub fn text(text: impl Into<String>) -> Self {
        Self { content: vec![TextContent::new(text.into())], is_error: false }
    }

    /// Failed result carrying `text`.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for constructors"
    )]
    pub fn error(text: impl Into<String>) -> Self {
        Self { content: vec![TextContent::new(text.into())], is_error: true }
    }

    /// Concatenated text of all content blocks.
    #[must_use]
    pub fn joined_text(&self) -> String {
        self.content.iter().map(|block| block.text.as_str()).collect::<Vec<_>>().join("\n")
    }
}

/// Renders a tool response for the agent.
///
/// `correlation_id` is the locally chosen id, shown when the remote side did
/// not echo one.
#[must_use]
pub fn render_response(tool: &str, correlation_id: &str, response: &ToolResponse) -> CallToolResult {
    if !response.success {
        let message = response.error_summary().unwrap_or_else(|| "Unknown error occurred".to_owned());
        return CallToolResult::error(format!("Error: {message}"));
    }

    let meta = &response.meta;
    let result = response.result.as_ref();

    let mut lines = vec![
        format!("Tool: {tool}"),
        format!("Layer: {}", meta.gaap_layer),
        format!("Execution: {}ms", meta.execution_ms),
    ];
    if meta.camdl_anchored {
        lines.push("CamDL Anchored: Yes".to_owned());
    }
    if let Some(audit_event_id) = result.and_then(|r| r.audit_event_id.as_deref()).filter(|id| !id.is_empty()) {
        lines.push(format!("Audit Event ID: {audit_event_id}"));
    }
    let shown_correlation = result
        .and_then(|r| r.correlation_id.as_deref())
        .filter(|id| !id.is_empty())
        .unwrap_or(correlation_id);
    lines.push(format!("Correlation ID: {shown_correlation}"));
    lines.push("Result:".to_owned());

    if let Some(result) = result {
        let pretty = serde_json::to_string_pretty(&result.data).unwrap_or_else(|_| "{}".to_owned());
        lines.push(pretty);
    }

    CallToolResult::text(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;
    use crate::models::{ResponseMeta, ToolError, ToolResult};

    fn meta(anchored: bool) -> ResponseMeta {
        ResponseMeta {
            request_id: "req-1".to_owned(),
            execution_ms: 42.0,
            gaap_layer: "L1".to_owned(),
            camdl_anchored: anchored,
        }
    }

    #[test]
    fn test_render_success_full() {
        let result = ToolResult {
            data: json!({"event_id": "evt-1"}).as_object().cloned().unwrap(),
            audit_event_id: Some("evt-1".to_owned()),
            correlation_id: Some("remote-c".to_owned()),
        };
        let rendered = render_response("gaap_audit_log_event", "local-c", &ToolResponse::success(result, meta(true)));

        assert!(!rendered.is_error);
        assert_eq!(
            rendered.joined_text(),
            "Tool: gaap_audit_log_event\nLayer: L1\nExecution: 42ms\nCamDL Anchored: Yes\n\
             Audit Event ID: evt-1\nCorrelation ID: remote-c\nResult:\n{\n  \"event_id\": \"evt-1\"\n}"
        );
    }

    #[test]
    fn test_render_success_minimal_uses_local_correlation() {
        let result = ToolResult { data: Map::new(), audit_event_id: None, correlation_id: None };
        let rendered = render_response("gaap_policy_evaluate", "local-c", &ToolResponse::success(result, meta(false)));

        assert_eq!(
            rendered.joined_text(),
            "Tool: gaap_policy_evaluate\nLayer: L1\nExecution: 42ms\nCorrelation ID: local-c\nResult:\n{}"
        );
    }

    #[test]
    fn test_render_success_without_result_has_no_data_block() {
        let response = ToolResponse { success: true, result: None, error: None, meta: meta(false) };
        let rendered = render_response("gaap_policy_evaluate", "local-c", &response);

        assert!(!rendered.is_error);
        assert_eq!(
            rendered.joined_text(),
            "Tool: gaap_policy_evaluate\nLayer: L1\nExecution: 42ms\nCorrelation ID: local-c\nResult:"
        );
    }

    #[test]
    fn test_render_fractional_execution_time() {
        let result = ToolResult { data: Map::new(), audit_event_id: None, correlation_id: None };
        let mut meta = meta(false);
        meta.execution_ms = 12.5;
        let rendered = render_response("gaap_policy_evaluate", "c", &ToolResponse::success(result, meta));
        assert!(rendered.joined_text().contains("Execution: 12.5ms"));
    }

    #[test]
    fn test_render_failure_with_action() {
        let error = ToolError {
            code: "VALIDATION_FAILED".to_owned(),
            message: "amount must be positive".to_owned(),
            recoverable: false,
            suggested_action: Some("fix the amount".to_owned()),
        };
        let rendered = render_response("gaap_khqr_generate", "c", &ToolResponse::failure(error, meta(false)));

        assert!(rendered.is_error);
        assert_eq!(rendered.joined_text(), "Error: VALIDATION_FAILED: amount must be positive (fix the amount)");
    }

    #[test]
    fn test_render_failure_without_descriptor() {
        let response = ToolResponse { success: false, result: None, error: None, meta: meta(false) };
        let rendered = render_response("gaap_khqr_generate", "c", &response);
        assert!(rendered.is_error);
        assert_eq!(rendered.joined_text(), "Error: Unknown error occurred");
    }

    #[test]
    fn test_render_network_error() {
        let rendered = render_response("gaap_khqr_generate", "c", &ToolResponse::network_error("connection refused"));
        assert_eq!(rendered.joined_text(), "Error: NETWORK_ERROR: connection refused");
    }

    #[test]
    fn test_is_error_omitted_when_false() {
        let value = serde_json::to_value(CallToolResult::text("ok")).unwrap();
        assert!(value.get("isError").is_none());
        assert_eq!(value["content"][0]["type"], "text");
    }
}
