//! Routing of MCP tool calls to the GaaP invoker.

use serde_json::{Map, Value, json};
use tracing::{info, instrument, warn};

use crate::{
    client::GaapClient,
    mcp::{
        catalog::{find_tool, tool_names},
        format::{CallToolResult, render_response},
    },
    models::{TenantContext, ToolRequest},
};

/// `meta.source_workflow` attached to every request.
pub const SOURCE_WORKFLOW: &str = "claude-desktop-mcp";

/// Turns `tools/call` invocations into signed GaaP requests.
///
/// Validation failures (unknown tool, missing arguments) are answered
/// locally without touching the network.
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    client: GaapClient,
    tenant_id: String,
}

impl ToolDispatcher {
    /// Creates a dispatcher sending requests on behalf of `tenant_id`.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for constructors"
    )]
    pub fn new(client: GaapClient, tenant_id: impl Into<String>) -> Self {
        Self { client, tenant_id: tenant_id.into() }
    }

    /// Handles one tool call.
    ///
    /// `arguments` must be a JSON object or absent. Every outcome, including
    /// hard faults from the invoker, is reported as a [`CallToolResult`].
    #[instrument(skip(self, arguments), fields(tool = %name))]
    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> CallToolResult {
        let Some(tool) = find_tool(name) else {
            warn!("unknown tool requested");
            return CallToolResult::error(format!(
                "Error: Unknown tool '{name}'. Available tools: {}",
                tool_names().join(", ")
            ));
        };

        let params = match arguments {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return CallToolResult::error(format!(
                    "Error: Tool arguments must be a JSON object, got {}",
                    json_type_name(&other)
                ));
            }
        };

        let missing = tool.missing_params(&params);
        if !missing.is_empty() {
            warn!(missing = ?missing, "tool call rejected");
            return CallToolResult::error(format!(
                "Error: Missing required parameter(s): {}",
                missing.join(", ")
            ));
        }

        let millis = chrono::Utc::now().timestamp_millis();
        let correlation_id = params
            .get("correlation_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map_or_else(|| generate_correlation_id(millis), str::to_owned);

        let meta = json!({"source_workflow": SOURCE_WORKFLOW, "request_id": format!("mcp-{millis}")});
        let request = ToolRequest::new(
            name,
            TenantContext { tenant_id: self.tenant_id.clone(), correlation_id: Some(correlation_id.clone()) },
            params,
        )
        .with_meta(meta.as_object().cloned().unwrap_or_default());

        match self.client.invoke(&request).await {
            Ok(response) => {
                info!(success = response.success, correlation_id = %correlation_id, "tool call completed");
                render_response(name, &correlation_id, &response)
            }
            Err(e) => {
                warn!(error = %e, correlation_id = %correlation_id, "tool call failed");
                CallToolResult::error(format!("Error: {e}"))
            }
        }
    }
}

/// Builds `mcp-<millis>-<8 hex>`.
fn generate_correlation_id(millis: i64) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("mcp-{millis}-{}", &suffix[..8])
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BridgeConfig, Credentials};

    fn dispatcher() -> ToolDispatcher {
        // Port 9 (discard) on loopback; validation paths never reach it.
        let config = BridgeConfig::new(Credentials::new("t1", "k1", "s"))
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/webhook/gaap-mcp/invoke")
            .unwrap();
        ToolDispatcher::new(GaapClient::new(&config).unwrap(), "t1")
    }

    #[test]
    fn test_generate_correlation_id_shape() {
        let id = generate_correlation_id(1_700_000_000_000);
        let suffix = id.strip_prefix("mcp-1700000000000-").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_unknown_tool_lists_available_tools() {
        let result = dispatcher().call_tool("gaap_identity_verify", None).await;
        assert!(result.is_error);
        assert_eq!(
            result.joined_text(),
            "Error: Unknown tool 'gaap_identity_verify'. Available tools: gaap_audit_log_event, \
             gaap_khqr_generate, gaap_khqr_verify_settlement, gaap_policy_evaluate, gaap_policy_publish_intent"
        );
    }

    #[tokio::test]
    async fn test_missing_params_reported() {
        let result = dispatcher()
            .call_tool("gaap_khqr_generate", Some(json!({"amount": 5})))
            .await;
        assert!(result.is_error);
        assert_eq!(result.joined_text(), "Error: Missing required parameter(s): merchant_name, account_id");
    }

    #[tokio::test]
    async fn test_absent_arguments_are_empty_object() {
        let result = dispatcher().call_tool("gaap_policy_evaluate", None).await;
        assert_eq!(result.joined_text(), "Error: Missing required parameter(s): amount");
    }

    #[tokio::test]
    async fn test_non_object_arguments_rejected() {
        let result = dispatcher().call_tool("gaap_policy_evaluate", Some(json!([1, 2]))).await;
        assert!(result.is_error);
        assert!(result.joined_text().contains("must be a JSON object, got array"));
    }
}
