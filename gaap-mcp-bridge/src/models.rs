//! Wire data model for the GaaP invoke endpoint.
//!
//! These types mirror the JSON exchanged with the remote side field for
//! field. Optional fields are omitted on serialization when absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder request id for metadata synthesized locally.
pub const LOCAL_REQUEST_ID: &str = "unknown";

/// Layer tag for metadata synthesized locally.
pub const LOCAL_LAYER: &str = "MCP";

/// Error code for transport-level failures.
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";

/// Tenant block attached to every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    /// Tenant identifier.
    pub tenant_id: String,
    /// Correlation ID for tracing related events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// A single tool invocation.
///
/// # Examples
///
/// ```
/// use gaap_mcp_bridge::models::{TenantContext, ToolRequest};
/// use serde_json::json;
///
/// let request = ToolRequest::new(
///     "gaap_policy_evaluate",
///     TenantContext { tenant_id: "t1".to_owned(), correlation_id: None },
///     json!({"amount": 25}).as_object().cloned().unwrap_or_default(),
/// );
/// let body = serde_json::to_string(&request)?;
/// assert_eq!(
///     body,
///     r#"{"tool":"gaap_policy_evaluate","tenant_context":{"tenant_id":"t1"},"params":{"amount":25}}"#
/// );
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Remote tool name.
    pub tool: String,
    /// Tenant context.
    pub tenant_context: TenantContext,
    /// Tool parameters, forwarded as-is.
    pub params: Map<String, Value>,
    /// Optional request metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl ToolRequest {
    /// Creates a request without metadata.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for constructors"
    )]
    pub fn new(tool: impl Into<String>, tenant_context: TenantContext, params: Map<String, Value>) -> Self {
        Self { tool: tool.into(), tenant_context, params, meta: None }
    }

    /// Attaches request metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Successful tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool-specific payload.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Audit event created for this call, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_event_id: Option<String>,
    /// Correlation ID echoed by the remote side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// Error descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Machine-readable code (`NETWORK_ERROR`, `HTTP_<status>`, or remote-defined).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Whether retrying the same request might succeed.
    pub recoverable: bool,
    /// Suggested next step for the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ToolError {
    /// One-line rendering: `code: message (suggested action)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gaap_mcp_bridge::models::ToolError;
    ///
    /// let error = ToolError {
    ///     code: "VALIDATION_FAILED".to_owned(),
    ///     message: "amount must be positive".to_owned(),
    ///     recoverable: false,
    ///     suggested_action: Some("fix the amount".to_owned()),
    /// };
    /// assert_eq!(error.summary(), "VALIDATION_FAILED: amount must be positive (fix the amount)");
    /// ```
    #[must_use]
    pub fn summary(&self) -> String {
        match self.suggested_action.as_deref().filter(|action| !action.is_empty()) {
            Some(action) => format!("{}: {} ({action})", self.code, self.message),
            None => format!("{}: {}", self.code, self.message),
        }
    }
}

/// Response metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Remote request identifier.
    pub request_id: String,
    /// Remote execution time in milliseconds.
    pub execution_ms: f64,
    /// GaaP layer that served the call.
    pub gaap_layer: String,
    /// Whether the event was anchored to CamDL.
    pub camdl_anchored: bool,
}

impl ResponseMeta {
    /// Metadata for responses synthesized without hearing from the remote side.
    #[must_use]
    pub fn local() -> Self {
        Self {
            request_id: LOCAL_REQUEST_ID.to_owned(),
            execution_ms: 0.0,
            gaap_layer: LOCAL_LAYER.to_owned(),
            camdl_anchored: false,
        }
    }
}

impl Default for ResponseMeta {
    fn default() -> Self {
        Self::local()
    }
}

/// Normalized outcome of one tool invocation.
///
/// Exactly one of `result` / `error` is populated; `meta` is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Whether the call succeeded.
    pub success: bool,
    /// Output on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolResult>,
    /// Error descriptor on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    /// Response metadata.
    #[serde(default)]
    pub meta: ResponseMeta,
}

impl ToolResponse {
    /// Successful response.
    #[must_use]
    pub const fn success(result: ToolResult, meta: ResponseMeta) -> Self {
        Self { success: true, result: Some(result), error: None, meta }
    }

    /// Failed response.
    #[must_use]
    pub const fn failure(error: ToolError, meta: ResponseMeta) -> Self {
        Self { success: false, result: None, error: Some(error), meta }
    }

    /// Transport failure before any response arrived. Always recoverable.
    ///
    /// # Examples
    ///
    /// ```
    /// use gaap_mcp_bridge::models::ToolResponse;
    ///
    /// let response = ToolResponse::network_error("connection refused");
    /// let error = response.error.as_ref().unwrap();
    /// assert_eq!(error.code, "NETWORK_ERROR");
    /// assert!(error.recoverable);
    /// assert_eq!(response.meta.request_id, "unknown");
    /// ```
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for constructors"
    )]
    pub fn network_error(message: impl Into<String>) -> Self {
        Self::failure(
            ToolError {
                code: NETWORK_ERROR.to_owned(),
                message: message.into(),
                recoverable: true,
                suggested_action: None,
            },
            ResponseMeta::local(),
        )
    }

    /// Non-2xx HTTP status. Recoverable iff the status is 5xx.
    ///
    /// # Examples
    ///
    /// ```
    /// use gaap_mcp_bridge::models::ToolResponse;
    ///
    /// let response = ToolResponse::http_error(503, "Service Unavailable");
    /// let error = response.error.as_ref().unwrap();
    /// assert_eq!(error.code, "HTTP_503");
    /// assert_eq!(error.message, "HTTP error: 503 Service Unavailable");
    /// assert!(error.recoverable);
    ///
    /// assert!(!ToolResponse::http_error(400, "Bad Request").error.unwrap().recoverable);
    /// ```
    #[must_use]
    pub fn http_error(status: u16, reason: &str) -> Self {
        let message = if reason.is_empty() {
            format!("HTTP error: {status}")
        } else {
            format!("HTTP error: {status} {reason}")
        };
        Self::failure(
            ToolError {
                code: format!("HTTP_{status}"),
                message,
                recoverable: status >= 500,
                suggested_action: None,
            },
            ResponseMeta::local(),
        )
    }

    /// Checks that exactly one of `result` / `error` is set and agrees with `success`.
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        match (&self.result, &self.error) {
            (Some(_), None) => self.success,
            (None, Some(_)) => !self.success,
            _ => false,
        }
    }

    /// One-line error rendering, or `None` for successful responses.
    #[must_use]
    pub fn error_summary(&self) -> Option<String> {
        self.error.as_ref().map(ToolError::summary)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_tool_request_omits_absent_optionals() {
        let request = ToolRequest::new(
            "gaap_khqr_verify_settlement",
            TenantContext { tenant_id: "t1".to_owned(), correlation_id: None },
            Map::new(),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"tool": "gaap_khqr_verify_settlement", "tenant_context": {"tenant_id": "t1"}, "params": {}})
        );
    }

    #[test]
    fn test_tool_request_with_meta_and_correlation() {
        let mut meta = Map::new();
        meta.insert("source_workflow".to_owned(), json!("claude-desktop-mcp"));
        let request = ToolRequest::new(
            "gaap_audit_log_event",
            TenantContext { tenant_id: "t1".to_owned(), correlation_id: Some("c-1".to_owned()) },
            json!({"event_type": "order.created"}).as_object().cloned().unwrap(),
        )
        .with_meta(meta);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["tenant_context"]["correlation_id"], "c-1");
        assert_eq!(value["meta"]["source_workflow"], "claude-desktop-mcp");
        assert_eq!(value["params"]["event_type"], "order.created");
    }

    #[test]
    fn test_parse_success_response() {
        let body = json!({
            "success": true,
            "result": {
                "data": {"qr": "000201..."},
                "audit_event_id": "evt-1",
                "correlation_id": "c-1"
            },
            "meta": {
                "request_id": "req-9",
                "execution_ms": 42,
                "gaap_layer": "L3",
                "camdl_anchored": true
            }
        });

        let response: ToolResponse = serde_json::from_value(body).unwrap();
        assert!(response.is_well_formed());
        let result = response.result.as_ref().unwrap();
        assert_eq!(result.audit_event_id.as_deref(), Some("evt-1"));
        assert_eq!(result.data["qr"], "000201...");
        assert_eq!(response.meta.request_id, "req-9");
        assert!((response.meta.execution_ms - 42.0).abs() < f64::EPSILON);
        assert!(response.meta.camdl_anchored);
    }

    #[test]
    fn test_parse_remote_error_response() {
        let body = json!({
            "success": false,
            "error": {
                "code": "VALIDATION_FAILED",
                "message": "merchant_name too long",
                "recoverable": false,
                "suggested_action": "shorten merchant_name"
            },
            "meta": {"request_id": "req-1", "execution_ms": 3, "gaap_layer": "L3", "camdl_anchored": false}
        });

        let response: ToolResponse = serde_json::from_value(body).unwrap();
        assert!(response.is_well_formed());
        assert_eq!(
            response.error_summary().as_deref(),
            Some("VALIDATION_FAILED: merchant_name too long (shorten merchant_name)")
        );
    }

    #[test]
    fn test_missing_meta_defaults_to_local() {
        let response: ToolResponse =
            serde_json::from_value(json!({"success": true, "result": {"data": {}}})).unwrap();
        assert_eq!(response.meta, ResponseMeta::local());
    }

    #[test]
    fn test_is_well_formed_rejects_ambiguous_shapes() {
        let meta = ResponseMeta::local();
        let neither = ToolResponse { success: true, result: None, error: None, meta: meta.clone() };
        assert!(!neither.is_well_formed());

        let mut both = ToolResponse::network_error("x");
        both.result = Some(ToolResult { data: Map::new(), audit_event_id: None, correlation_id: None });
        assert!(!both.is_well_formed());

        let mismatched = ToolResponse { success: true, ..ToolResponse::network_error("x") };
        assert!(!mismatched.is_well_formed());
    }

    #[test]
    fn test_http_error_boundaries() {
        assert!(!ToolResponse::http_error(499, "").error.unwrap().recoverable);
        assert!(ToolResponse::http_error(500, "Internal Server Error").error.unwrap().recoverable);
        assert_eq!(ToolResponse::http_error(418, "").error.unwrap().message, "HTTP error: 418");
    }

    #[test]
    fn test_local_responses_are_well_formed() {
        assert!(ToolResponse::network_error("dns failure").is_well_formed());
        assert!(ToolResponse::http_error(404, "Not Found").is_well_formed());
    }

    #[test]
    fn test_summary_without_action() {
        let error = ToolResponse::network_error("connection refused").error.unwrap();
        assert_eq!(error.summary(), "NETWORK_ERROR: connection refused");
    }
}
