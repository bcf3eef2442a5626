//! Static catalog of the GaaP tools advertised over MCP.

use std::sync::LazyLock;

use serde::Serialize;
use serde_json::{Map, Value, json};

/// Audit logging with optional CamDL anchoring (layer L1).
pub const AUDIT_LOG_EVENT: &str = "gaap_audit_log_event";
/// KHQR payment code generation (layer L3).
pub const KHQR_GENERATE: &str = "gaap_khqr_generate";
/// KHQR settlement verification (layer L3).
pub const KHQR_VERIFY_SETTLEMENT: &str = "gaap_khqr_verify_settlement";
/// CamDX policy evaluation (layer L2).
pub const POLICY_EVALUATE: &str = "gaap_policy_evaluate";
/// CamDX payment intent publication (layer L2).
pub const POLICY_PUBLISH_INTENT: &str = "gaap_policy_publish_intent";

/// A tool as listed by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    /// Tool name, also used as the remote tool identifier.
    pub name: &'static str,
    /// Description shown to the agent.
    pub description: &'static str,
    /// JSON Schema of the arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Required argument names, in schema order.
    #[must_use]
    pub fn required_params(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|required| required.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Required argument names absent from `arguments`.
    ///
    /// Only presence is checked; `null` counts as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use gaap_mcp_bridge::mcp::catalog::{KHQR_VERIFY_SETTLEMENT, find_tool};
    /// use serde_json::json;
    ///
    /// let tool = find_tool(KHQR_VERIFY_SETTLEMENT).unwrap();
    /// let arguments = json!({"md5": "d41d8cd98f00b204e9800998ecf8427e"});
    /// assert_eq!(tool.missing_params(arguments.as_object().unwrap()), vec!["txn_ref"]);
    /// ```
    #[must_use]
    pub fn missing_params(&self, arguments: &Map<String, Value>) -> Vec<&str> {
        self.required_params()
            .into_iter()
            .filter(|name| arguments.get(*name).is_none_or(Value::is_null))
            .collect()
    }
}

static TOOLS: LazyLock<Vec<ToolDefinition>> = LazyLock::new(|| {
    vec![audit_log_event(), khqr_generate(), khqr_verify_settlement(), policy_evaluate(), policy_publish_intent()]
});

/// All advertised tools, in listing order.
#[must_use]
pub fn tools() -> &'static [ToolDefinition] {
    &TOOLS
}

/// Looks up a tool by name.
#[must_use]
pub fn find_tool(name: &str) -> Option<&'static ToolDefinition> {
    TOOLS.iter().find(|tool| tool.name == name)
}

/// Names of all advertised tools, in listing order.
#[must_use]
pub fn tool_names() -> Vec<&'static str> {
    TOOLS.iter().map(|tool| tool.name).collect()
}

fn correlation_id_property() -> Value {
    json!({"type": "string", "description": "Correlation ID for tracing related events"})
}

fn audit_log_event() -> ToolDefinition {
    ToolDefinition {
        name: AUDIT_LOG_EVENT,
        description: "Log a compliance event with optional CamDL blockchain anchoring. Use for audit \
                      trails, state changes, and regulatory compliance.",
        input_schema: json!({
            "type": "object",
            "properties": {
                "event_type": {
                    "type": "string",
                    "description": "Event type (e.g., order.created, payment.completed, identity.verified)"
                },
                "entity_type": {
                    "type": "string",
                    "description": "Entity type being audited (e.g., order, payment, user)"
                },
                "entity_id": {"type": "string", "description": "Unique identifier of the entity"},
                "previous_state": {
                    "type": "object",
                    "description": "State of the entity before the change (optional)"
                },
                "new_state": {"type": "object", "description": "State of the entity after the change"},
                "anchor_to_camdl": {
                    "type": "boolean",
                    "description": "Whether to anchor this event to CamDL blockchain (default: false)"
                },
                "correlation_id": correlation_id_property(),
                "metadata": {"type": "object", "description": "Additional metadata to store with the event"}
            },
            "required": ["event_type", "entity_type", "entity_id"]
        }),
    }
}

fn khqr_generate() -> ToolDefinition {
    ToolDefinition {
        name: KHQR_GENERATE,
        description: "Generate a Cambodia KHQR payment QR code via Bakong. Returns QR data string \
                      and MD5 hash for payment verification.",
        input_schema: json!({
            "type": "object",
            "properties": {
                "amount": {
                    "type": "number",
                    "description": "Payment amount. Use 0 for static QR (customer enters amount)"
                },
                "currency": {
                    "type": "string",
                    "enum": ["USD", "KHR"],
                    "description": "Currency code (USD or KHR). Default: USD"
                },
                "merchant_name": {
                    "type": "string",
                    "description": "Merchant or recipient name (max 25 characters)"
                },
                "merchant_city": {"type": "string", "description": "Merchant city. Default: Phnom Penh"},
                "account_id": {
                    "type": "string",
                    "description": "Bakong account ID in format username@bankcode (e.g., merchant@aba)"
                },
                "merchant_id": {
                    "type": "string",
                    "description": "Merchant ID from acquiring bank (required for merchant QR)"
                },
                "qr_type": {
                    "type": "string",
                    "enum": ["individual", "merchant"],
                    "description": "QR type: individual (personal) or merchant (business). Default: merchant"
                },
                "bill_number": {"type": "string", "description": "Bill/invoice reference number (optional)"},
                "store_label": {"type": "string", "description": "Store or branch label (optional)"},
                "terminal_label": {"type": "string", "description": "Terminal/POS label (optional)"},
                "expiry_minutes": {"type": "number", "description": "QR expiry time in minutes. Default: 15"},
                "correlation_id": correlation_id_property()
            },
            "required": ["amount", "merchant_name", "account_id"]
        }),
    }
}

fn khqr_verify_settlement() -> ToolDefinition {
    ToolDefinition {
        name: KHQR_VERIFY_SETTLEMENT,
        description: "Verify KHQR payment settlement status via Bakong. Use after generating a KHQR \
                      code to check if payment has been completed. Returns settlement confirmation \
                      with transaction details.",
        input_schema: json!({
            "type": "object",
            "properties": {
                "md5": {"type": "string", "description": "MD5 hash returned from gaap_khqr_generate"},
                "txn_ref": {
                    "type": "string",
                    "description": "Transaction reference returned from gaap_khqr_generate"
                },
                "timeout_ms": {
                    "type": "number",
                    "description": "Timeout in milliseconds for the verification request. Default: 5000"
                },
                "correlation_id": correlation_id_property()
            },
            "required": ["md5", "txn_ref"]
        }),
    }
}

fn policy_evaluate() -> ToolDefinition {
    ToolDefinition {
        name: POLICY_EVALUATE,
        description: "Evaluate CamDX policy decision based on transaction amount and identity level. \
                      Returns whether transaction is allowed, requires identity verification, or is \
                      blocked. Use before order creation to check compliance requirements.",
        input_schema: json!({
            "type": "object",
            "properties": {
                "amount": {"type": "number", "description": "Transaction amount to evaluate"},
                "currency": {
                    "type": "string",
                    "enum": ["USD", "KHR"],
                    "description": "Currency code (USD or KHR). Default: USD"
                },
                "identity_level": {
                    "type": "string",
                    "enum": ["anonymous", "basic", "verified", "high_assurance"],
                    "description": "Current identity verification level of the user. Default: anonymous"
                },
                "entity_type": {
                    "type": "string",
                    "description": "Type of transaction entity (e.g., order, payment, transfer)"
                },
                "entity_id": {
                    "type": "string",
                    "description": "Optional entity identifier for audit correlation"
                },
                "correlation_id": correlation_id_property()
            },
            "required": ["amount"]
        }),
    }
}

fn policy_publish_intent() -> ToolDefinition {
    ToolDefinition {
        name: POLICY_PUBLISH_INTENT,
        description: "Publish payment intent to CamDX X-Road for regulatory compliance. Required for \
                      AML/CFT monitoring. Call after order confirmation to register the transaction \
                      with Cambodia's interoperability platform.",
        input_schema: json!({
            "type": "object",
            "properties": {
                "order_id": {"type": "string", "description": "Unique order identifier"},
                "merchant_id": {"type": "string", "description": "Merchant identifier (e.g., MER-2025-001)"},
                "amount": {"type": "number", "description": "Transaction amount"},
                "currency": {"type": "string", "description": "Currency code: USD or KHR. Default: USD"},
                "amount_band": {
                    "type": "string",
                    "description": "Amount band from policy evaluation: A (<=$10), B ($10-50), C ($50-500), D (>$500)"
                },
                "identity_level": {
                    "type": "string",
                    "description": "Customer identity level: anonymous, basic, verified, or high_assurance"
                },
                "items": {
                    "type": "array",
                    "description": "Optional array of order items with name, quantity, and unit_price",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string"},
                            "quantity": {"type": "number"},
                            "unit_price": {"type": "number"}
                        }
                    }
                },
                "customer_id": {"type": "string", "description": "Optional customer identifier for tracking"},
                "camdigi_key_id": {
                    "type": "string",
                    "description": "Optional CamDigiKey ID if customer is verified"
                },
                "correlation_id": correlation_id_property()
            },
            "required": ["order_id", "merchant_id", "amount"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lists_five_tools_in_order() {
        assert_eq!(
            tool_names(),
            vec![AUDIT_LOG_EVENT, KHQR_GENERATE, KHQR_VERIFY_SETTLEMENT, POLICY_EVALUATE, POLICY_PUBLISH_INTENT]
        );
    }

    #[test]
    fn test_required_params_per_tool() {
        let expected: [(&str, &[&str]); 5] = [
            (AUDIT_LOG_EVENT, &["event_type", "entity_type", "entity_id"]),
            (KHQR_GENERATE, &["amount", "merchant_name", "account_id"]),
            (KHQR_VERIFY_SETTLEMENT, &["md5", "txn_ref"]),
            (POLICY_EVALUATE, &["amount"]),
            (POLICY_PUBLISH_INTENT, &["order_id", "merchant_id", "amount"]),
        ];
        for (name, required) in expected {
            assert_eq!(find_tool(name).unwrap().required_params(), required, "{name}");
        }
    }

    #[test]
    fn test_every_tool_accepts_correlation_id() {
        for tool in tools() {
            assert_eq!(tool.input_schema["type"], "object");
            assert_eq!(tool.input_schema["properties"]["correlation_id"]["type"], "string", "{}", tool.name);
        }
    }

    #[test]
    fn test_find_unknown_tool() {
        assert!(find_tool("gaap_identity_verify").is_none());
    }

    #[test]
    fn test_missing_params_treats_null_as_absent() {
        let tool = find_tool(POLICY_PUBLISH_INTENT).unwrap();
        let arguments = json!({"order_id": "o-1", "merchant_id": null});
        assert_eq!(tool.missing_params(arguments.as_object().unwrap()), vec!["merchant_id", "amount"]);
    }

    #[test]
    fn test_definition_serializes_input_schema_in_camel_case() {
        let value = serde_json::to_value(find_tool(POLICY_EVALUATE).unwrap()).unwrap();
        assert!(value.get("inputSchema").is_some());
        assert!(value.get("input_schema").is_none());
        assert_eq!(value["name"], POLICY_EVALUATE);
    }
}
