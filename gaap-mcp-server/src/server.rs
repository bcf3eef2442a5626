//! MCP over stdio: newline-delimited JSON-RPC 2.0.
//!
//! Each input line holds one request or notification. Requests get exactly
//! one response line; notifications get none.

use std::io;

use gaap_mcp_bridge::mcp::{ToolDispatcher, catalog};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

/// MCP protocol revision spoken by this server.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "gaap-mcp";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[serde(default)]
    jsonrpc: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
}

/// One JSON-RPC response line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonRpcError {
    code: i64,
    message: String,
}

impl JsonRpcResponse {
    const fn ok(id: Value, result: Value) -> Self {
        Self { jsonrpc: "2.0", id, result: Some(result), error: None }
    }

    const fn error(id: Value, code: i64, message: String) -> Self {
        Self { jsonrpc: "2.0", id, result: None, error: Some(JsonRpcError { code, message }) }
    }
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// MCP server answering over a line-oriented byte stream.
#[derive(Debug)]
pub struct McpServer {
    dispatcher: ToolDispatcher,
}

impl McpServer {
    /// Creates a server routing `tools/call` through `dispatcher`.
    #[must_use]
    pub const fn new(dispatcher: ToolDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Serves requests until `reader` reaches end of input.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading input or writing a response fails.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let Some(response) = self.handle_line(&line).await else {
                continue;
            };
            let mut encoded = serde_json::to_vec(&response).map_err(io::Error::other)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            writer.flush().await?;
        }
        info!("input closed");
        Ok(())
    }

    /// Handles one input line, returning the response to write, if any.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "malformed JSON-RPC input");
                return Some(JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("parse error: {e}")));
            }
        };

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    INVALID_REQUEST,
                    format!("invalid request: {e}"),
                ));
            }
        };

        if let Some(version) = request.jsonrpc.as_deref()
            && version != "2.0"
        {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                format!("unsupported jsonrpc version: {version}"),
            ));
        }

        let Some(method) = request.method else {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "missing method".to_owned(),
            ));
        };

        let Some(id) = request.id.filter(|id| !id.is_null()) else {
            debug!(method = %method, "notification received");
            return None;
        };

        Some(self.handle_request(id, &method, request.params).await)
    }

    #[instrument(skip(self, id, params))]
    async fn handle_request(&self, id: Value, method: &str, params: Option<Value>) -> JsonRpcResponse {
        match method {
            "initialize" => JsonRpcResponse::ok(id, initialize_result()),
            "ping" => JsonRpcResponse::ok(id, json!({})),
            "tools/list" => JsonRpcResponse::ok(id, json!({ "tools": catalog::tools() })),
            "tools/call" => {
                let call: ToolCallParams = match params.map(serde_json::from_value).transpose() {
                    Ok(Some(call)) => call,
                    Ok(None) => {
                        return JsonRpcResponse::error(id, INVALID_PARAMS, "missing tools/call params".to_owned());
                    }
                    Err(e) => {
                        return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid tools/call params: {e}"));
                    }
                };
                let result = self.dispatcher.call_tool(&call.name, call.arguments).await;
                match serde_json::to_value(result) {
                    Ok(value) => JsonRpcResponse::ok(id, value),
                    Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("unencodable tool result: {e}")),
                }
            }
            other => JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("method not found: {other}")),
        }
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": { "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") }
    })
}
