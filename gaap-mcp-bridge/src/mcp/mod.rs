//! Model Context Protocol (MCP) integration.
//!
//! This module exposes the GaaP tools to AI agents. It owns the tool catalog,
//! argument validation and the rendering of responses as MCP text content;
//! the JSON-RPC framing itself lives in the server binary.
//!
//! # Available Tools
//!
//! - `gaap_audit_log_event`: log a compliance event, optionally anchored to CamDL
//! - `gaap_khqr_generate`: generate a KHQR payment code via Bakong
//! - `gaap_khqr_verify_settlement`: check whether a KHQR payment settled
//! - `gaap_policy_evaluate`: evaluate the CamDX policy for an amount
//! - `gaap_policy_publish_intent`: publish a payment intent to CamDX X-Road
//!
//! # Architecture
//!
//! ```text
//! AI Agent (Claude)
//!     │
//!     │ MCP Protocol (JSON-RPC 2.0 over stdio)
//!     ▼
//! ToolDispatcher (this module)
//!     │
//!     │ catalog lookup, required-argument check
//!     ▼
//! GaapClient (client module)
//!     │
//!     │ HMAC-SHA256 signed POST
//!     ▼
//! GaaP API (HTTPS)
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use gaap_mcp_bridge::{
//!     client::GaapClient,
//!     config::BridgeConfig,
//!     mcp::ToolDispatcher,
//! };
//! use serde_json::json;
//!
//! # async fn example() -> gaap_mcp_bridge::error::Result<()> {
//! let config = BridgeConfig::from_env()?;
//! let dispatcher =
//!     ToolDispatcher::new(GaapClient::new(&config)?, config.credentials.tenant_id());
//!
//! let result = dispatcher
//!     .call_tool("gaap_khqr_verify_settlement", Some(json!({"md5": "abc", "txn_ref": "T-1"})))
//!     .await;
//! println!("{}", result.joined_text());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod dispatch;
pub mod format;

pub use catalog::{ToolDefinition, find_tool, tool_names, tools};
pub use dispatch::ToolDispatcher;
pub use format::{CallToolResult, TextContent, render_response};
