//! GaaP-MCP Bridge: Signed Tool Invocation for AI Agents
//!
//! A Rust library that bridges Anthropic's Model Context Protocol (MCP) with
//! the Cambodia Government-as-a-Platform (GaaP) API, letting AI agents like
//! Claude call compliance and payment tools over authenticated HTTP.
//!
//! # What is GaaP-MCP Bridge?
//!
//! Every tool call an agent makes is turned into exactly one HTTP POST:
//!
//! - **Request Authentication**: HMAC-SHA256 over a canonical string binding
//!   method, path, millisecond timestamp, UUID v4 nonce and body hash
//! - **Uniform Outcomes**: transport failures, HTTP errors and remote results
//!   all arrive as one [`ToolResponse`](models::ToolResponse) shape
//! - **MCP Integration**: a static tool catalog, argument validation and
//!   text rendering for `tools/list` / `tools/call`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   AI Agent      │  Claude or other MCP-compatible agent
//! │   (Claude)      │
//! └────────┬────────┘
//!          │ MCP Protocol (JSON-RPC 2.0)
//!          │
//! ┌────────▼────────────────────────────────────────┐
//! │           GaaP-MCP Bridge (this crate)          │
//! │  ┌──────────────┐      ┌──────────────────┐     │
//! │  │  MCP Tools   │──────│  HMAC Signer     │     │
//! │  │  (catalog,   │      │  (SHA-256 body   │     │
//! │  │   dispatch)  │      │   hash, nonce)   │     │
//! │  └──────────────┘      └──────────────────┘     │
//! └────────┬────────────────────────────────────────┘
//!          │ HTTPS + X-Signature headers
//!          │
//! ┌────────▼────────┐
//! │    GaaP API     │  audit, KHQR payments, CamDX policy
//! └─────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## 1. Invoke a Tool
//!
//! ```rust,no_run
//! use gaap_mcp_bridge::{
//!     BridgeConfig, GaapClient,
//!     models::{TenantContext, ToolRequest},
//! };
//! use serde_json::json;
//!
//! # async fn example() -> gaap_mcp_bridge::Result<()> {
//! let config = BridgeConfig::from_env()?;
//! let client = GaapClient::new(&config)?;
//!
//! let params = json!({"amount": 5, "merchant_name": "Shop", "account_id": "shop@aba"});
//! let request = ToolRequest::new(
//!     "gaap_khqr_generate",
//!     TenantContext { tenant_id: config.credentials.tenant_id().to_owned(), correlation_id: None },
//!     params.as_object().cloned().unwrap_or_default(),
//! );
//!
//! let response = client.invoke(&request).await?;
//! if let Some(error) = &response.error {
//!     eprintln!("{} (recoverable: {})", error.summary(), error.recoverable);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## 2. Sign a Body Directly
//!
//! ```rust
//! use gaap_mcp_bridge::{Credentials, auth::RequestSigner};
//!
//! # fn example() -> gaap_mcp_bridge::Result<()> {
//! let signer = RequestSigner::new(Credentials::new("tenant-1", "key-1", "s3cr3t"))?;
//! let signed = signer.sign(br#"{"tool":"gaap_policy_evaluate"}"#);
//!
//! for (name, value) in signed.headers() {
//!     println!("{name}: {value}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`auth`]: canonical string, HMAC signer and receiving-side verifier
//! - [`client`]: the invoker, one signed POST per call
//! - [`config`]: credentials, endpoint and HTTP settings
//! - [`models`]: wire data model
//! - [`mcp`]: tool catalog, dispatch and result rendering
//! - [`error`]: error types
//!
//! # Error Handling
//!
//! Expected failures (network, HTTP status, remote tool errors) are values,
//! not errors: they come back inside [`ToolResponse`](models::ToolResponse).
//! Only configuration problems and contract violations surface as
//! [`BridgeError`]:
//!
//! ```rust
//! use gaap_mcp_bridge::{BridgeConfig, BridgeError};
//!
//! match BridgeConfig::from_lookup(|_| None) {
//!     Err(BridgeError::Config(msg)) => assert!(msg.contains("GAAP_TENANT_ID")),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and axum"
)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;

pub use client::GaapClient;
pub use config::{BridgeConfig, Credentials};
pub use error::{BridgeError, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _ = std::marker::PhantomData::<BridgeError>;
        let _ = std::marker::PhantomData::<GaapClient>;
        let _ = std::marker::PhantomData::<BridgeConfig>;
    }
}
