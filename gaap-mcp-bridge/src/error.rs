//! Error types for the GaaP MCP bridge.
//!
//! [`BridgeError`] is reserved for hard faults: conditions the embedding
//! process must treat as fatal to a single invocation (or to startup). Expected
//! remote failures never show up here. Network failures and non-2xx statuses
//! are folded into a [`ToolResponse`](crate::models::ToolResponse) by the
//! [`GaapClient`](crate::client::GaapClient) instead.
//!
//! # Error Categories
//!
//! - **Configuration** ([`BridgeError::Config`], [`BridgeError::HttpClient`]):
//!   startup failures, fatal for the process
//! - **Per-call faults** ([`BridgeError::Serialization`],
//!   [`BridgeError::MalformedResponse`])
//! - **Verification** ([`BridgeError::Signature`], [`BridgeError::ReplayDetected`],
//!   [`BridgeError::StaleTimestamp`]): raised by
//!   [`SignatureVerifier`](crate::auth::SignatureVerifier)
//!
//! # Examples
//!
//! ```
//! use gaap_mcp_bridge::error::{BridgeError, Result};
//!
//! fn require(name: &str, value: Option<&str>) -> Result<String> {
//!     value
//!         .filter(|v| !v.is_empty())
//!         .map(str::to_owned)
//!         .ok_or_else(|| BridgeError::Config(format!("missing required environment variable: {name}")))
//! }
//!
//! assert!(require("GAAP_API_KEY", None).is_err());
//! ```

use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Hard faults raised by the bridge.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration is missing or invalid.
    ///
    /// Raised while loading credentials, parsing the endpoint URL, or
    /// validating HTTP timeouts.
    ///
    /// # Recovery
    ///
    /// Set `GAAP_TENANT_ID`, `GAAP_API_KEY` and `GAAP_WEBHOOK_SECRET` to
    /// non-empty values and make sure `GAAP_MCP_URL`, if set, is an
    /// `http(s)` URL.
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP client could not be built.
    #[error("HTTP client initialization failed: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The tool request could not be serialized to JSON.
    #[error("request serialization failed: {0}")]
    Serialization(String),

    /// The remote side answered 2xx with a body that does not parse as a tool
    /// response.
    #[error("malformed response from GaaP API: {0}")]
    MalformedResponse(String),

    /// Signature headers were missing, malformed, or did not verify.
    #[error("signature verification failed: {0}")]
    Signature(String),

    /// The nonce was already seen inside the replay window.
    #[error("replayed request nonce: {0}")]
    ReplayDetected(String),

    /// The request timestamp is outside the accepted clock-skew window.
    #[error("stale request timestamp {timestamp_ms} (skew {skew_ms}ms exceeds {max_skew_ms}ms)")]
    StaleTimestamp {
        /// Timestamp carried by the request, epoch milliseconds.
        timestamp_ms: i64,
        /// Observed absolute skew in milliseconds.
        skew_ms: i64,
        /// Maximum tolerated skew in milliseconds.
        max_skew_ms: i64,
    },
}
