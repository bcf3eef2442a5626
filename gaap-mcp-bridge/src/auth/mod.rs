//! Request authentication for the GaaP API.
//!
//! Every outbound call carries an HMAC-SHA256 signature over a canonical
//! string that binds a fixed method and path, a millisecond timestamp, a
//! single-use nonce, and the SHA-256 of the exact body bytes:
//!
//! ```text
//! POST|/webhook/gaap-mcp/invoke|<timestamp>|<nonce>|<sha256(body) hex>
//! ```
//!
//! The method and path are part of the wire contract with the remote
//! verifier. They are signed verbatim even when the configured endpoint
//! lives elsewhere.
//!
//! - [`RequestSigner`] produces the `X-*` authentication headers.
//! - [`SignatureVerifier`] checks them on the receiving side, with a
//!   timestamp window and a nonce replay cache.

pub mod signer;
pub mod verifier;

#[cfg(test)]
mod tests;

pub use signer::{
    HEADER_API_KEY, HEADER_CONTENT_TYPE, HEADER_NONCE, HEADER_SIGNATURE, HEADER_TENANT_ID,
    HEADER_TIMESTAMP, RequestSigner, SIGNED_METHOD, SIGNED_PATH, SignedRequest, body_hash,
    canonical_string,
};
pub use verifier::SignatureVerifier;
