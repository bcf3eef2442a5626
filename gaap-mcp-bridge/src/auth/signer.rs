//! HMAC-SHA256 request signing.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    config::Credentials,
    error::{BridgeError, Result},
};

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// HTTP method bound into every canonical string.
pub const SIGNED_METHOD: &str = "POST";

/// Path bound into every canonical string, independent of the configured endpoint.
pub const SIGNED_PATH: &str = "/webhook/gaap-mcp/invoke";

/// `Content-Type` header name.
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
/// Tenant identifier header name.
pub const HEADER_TENANT_ID: &str = "X-Tenant-ID";
/// API key header name.
pub const HEADER_API_KEY: &str = "X-API-Key";
/// Timestamp header name (epoch milliseconds).
pub const HEADER_TIMESTAMP: &str = "X-Timestamp";
/// Nonce header name.
pub const HEADER_NONCE: &str = "X-Nonce";
/// Signature header name (lowercase hex HMAC-SHA256).
pub const HEADER_SIGNATURE: &str = "X-Signature";

/// Builds the canonical string signed for a request.
///
/// # Examples
///
/// ```
/// use gaap_mcp_bridge::auth::canonical_string;
///
/// let canonical = canonical_string("1700000000000", "nonce-1", "abc123");
/// assert_eq!(canonical, "POST|/webhook/gaap-mcp/invoke|1700000000000|nonce-1|abc123");
/// ```
#[must_use]
pub fn canonical_string(timestamp: &str, nonce: &str, body_hash: &str) -> String {
    format!("{SIGNED_METHOD}|{SIGNED_PATH}|{timestamp}|{nonce}|{body_hash}")
}

/// Lowercase hex SHA-256 of a request body.
///
/// # Examples
///
/// ```
/// use gaap_mcp_bridge::auth::body_hash;
///
/// assert_eq!(
///     body_hash(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn body_hash(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Authentication material for exactly one outbound request.
///
/// Produced by [`RequestSigner::sign`] and consumed by the HTTP call that
/// carries it. It is neither `Clone` nor stored anywhere, so a nonce cannot
/// be reused by accident.
pub struct SignedRequest<'a> {
    credentials: &'a Credentials,
    /// Epoch milliseconds, decimal.
    pub timestamp: String,
    /// UUID v4 nonce.
    pub nonce: String,
    /// Lowercase hex SHA-256 of the body.
    pub body_hash: String,
    /// Lowercase hex HMAC-SHA256 of the canonical string (64 chars).
    pub signature: String,
}

impl SignedRequest<'_> {
    /// Canonical string this signature covers.
    #[must_use]
    pub fn canonical_string(&self) -> String {
        canonical_string(&self.timestamp, &self.nonce, &self.body_hash)
    }

    /// Transport headers for this request, in a stable order.
    ///
    /// # Examples
    ///
    /// ```
    /// use gaap_mcp_bridge::{auth::RequestSigner, config::Credentials};
    ///
    /// let credentials = Credentials::new("tenant-1", "key-1", "s3cr3t");
    /// let signer = RequestSigner::new(credentials)?;
    /// let signed = signer.sign(b"{}");
    /// let names: Vec<_> = signed.headers().into_iter().map(|(name, _)| name).collect();
    /// assert_eq!(names, [
    ///     "Content-Type",
    ///     "X-Tenant-ID",
    ///     "X-API-Key",
    ///     "X-Timestamp",
    ///     "X-Nonce",
    ///     "X-Signature",
    /// ]);
    /// # Ok::<(), gaap_mcp_bridge::BridgeError>(())
    /// ```
    #[must_use]
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            (HEADER_CONTENT_TYPE, "application/json".to_owned()),
            (HEADER_TENANT_ID, self.credentials.tenant_id().to_owned()),
            (HEADER_API_KEY, self.credentials.api_key().to_owned()),
            (HEADER_TIMESTAMP, self.timestamp.clone()),
            (HEADER_NONCE, self.nonce.clone()),
            (HEADER_SIGNATURE, self.signature.clone()),
        ]
    }
}

impl fmt::Debug for SignedRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedRequest")
            .field("tenant_id", &self.credentials.tenant_id())
            .field("timestamp", &self.timestamp)
            .field("nonce", &self.nonce)
            .field("body_hash", &self.body_hash)
            .finish_non_exhaustive()
    }
}

/// Signs request bodies with the tenant's shared secret.
#[derive(Clone)]
pub struct RequestSigner {
    credentials: Credentials,
    mac: HmacSha256,
}

impl RequestSigner {
    /// Creates a signer, keying HMAC-SHA256 with the webhook secret.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if the secret cannot key the MAC.
    /// HMAC accepts keys of any length, so this only guards the API contract.
    pub fn new(credentials: Credentials) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(credentials.webhook_secret().as_bytes())
            .map_err(|e| BridgeError::Config(format!("invalid webhook secret: {e}")))?;
        Ok(Self { credentials, mac })
    }

    /// Credentials this signer attaches to requests.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Signs `body` with a fresh timestamp and nonce.
    ///
    /// `body` must be the exact bytes that will be transmitted.
    #[must_use]
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    pub fn sign(&self, body: &[u8]) -> SignedRequest<'_> {
        let timestamp = chrono::Utc::now().timestamp_millis().to_string();
        let nonce = Uuid::new_v4().to_string();
        let signed = self.sign_with(body, &timestamp, &nonce);
        debug!(nonce = %signed.nonce, timestamp = %signed.timestamp, "request signed");
        signed
    }

    /// Signs `body` with a caller-supplied timestamp and nonce.
    ///
    /// Deterministic: identical inputs always give the same signature.
    ///
    /// # Examples
    ///
    /// ```
    /// use gaap_mcp_bridge::{auth::RequestSigner, config::Credentials};
    ///
    /// let signer = RequestSigner::new(Credentials::new("t1", "k1", "s3cr3t"))?;
    /// let a = signer.sign_with(b"{}", "1700000000000", "nonce-1");
    /// let b = signer.sign_with(b"{}", "1700000000000", "nonce-1");
    /// assert_eq!(a.signature, b.signature);
    /// assert_eq!(a.signature.len(), 64);
    /// # Ok::<(), gaap_mcp_bridge::BridgeError>(())
    /// ```
    #[must_use]
    pub fn sign_with(&self, body: &[u8], timestamp: &str, nonce: &str) -> SignedRequest<'_> {
        let body_hash = body_hash(body);
        let canonical = canonical_string(timestamp, nonce, &body_hash);

        let mut mac = self.mac.clone();
        mac.update(canonical.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        SignedRequest {
            credentials: &self.credentials,
            timestamp: timestamp.to_owned(),
            nonce: nonce.to_owned(),
            body_hash,
            signature,
        }
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner").field("credentials", &self.credentials).finish_non_exhaustive()
    }
}
