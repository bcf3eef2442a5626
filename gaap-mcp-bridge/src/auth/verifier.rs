//! Verification of signed GaaP requests.
//!
//! This is the receiving half of the signing contract. It recomputes the
//! canonical string from the transmitted headers and body, checks the HMAC in
//! constant time, bounds the timestamp skew, and rejects replayed nonces.

use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex},
    time::Duration,
};

use hmac::Mac;
use lru::LruCache;
use tracing::{debug, instrument, warn};

use crate::{
    auth::signer::{
        HEADER_NONCE, HEADER_SIGNATURE, HEADER_TIMESTAMP, HmacSha256, body_hash, canonical_string,
    },
    error::{BridgeError, Result},
};

const DEFAULT_NONCE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(10_000) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Verifies `X-Timestamp` / `X-Nonce` / `X-Signature` on incoming requests.
///
/// Cloning shares the nonce cache.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use gaap_mcp_bridge::{
///     auth::{RequestSigner, SignatureVerifier},
///     config::Credentials,
/// };
///
/// let signer = RequestSigner::new(Credentials::new("t1", "k1", "s3cr3t"))?;
/// let verifier = SignatureVerifier::new("s3cr3t", 1_000, Duration::from_secs(300))?;
///
/// let body = br#"{"tool":"gaap_policy_evaluate"}"#;
/// let signed = signer.sign(body);
/// verifier.verify(body, &signed.timestamp, &signed.nonce, &signed.signature)?;
///
/// // The same nonce is rejected the second time.
/// assert!(verifier.verify(body, &signed.timestamp, &signed.nonce, &signed.signature).is_err());
/// # Ok::<(), gaap_mcp_bridge::BridgeError>(())
/// ```
#[derive(Clone)]
pub struct SignatureVerifier {
    mac: HmacSha256,
    max_skew_ms: i64,
    nonce_cache: Arc<Mutex<LruCache<String, i64>>>,
}

impl SignatureVerifier {
    /// Creates a verifier for `secret`.
    ///
    /// `nonce_capacity` bounds the replay cache (0 selects 10,000);
    /// `max_skew` bounds the distance between the request timestamp and now.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if the secret cannot key the MAC.
    pub fn new(secret: &str, nonce_capacity: usize, max_skew: Duration) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| BridgeError::Config(format!("invalid webhook secret: {e}")))?;
        let capacity = NonZeroUsize::new(nonce_capacity).unwrap_or(DEFAULT_NONCE_CAPACITY);
        let max_skew_ms = i64::try_from(max_skew.as_millis()).unwrap_or(i64::MAX);

        Ok(Self { mac, max_skew_ms, nonce_cache: Arc::new(Mutex::new(LruCache::new(capacity))) })
    }

    /// Verifies a request from its body and header values.
    ///
    /// The nonce is recorded only once the signature has verified, so forged
    /// requests cannot evict or poison legitimate nonces.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::Signature`]: malformed timestamp or signature, or MAC mismatch
    /// - [`BridgeError::StaleTimestamp`]: timestamp outside the skew window
    /// - [`BridgeError::ReplayDetected`]: nonce already seen
    #[instrument(skip(self, body, signature), fields(body_len = body.len()))]
    pub fn verify(&self, body: &[u8], timestamp: &str, nonce: &str, signature: &str) -> Result<()> {
        let timestamp_ms = timestamp
            .parse::<i64>()
            .map_err(|_| BridgeError::Signature(format!("invalid timestamp: {timestamp}")))?;

        let skew_ms = chrono::Utc::now().timestamp_millis().saturating_sub(timestamp_ms).saturating_abs();
        if skew_ms > self.max_skew_ms {
            warn!(timestamp_ms, skew_ms, "request timestamp outside window");
            return Err(BridgeError::StaleTimestamp {
                timestamp_ms,
                skew_ms,
                max_skew_ms: self.max_skew_ms,
            });
        }

        if nonce.is_empty() {
            return Err(BridgeError::Signature("empty nonce".to_owned()));
        }

        let signature_bytes = hex::decode(signature)
            .map_err(|e| BridgeError::Signature(format!("signature is not hex: {e}")))?;

        let mut mac = self.mac.clone();
        mac.update(canonical_string(timestamp, nonce, &body_hash(body)).as_bytes());
        mac.verify_slice(&signature_bytes).map_err(|_| {
            warn!(nonce, "signature mismatch");
            BridgeError::Signature("signature mismatch".to_owned())
        })?;

        let mut cache = self
            .nonce_cache
            .lock()
            .map_err(|_| BridgeError::Signature("nonce cache lock poisoned".to_owned()))?;
        if cache.contains(nonce) {
            warn!(nonce, "replayed nonce");
            return Err(BridgeError::ReplayDetected(nonce.to_owned()));
        }
        cache.put(nonce.to_owned(), timestamp_ms);

        debug!(nonce, "signature verified");
        Ok(())
    }

    /// Verifies a request given its header pairs (names matched case-insensitively).
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Signature`] if a required header is missing, or
    /// any error from [`verify`](Self::verify).
    pub fn verify_headers<'h, I>(&self, body: &[u8], headers: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'h str, &'h str)>,
    {
        let mut timestamp = None;
        let mut nonce = None;
        let mut signature = None;

        for (name, value) in headers {
            if name.eq_ignore_ascii_case(HEADER_TIMESTAMP) {
                timestamp = Some(value);
            } else if name.eq_ignore_ascii_case(HEADER_NONCE) {
                nonce = Some(value);
            } else if name.eq_ignore_ascii_case(HEADER_SIGNATURE) {
                signature = Some(value);
            }
        }

        let missing = |name: &str| BridgeError::Signature(format!("missing {name} header"));
        self.verify(
            body,
            timestamp.ok_or_else(|| missing(HEADER_TIMESTAMP))?,
            nonce.ok_or_else(|| missing(HEADER_NONCE))?,
            signature.ok_or_else(|| missing(HEADER_SIGNATURE))?,
        )
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("max_skew_ms", &self.max_skew_ms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::RequestSigner, config::Credentials};

    fn pair() -> (RequestSigner, SignatureVerifier) {
        let signer = RequestSigner::new(Credentials::new("t1", "k1", "s3cr3t")).unwrap();
        let verifier = SignatureVerifier::new("s3cr3t", 100, Duration::from_secs(300)).unwrap();
        (signer, verifier)
    }

    #[test]
    fn test_verify_valid_signature() {
        let (signer, verifier) = pair();
        let signed = signer.sign(b"payload");
        assert!(verifier.verify(b"payload", &signed.timestamp, &signed.nonce, &signed.signature).is_ok());
    }

    #[test]
    fn test_replay_protection() {
        let (signer, verifier) = pair();
        let signed = signer.sign(b"payload");
        verifier.verify(b"payload", &signed.timestamp, &signed.nonce, &signed.signature).unwrap();

        let result = verifier.verify(b"payload", &signed.timestamp, &signed.nonce, &signed.signature);
        assert!(matches!(result, Err(BridgeError::ReplayDetected(_))));
    }

    #[test]
    fn test_tampered_body_rejected() {
        let (signer, verifier) = pair();
        let signed = signer.sign(b"payload");
        let result = verifier.verify(b"payl0ad", &signed.timestamp, &signed.nonce, &signed.signature);
        assert!(matches!(result, Err(BridgeError::Signature(_))));
    }

    #[test]
    fn test_forged_request_does_not_burn_nonce() {
        let (signer, verifier) = pair();
        let signed = signer.sign(b"payload");
        let forged = "0".repeat(64);
        assert!(verifier.verify(b"payload", &signed.timestamp, &signed.nonce, &forged).is_err());
        assert!(verifier.verify(b"payload", &signed.timestamp, &signed.nonce, &signed.signature).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (signer, _) = pair();
        let verifier = SignatureVerifier::new("other", 100, Duration::from_secs(300)).unwrap();
        let signed = signer.sign(b"payload");
        assert!(verifier.verify(b"payload", &signed.timestamp, &signed.nonce, &signed.signature).is_err());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let (signer, verifier) = pair();
        let signed = signer.sign_with(b"payload", "1000", "nonce-old");
        let result = verifier.verify(b"payload", &signed.timestamp, &signed.nonce, &signed.signature);
        assert!(matches!(result, Err(BridgeError::StaleTimestamp { timestamp_ms: 1000, .. })));
    }

    #[test]
    fn test_non_numeric_timestamp_rejected() {
        let (_, verifier) = pair();
        let result = verifier.verify(b"payload", "yesterday", "n", &"0".repeat(64));
        assert!(matches!(result, Err(BridgeError::Signature(_))));
    }

    #[test]
    fn test_verify_headers_case_insensitive() {
        let (signer, verifier) = pair();
        let signed = signer.sign(b"{}");
        let headers: Vec<(String, String)> = signed
            .headers()
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();

        let result =
            verifier.verify_headers(b"{}", headers.iter().map(|(n, v)| (n.as_str(), v.as_str())));
        assert!(result.is_ok());
    }

    #[test]
    fn test_verify_headers_missing_signature() {
        let (signer, verifier) = pair();
        let signed = signer.sign(b"{}");
        let headers = [(HEADER_TIMESTAMP, signed.timestamp.as_str()), (HEADER_NONCE, signed.nonce.as_str())];
        let err = verifier.verify_headers(b"{}", headers).unwrap_err();
        assert!(err.to_string().contains(HEADER_SIGNATURE));
    }
}
