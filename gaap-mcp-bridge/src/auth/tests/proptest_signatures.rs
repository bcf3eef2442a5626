use std::time::Duration;

use hmac::Mac;
use proptest::prelude::*;

use crate::{
    auth::{RequestSigner, SignatureVerifier, signer::HmacSha256},
    config::Credentials,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_sign_verify_roundtrip(
        secret in "[ -~]{1,64}",
        body in any::<Vec<u8>>(),
    ) {
        let signer = RequestSigner::new(Credentials::new("tenant", "key", secret.clone())).unwrap();
        let verifier = SignatureVerifier::new(&secret, 100, Duration::from_secs(300)).unwrap();

        let signed = signer.sign(&body);
        let result = verifier.verify(&body, &signed.timestamp, &signed.nonce, &signed.signature);

        prop_assert!(result.is_ok(), "verification failed: {:?}", result.err());
    }

    #[test]
    fn test_canonical_string_has_five_fields(
        body in any::<Vec<u8>>(),
        timestamp in 0i64..=i64::MAX,
        nonce in "[0-9a-f-]{36}",
    ) {
        let signer = RequestSigner::new(Credentials::new("tenant", "key", "s3cr3t")).unwrap();
        let signed = signer.sign_with(&body, &timestamp.to_string(), &nonce);
        let canonical = signed.canonical_string();
        let fields: Vec<&str> = canonical.split('|').collect();

        prop_assert_eq!(fields.len(), 5);
        prop_assert_eq!(fields[0], "POST");
        prop_assert_eq!(fields[1], "/webhook/gaap-mcp/invoke");
        prop_assert_eq!(fields[2], timestamp.to_string());
        prop_assert_eq!(fields[3], nonce.as_str());
        prop_assert_eq!(fields[4], signed.body_hash.as_str());
    }

    #[test]
    fn test_signature_matches_independent_hmac(
        secret in "[ -~]{1,64}",
        body in any::<Vec<u8>>(),
    ) {
        let signer = RequestSigner::new(Credentials::new("tenant", "key", secret.clone())).unwrap();
        let first = signer.sign(&body);
        let second = signer.sign(&body);

        prop_assert_ne!(&first.nonce, &second.nonce);
        prop_assert_eq!(first.signature.len(), 64);
        prop_assert_eq!(second.signature.len(), 64);

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(first.canonical_string().as_bytes());
        prop_assert_eq!(hex::encode(mac.finalize().into_bytes()), first.signature.clone());
    }
}
