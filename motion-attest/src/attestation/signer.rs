//! Attestation Issuer
//!
//! A verified movement is bound to its content by hashing the canonical JSON
//! form of the sample sequence, then signing a small payload that carries the
//! hash with HMAC-SHA256.

use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::capture::types::Sample;
use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Length of a generated ephemeral key
const EPHEMERAL_KEY_LEN: usize = 32;

/// Secret used to sign attestations; never printed
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Read the secret from environment variable `var`; `None` if unset or empty
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .filter(|v| !v.is_empty())
            .map(|v| Self(v.into_bytes()))
    }

    /// Random per-process key
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; EPHEMERAL_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Claims covered by the signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationPayload {
    pub movement_hash: String,
    pub record_id: String,
    pub timestamp: i64,
    pub checks_passed: u8,
}

/// Signed attestation; `payload` is the exact string that was signed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub signature: String,
    pub timestamp: i64,
    pub payload: String,
}

impl Attestation {
    pub fn claims(&self) -> Result<AttestationPayload> {
        Ok(serde_json::from_str(&self.payload)?)
    }
}

/// Hex SHA-256 over the canonical JSON array of `{x, y, t}` objects.
///
/// Field order follows [`Sample`]; element order is capture order.
pub fn movement_hash(points: &[Sample]) -> Result<String> {
    let canonical = serde_json::to_vec(points)?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

/// Issues and verifies attestations with one key
#[derive(Debug, Clone)]
pub struct Attestor {
    key: SigningKey,
}

impl Attestor {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Sign the claims for a verified movement
    pub fn issue(
        &self,
        points: &[Sample],
        record_id: &str,
        checks_passed: u8,
        issued_at_ms: i64,
    ) -> Result<Attestation> {
        let claims = AttestationPayload {
            movement_hash: movement_hash(points)?,
            record_id: record_id.to_string(),
            timestamp: issued_at_ms,
            checks_passed,
        };
        let payload = serde_json::to_string(&claims)?;
        let signature = self.sign(&payload)?;

        Ok(Attestation {
            signature,
            timestamp: issued_at_ms,
            payload,
        })
    }

    /// Hex HMAC-SHA256 of `payload`
    pub fn sign(&self, payload: &str) -> Result<String> {
        Ok(hex::encode(self.mac(payload)?))
    }

    /// Constant-time check of `signature` against `payload`.
    ///
    /// Only the exact lowercase hex encoding is accepted. Any other string,
    /// including a case variant of a valid signature, yields `false`.
    pub fn verify(&self, signature: &str, payload: &str) -> bool {
        match self.mac(payload) {
            Ok(expected) => hex::encode(expected)
                .as_bytes()
                .ct_eq(signature.as_bytes())
                .into(),
            Err(_) => false,
        }
    }

    fn mac(&self, payload: &str) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(self.key.as_bytes())
            .map_err(|e| Error::Attestation(format!("invalid signing key: {e}")))?;
        mac.update(payload.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attestor() -> Attestor {
        Attestor::new(SigningKey::from_bytes(b"unit-test-secret".to_vec()))
    }

    fn points() -> Vec<Sample> {
        vec![
            Sample::new(1.0, 2.0, 0.0),
            Sample::new(3.5, 4.0, 16.0),
            Sample::new(7.0, 9.0, 33.0),
        ]
    }

    #[test]
    fn test_movement_hash_is_hex_sha256() {
        let hash = movement_hash(&points()).unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_canonical_serialization_field_order() {
        let json = serde_json::to_string(&[Sample::new(1.0, 2.0, 3.0)]).unwrap();
        assert_eq!(json, r#"[{"x":1.0,"y":2.0,"t":3.0}]"#);
    }

    #[test]
    fn test_issue_payload_contents() {
        let att = attestor().issue(&points(), "rec-1", 7, 1_700_000_000_000).unwrap();
        let claims = att.claims().unwrap();
        assert_eq!(claims.record_id, "rec-1");
        assert_eq!(claims.checks_passed, 7);
        assert_eq!(claims.timestamp, att.timestamp);
        assert_eq!(claims.movement_hash, movement_hash(&points()).unwrap());
        assert!(att.payload.starts_with(r#"{"movementHash":"#));
    }

    #[test]
    fn test_round_trip() {
        let a = attestor();
        let att = a.issue(&points(), "rec-1", 7, 42).unwrap();
        assert!(a.verify(&att.signature, &att.payload));
    }

    #[test]
    fn test_uppercase_signature_fails() {
        let a = attestor();
        let att = a.issue(&points(), "rec-1", 7, 42).unwrap();
        assert!(!a.verify(&att.signature.to_ascii_uppercase(), &att.payload));
        assert!(!a.verify(&format!("{} ", att.signature), &att.payload));
    }

    #[test]
    fn test_wrong_key_fails() {
        let att = attestor().issue(&points(), "rec-1", 7, 42).unwrap();
        let other = Attestor::new(SigningKey::from_bytes(b"other".to_vec()));
        assert!(!other.verify(&att.signature, &att.payload));
    }

    #[test]
    fn test_malformed_signatures_fail_closed() {
        let a = attestor();
        let att = a.issue(&points(), "rec-1", 7, 42).unwrap();
        assert!(!a.verify("not-hex", &att.payload));
        assert!(!a.verify(&att.signature[..16], &att.payload));
        assert!(!a.verify("", &att.payload));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let key = SigningKey::from_bytes(b"super-secret".to_vec());
        let rendered = format!("{:?} {:?}", key, Attestor::new(key.clone()));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = Attestor::new(SigningKey::generate());
        let b = Attestor::new(SigningKey::generate());
        assert_ne!(a.sign("payload").unwrap(), b.sign("payload").unwrap());
    }
}
