//! Session Registry
//!
//! Holds issued attestations under a short session id for later
//! re-verification. Every operation takes the single registry lock; expired
//! entries are swept lazily on registration and evicted on lookup.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use subtle::ConstantTimeEq;
use tracing::debug;

use super::signer::Attestation;
use crate::time::clock::Clock;

/// One issued attestation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: String,
    pub signature: String,
    pub timestamp: i64,
    pub record_id: String,
    pub expires_at: i64,
}

/// Why a lookup was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupFailure {
    SessionNotFound,
    SessionExpired,
    SignatureMismatch,
}

/// Result of [`SessionRegistry::lookup`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLookup {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<LookupFailure>,
    pub record_id: Option<String>,
    pub timestamp: Option<i64>,
}

impl SessionLookup {
    fn rejected(reason: LookupFailure) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
            record_id: None,
            timestamp: None,
        }
    }
}

/// In-memory registry owned by the running service
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionRecord>>,
    ttl_ms: i64,
    id_len: usize,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(ttl: Duration, id_len: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            id_len,
            clock,
        }
    }

    /// Store `attestation` and return its session record.
    ///
    /// The session id is the first `id_len` characters of the signature.
    pub fn register(&self, attestation: &Attestation, record_id: &str) -> SessionRecord {
        let now = self.clock.now_millis();
        let session_id: String = attestation.signature.chars().take(self.id_len).collect();

        let record = SessionRecord {
            session_id: session_id.clone(),
            signature: attestation.signature.clone(),
            timestamp: attestation.timestamp,
            record_id: record_id.to_string(),
            expires_at: now.saturating_add(self.ttl_ms),
        };

        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, s| now <= s.expires_at);
        let swept = before - sessions.len();
        if swept > 0 {
            debug!(swept, remaining = sessions.len(), "Swept expired sessions");
        }
        sessions.insert(session_id, record.clone());

        record
    }

    /// Re-verify a session id / signature pair
    pub fn lookup(&self, session_id: &str, signature: &str) -> SessionLookup {
        let now = self.clock.now_millis();
        let mut sessions = self.sessions.lock();

        let Some(record) = sessions.get(session_id) else {
            return SessionLookup::rejected(LookupFailure::SessionNotFound);
        };

        if now > record.expires_at {
            sessions.remove(session_id);
            return SessionLookup::rejected(LookupFailure::SessionExpired);
        }

        let matches: bool = record
            .signature
            .as_bytes()
            .ct_eq(signature.as_bytes())
            .into();
        if !matches {
            return SessionLookup::rejected(LookupFailure::SignatureMismatch);
        }

        SessionLookup {
            valid: true,
            reason: None,
            record_id: Some(record.record_id.clone()),
            timestamp: Some(record.timestamp),
        }
    }

    /// Sessions that have not yet expired
    pub fn active_count(&self) -> usize {
        let now = self.clock.now_millis();
        self.sessions
            .lock()
            .values()
            .filter(|s| now <= s.expires_at)
            .count()
    }

    /// Stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Administrative reset; returns the number of discarded sessions
    pub fn clear(&self) -> usize {
        let mut sessions = self.sessions.lock();
        let discarded = sessions.len();
        sessions.clear();
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::clock::ManualClock;

    const TTL: Duration = Duration::from_secs(3600);

    fn attestation(signature: &str, timestamp: i64) -> Attestation {
        Attestation {
            signature: signature.to_string(),
            timestamp,
            payload: "{}".to_string(),
        }
    }

    fn registry(clock: Arc<ManualClock>) -> SessionRegistry {
        SessionRegistry::new(TTL, 16, clock)
    }

    #[test]
    fn test_session_id_is_signature_prefix() {
        let clock = Arc::new(ManualClock::new(1_000));
        let reg = registry(clock);
        let record = reg.register(&attestation("0123456789abcdef0123456789abcdef", 1_000), "rec-1");
        assert_eq!(record.session_id, "0123456789abcdef");
        assert_eq!(record.expires_at, 1_000 + 3_600_000);
    }

    #[test]
    fn test_lookup_valid() {
        let clock = Arc::new(ManualClock::new(1_000));
        let reg = registry(clock);
        let sig = "aabbccddeeff00112233445566778899";
        let record = reg.register(&attestation(sig, 1_000), "rec-1");

        let lookup = reg.lookup(&record.session_id, sig);
        assert!(lookup.valid);
        assert_eq!(lookup.reason, None);
        assert_eq!(lookup.record_id.as_deref(), Some("rec-1"));
        assert_eq!(lookup.timestamp, Some(1_000));
    }

    #[test]
    fn test_lookup_not_found() {
        let reg = registry(Arc::new(ManualClock::new(0)));
        let lookup = reg.lookup("missing", "sig");
        assert!(!lookup.valid);
        assert_eq!(lookup.reason, Some(LookupFailure::SessionNotFound));
        assert_eq!(lookup.record_id, None);
    }

    #[test]
    fn test_lookup_expired_evicts() {
        let clock = Arc::new(ManualClock::new(0));
        let reg = registry(clock.clone());
        let sig = "aabbccddeeff00112233445566778899";
        let record = reg.register(&attestation(sig, 0), "rec-1");

        // Still valid exactly at expiry
        clock.advance(TTL);
        assert!(reg.lookup(&record.session_id, sig).valid);

        clock.advance(Duration::from_millis(1));
        let lookup = reg.lookup(&record.session_id, sig);
        assert_eq!(lookup.reason, Some(LookupFailure::SessionExpired));
        assert!(reg.is_empty());

        let again = reg.lookup(&record.session_id, sig);
        assert_eq!(again.reason, Some(LookupFailure::SessionNotFound));
    }

    #[test]
    fn test_lookup_signature_mismatch() {
        let reg = registry(Arc::new(ManualClock::new(0)));
        let sig = "aabbccddeeff00112233445566778899";
        let record = reg.register(&attestation(sig, 0), "rec-1");

        let lookup = reg.lookup(&record.session_id, "aabbccddeeff0011ffffffffffffffff");
        assert!(!lookup.valid);
        assert_eq!(lookup.reason, Some(LookupFailure::SignatureMismatch));
        assert_eq!(lookup.record_id, None);

        // Different length never matches
        let short = reg.lookup(&record.session_id, &sig[..20]);
        assert_eq!(short.reason, Some(LookupFailure::SignatureMismatch));
    }

    #[test]
    fn test_register_sweeps_expired() {
        let clock = Arc::new(ManualClock::new(0));
        let reg = registry(clock.clone());
        reg.register(&attestation("11111111111111111111", 0), "a");
        reg.register(&attestation("22222222222222222222", 0), "b");
        assert_eq!(reg.len(), 2);

        clock.advance(TTL + Duration::from_secs(1));
        assert_eq!(reg.active_count(), 0);
        assert_eq!(reg.len(), 2);

        reg.register(&attestation("33333333333333333333", 0), "c");
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.active_count(), 1);
    }

    #[test]
    fn test_clear() {
        let reg = registry(Arc::new(ManualClock::new(0)));
        reg.register(&attestation("11111111111111111111", 0), "a");
        reg.register(&attestation("22222222222222222222", 0), "b");
        assert_eq!(reg.clear(), 2);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_lookup_serializes_nulls() {
        let reg = registry(Arc::new(ManualClock::new(0)));
        let json = serde_json::to_value(reg.lookup("x", "y")).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["reason"], "session_not_found");
        assert!(json["recordId"].is_null());
        assert!(json["timestamp"].is_null());
    }
}
