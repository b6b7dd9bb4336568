//! Integration tests for attestation issuance and session re-verification

use std::sync::Arc;
use std::time::Duration;

use motion_attest::attestation::{movement_hash, LookupFailure};
use motion_attest::capture::types::MovementSubmission;
use motion_attest::{Attestor, Clock, ManualClock, MovementClassifier, Sample, SessionRegistry, SigningKey};

const HUMAN_PATH: &str = include_str!("fixtures/human_path.json");
const TTL: Duration = Duration::from_secs(3600);
const START_MS: i64 = 1_700_000_000_000;

fn attestor() -> Attestor {
    Attestor::new(SigningKey::from_bytes(b"integration-test-secret".to_vec()))
}

fn points() -> Vec<Sample> {
    serde_json::from_str::<MovementSubmission>(HUMAN_PATH)
        .expect("fixture should parse")
        .points
}

#[test]
fn test_hash_is_deterministic() {
    let pts = points();
    assert_eq!(movement_hash(&pts).unwrap(), movement_hash(&pts.clone()).unwrap());
}

#[test]
fn test_hash_is_order_sensitive() {
    let pts = points();
    let mut swapped = pts.clone();
    swapped.swap(3, 4);
    assert_ne!(movement_hash(&pts).unwrap(), movement_hash(&swapped).unwrap());
}

#[test]
fn test_hash_covers_every_coordinate() {
    let pts = points();
    let mut nudged = pts.clone();
    nudged[0].t += 1.0;
    assert_ne!(movement_hash(&pts).unwrap(), movement_hash(&nudged).unwrap());
}

#[test]
fn test_sign_verify_round_trip() {
    let a = attestor();
    let att = a.issue(&points(), "rec-human-0001", 7, START_MS).unwrap();
    assert!(a.verify(&att.signature, &att.payload));
    assert_eq!(att.timestamp, START_MS);
    assert_eq!(att.signature.len(), 64);
}

#[test]
fn test_flipping_any_payload_byte_fails() {
    let a = attestor();
    let att = a.issue(&points(), "rec-1", 7, START_MS).unwrap();

    let bytes = att.payload.as_bytes();
    for i in 0..bytes.len() {
        let mut tampered = bytes.to_vec();
        tampered[i] ^= 0x01;
        let tampered = String::from_utf8_lossy(&tampered).into_owned();
        assert!(!a.verify(&att.signature, &tampered), "payload byte {} accepted", i);
    }
}

#[test]
fn test_flipping_any_signature_char_fails() {
    let a = attestor();
    let att = a.issue(&points(), "rec-1", 7, START_MS).unwrap();

    for i in 0..att.signature.len() {
        let mut chars: Vec<char> = att.signature.chars().collect();
        chars[i] = if chars[i] == '0' { '1' } else { '0' };
        let tampered: String = chars.into_iter().collect();
        assert!(!a.verify(&tampered, &att.payload), "signature char {} accepted", i);
    }
}

#[test]
fn test_flipping_any_signature_byte_fails() {
    let a = attestor();
    let att = a.issue(&points(), "rec-1", 7, START_MS).unwrap();

    let bytes = att.signature.as_bytes();
    for mask in [0x01u8, 0x20] {
        for i in 0..bytes.len() {
            let mut tampered = bytes.to_vec();
            tampered[i] ^= mask;
            let tampered = String::from_utf8_lossy(&tampered).into_owned();
            assert!(
                !a.verify(&tampered, &att.payload),
                "signature byte {} with mask {:#04x} accepted",
                i,
                mask
            );
        }
    }
}

#[test]
fn test_session_lifecycle() {
    let clock = Arc::new(ManualClock::new(START_MS));
    let registry = SessionRegistry::new(TTL, 16, clock.clone());
    let a = attestor();

    let att = a.issue(&points(), "rec-human-0001", 7, clock.now_millis()).unwrap();
    let session = registry.register(&att, "rec-human-0001");
    assert_eq!(session.session_id, att.signature[..16]);
    assert_eq!(registry.active_count(), 1);

    let lookup = registry.lookup(&session.session_id, &att.signature);
    assert!(lookup.valid);
    assert_eq!(lookup.record_id.as_deref(), Some("rec-human-0001"));
    assert_eq!(lookup.timestamp, Some(START_MS));

    clock.advance(TTL + Duration::from_secs(1));
    assert_eq!(registry.active_count(), 0);
    let expired = registry.lookup(&session.session_id, &att.signature);
    assert!(!expired.valid);
    assert_eq!(expired.reason, Some(LookupFailure::SessionExpired));
}

#[test]
fn test_unknown_session() {
    let registry = SessionRegistry::new(TTL, 16, Arc::new(ManualClock::new(START_MS)));
    let lookup = registry.lookup("0000000000000000", "deadbeef");
    assert!(!lookup.valid);
    assert_eq!(lookup.reason, Some(LookupFailure::SessionNotFound));
}

#[test]
fn test_classify_then_attest() {
    let submission: MovementSubmission = serde_json::from_str(HUMAN_PATH).unwrap();
    let result = MovementClassifier::default().analyze(&submission.points, submission.target_hits);
    assert!(result.verified);

    let a = attestor();
    let att = a
        .issue(&submission.points, "rec-human-0001", result.checks_passed, START_MS)
        .unwrap();
    let claims = att.claims().unwrap();
    assert_eq!(claims.checks_passed, 7);
    assert_eq!(claims.movement_hash, movement_hash(&submission.points).unwrap());
}

#[test]
fn test_concurrent_registration() {
    let clock = Arc::new(ManualClock::new(START_MS));
    let registry = Arc::new(SessionRegistry::new(TTL, 16, clock));
    let a = Arc::new(attestor());
    let pts = Arc::new(points());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let a = Arc::clone(&a);
            let pts = Arc::clone(&pts);
            std::thread::spawn(move || {
                let record_id = format!("rec-{i}");
                let att = a.issue(&pts, &record_id, 7, START_MS + i).unwrap();
                let session = registry.register(&att, &record_id);
                (session.session_id, att.signature)
            })
        })
        .collect();

    for handle in handles {
        let (session_id, signature) = handle.join().unwrap();
        assert!(registry.lookup(&session_id, &signature).valid);
    }
    assert_eq!(registry.len(), 8);
}
