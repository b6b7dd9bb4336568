//! Attestation module
//!
//! HMAC-signed attestations and the session registry that serves
//! re-verification.

pub mod session_registry;
pub mod signer;

pub use session_registry::{LookupFailure, SessionLookup, SessionRecord, SessionRegistry};
pub use signer::{movement_hash, Attestation, AttestationPayload, Attestor, SigningKey};
