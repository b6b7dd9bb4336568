//! # Motion Attest
//!
//! Server-side classifier that decides whether a stream of pointer-movement
//! samples came from a human hand or from programmatic automation, and turns a
//! passing decision into a signed, time-bounded attestation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use motion_attest::{MovementClassifier, Sample};
//! use motion_attest::analysis::Thresholds;
//!
//! let classifier = MovementClassifier::new(Thresholds::default());
//!
//! let points: Vec<Sample> = (0..40)
//!     .map(|i| Sample::new(i as f64 * 3.0, 100.0, i as f64 * 16.0))
//!     .collect();
//!
//! let result = classifier.analyze(&points, 5);
//! println!("verified={} passed={}/7", result.verified, result.checks_passed);
//! ```
//!
//! ## Architecture
//!
//! - [`capture`]: Wire-level sample types
//! - [`analysis`]: Feature extraction, signal evaluation and the verdict
//! - [`attestation`]: HMAC attestations and the session registry
//! - [`time`]: Injectable wall clock
//! - [`server`]: HTTP surface (axum)
//! - [`app`]: CLI and configuration management
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Samples   │───▶│   Feature   │───▶│   Signal    │
//! │ (x, y, t)   │    │  Extractor  │    │  Evaluator  │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!                                              │
//!                                              ▼
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Session   │◀───│ Attestation │◀───│  Decision   │
//! │  Registry   │    │   Issuer    │    │ Aggregator  │
//! └─────────────┘    └─────────────┘    └─────────────┘
//! ```

pub mod time;
pub mod capture;
pub mod analysis;
pub mod attestation;
pub mod server;
pub mod app;

// Re-export commonly used types
pub use analysis::classifier::{AnalysisResult, MovementClassifier};
pub use analysis::signals::SignalVector;
pub use attestation::session_registry::{SessionLookup, SessionRegistry};
pub use attestation::signer::{Attestation, Attestor, SigningKey};
pub use capture::types::{MovementSubmission, Sample};
pub use time::clock::{Clock, ManualClock, SystemClock};

/// Result type alias for the attestation service
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the attestation service
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Attestation error: {0}")]
    Attestation(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("TOML error: {0}")]
    Toml(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
