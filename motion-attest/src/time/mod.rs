//! Wall-clock module
//!
//! Every "now" read in the service goes through a [`Clock`] so that session
//! expiry and attestation timestamps can be driven deterministically in tests.

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};
