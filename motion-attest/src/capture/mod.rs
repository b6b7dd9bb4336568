//! Movement capture types
//!
//! The browser collaborator records pointer samples and posts them to the
//! service. This module defines the wire shape of that submission; nothing here
//! performs any analysis.

pub mod types;

pub use types::{MovementSubmission, Sample};
