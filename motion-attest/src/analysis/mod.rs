//! Analysis module
//!
//! Feature extraction, signal evaluation and the verification verdict.

pub mod classifier;
pub mod decision;
pub mod feature_extraction;
pub mod primary_checks;
pub mod signals;
pub mod smoothness;
pub mod stats;
pub mod straightness;
pub mod thresholds;

pub use classifier::{AnalysisResult, MovementClassifier};
pub use decision::{Decision, FailureReason};
pub use feature_extraction::{DerivedSeries, FeatureExtractor};
pub use signals::{SignalEvaluator, SignalMetrics, SignalVector};
pub use smoothness::{SmoothnessReport, SmoothnessSignalKind};
pub use straightness::StraightnessReport;
pub use thresholds::Thresholds;
