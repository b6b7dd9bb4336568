//! Movement classification pipeline
//!
//! samples → [`FeatureExtractor`] → [`SignalEvaluator`] → [`Decision`]

use serde::Serialize;
use tracing::debug;

use super::decision::{Decision, FailureReason};
use super::feature_extraction::FeatureExtractor;
use super::signals::{span, SignalEvaluator, SignalMetrics, SignalVector};
use super::thresholds::Thresholds;
use crate::capture::types::Sample;

/// Immutable outcome of one classification
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub verified: bool,
    pub checks: SignalVector,
    pub checks_passed: u8,
    pub ai_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    /// Span of the sample sequence (ms)
    pub duration: f64,
    pub point_count: usize,
    pub metrics: SignalMetrics,
}

impl AnalysisResult {
    fn insufficient(samples: &[Sample]) -> Self {
        Self {
            verified: false,
            checks: SignalVector::default(),
            checks_passed: 0,
            ai_detected: false,
            reason: Some(FailureReason::InsufficientData),
            duration: span(samples),
            point_count: samples.len(),
            metrics: SignalMetrics::default(),
        }
    }
}

/// Authoritative human/automation classifier
#[derive(Debug, Clone)]
pub struct MovementClassifier {
    thresholds: Thresholds,
    extractor: FeatureExtractor,
}

impl MovementClassifier {
    pub fn new(thresholds: Thresholds) -> Self {
        let extractor = FeatureExtractor::new(thresholds.curves.min_segment_px);
        Self {
            thresholds,
            extractor,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Classify `samples` given the caller-counted `target_hits`
    pub fn analyze(&self, samples: &[Sample], target_hits: u32) -> AnalysisResult {
        if samples.len() < self.thresholds.min_points {
            debug!(
                points = samples.len(),
                min_points = self.thresholds.min_points,
                "Insufficient samples, skipping analysis"
            );
            return AnalysisResult::insufficient(samples);
        }

        let series = self.extractor.extract(samples);
        let evaluation = SignalEvaluator::new(&self.thresholds).evaluate(samples, &series, target_hits);
        let decision = Decision::from_signals(&evaluation.checks);

        debug!(
            steps = series.steps.len(),
            smooth_ratio = evaluation.metrics.curves.smooth_ratio,
            straight_fraction = evaluation.metrics.straightness.straight_fraction,
            bezier_signals = evaluation.metrics.smoothness.triggered,
            gap_cv = evaluation.metrics.regularity.gap_cv,
            "Signals evaluated"
        );

        AnalysisResult {
            verified: decision.verified,
            checks: evaluation.checks,
            checks_passed: decision.checks_passed,
            ai_detected: decision.ai_detected,
            reason: decision.reason(),
            duration: span(samples),
            point_count: samples.len(),
            metrics: evaluation.metrics,
        }
    }
}

impl Default for MovementClassifier {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}
