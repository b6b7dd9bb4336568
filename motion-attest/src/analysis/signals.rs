//! Signal Evaluator
//!
//! Runs every check over one [`DerivedSeries`] and folds the results into the
//! seven-entry [`SignalVector`]. The scalar metrics behind each boolean are
//! kept in [`SignalMetrics`] for observability; they never feed the verdict
//! directly.

use serde::{Deserialize, Serialize};

use super::feature_extraction::DerivedSeries;
use super::primary_checks::{
    check_continuity, check_curves, check_jitter, check_speed, check_timing, ContinuityReport,
    CurveReport, JitterReport, SpeedReport, TimingReport,
};
use super::smoothness::{SmoothnessAnalyzer, SmoothnessReport};
use super::stats::coefficient_of_variation;
use super::straightness::{StraightnessAnalyzer, StraightnessReport};
use super::thresholds::Thresholds;
use crate::capture::types::Sample;

/// The seven verification checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalVector {
    pub speed: bool,
    pub curves: bool,
    pub jitter: bool,
    pub timing: bool,
    pub continuous: bool,
    pub not_robotic: bool,
    /// Supplied by the caller as a pre-counted hit total
    pub target_tracking: bool,
}

impl SignalVector {
    /// The six checks computed from the movement itself
    pub fn primary(&self) -> [bool; 6] {
        [
            self.speed,
            self.curves,
            self.jitter,
            self.timing,
            self.continuous,
            self.not_robotic,
        ]
    }

    /// Number of failed checks among the four that automation tends to trip
    pub fn automation_failures(&self) -> usize {
        [self.curves, self.continuous, self.not_robotic, self.timing]
            .iter()
            .filter(|passed| !**passed)
            .count()
    }
}

/// Inter-sample timing regularity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegularityReport {
    pub gap_cv: f64,
    pub too_regular: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetReport {
    pub hits: u32,
    pub required: u32,
    pub passed: bool,
}

/// Scalar evidence behind every check
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalMetrics {
    pub speed: SpeedReport,
    pub curves: CurveReport,
    pub jitter: JitterReport,
    pub timing: TimingReport,
    pub continuity: ContinuityReport,
    pub straightness: StraightnessReport,
    pub smoothness: SmoothnessReport,
    pub regularity: RegularityReport,
    pub target: TargetReport,
}

/// Output of one evaluation pass
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub checks: SignalVector,
    pub metrics: SignalMetrics,
}

/// Signal evaluation engine
#[derive(Debug, Clone)]
pub struct SignalEvaluator<'a> {
    thresholds: &'a Thresholds,
}

impl<'a> SignalEvaluator<'a> {
    pub fn new(thresholds: &'a Thresholds) -> Self {
        Self { thresholds }
    }

    /// Evaluate all checks over `samples` and their derived `series`
    pub fn evaluate(&self, samples: &[Sample], series: &DerivedSeries, target_hits: u32) -> Evaluation {
        let t = self.thresholds;
        let point_count = samples.len();
        let span_ms = span(samples);

        let speed = check_speed(series, &t.speed);
        let curves = check_curves(series, &t.curves);
        let jitter = check_jitter(series, point_count, &t.jitter);
        let timing = check_timing(series, span_ms, &t.timing);
        let continuity = check_continuity(series, point_count, span_ms, &t.continuity);

        let straightness = StraightnessAnalyzer::new(&t.straightness).analyze(samples);
        let smoothness = SmoothnessAnalyzer::new(&t.smoothness, &t.curves).analyze(samples, series, span_ms);
        let regularity = self.regularity(series);

        let not_robotic = straightness.passed && !smoothness.bezier_like && !regularity.too_regular;

        let target = TargetReport {
            hits: target_hits,
            required: t.target_hits_required,
            passed: target_hits >= t.target_hits_required,
        };

        let checks = SignalVector {
            speed: speed.passed,
            curves: curves.passed,
            jitter: jitter.passed,
            timing: timing.passed,
            continuous: continuity.passed,
            not_robotic,
            target_tracking: target.passed,
        };

        Evaluation {
            checks,
            metrics: SignalMetrics {
                speed,
                curves,
                jitter,
                timing,
                continuity,
                straightness,
                smoothness,
                regularity,
                target,
            },
        }
    }

    fn regularity(&self, series: &DerivedSeries) -> RegularityReport {
        let gap_cv = coefficient_of_variation(&series.gaps());
        RegularityReport {
            gap_cv,
            too_regular: gap_cv < self.thresholds.regularity.min_gap_cv,
        }
    }
}

/// Time between the first and last sample, in capture order
pub fn span(samples: &[Sample]) -> f64 {
    match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => last.t - first.t,
        _ => 0.0,
    }
}
