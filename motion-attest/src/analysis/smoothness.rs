//! Anti-smoothing ("bezier-like") signal suite
//!
//! Movement generators built on parametric curves and easing functions
//! produce paths that are individually plausible but collectively too clean:
//! no jerk spikes, a single bell-shaped speed profile, perfectly correlated
//! residuals, motionless idle periods. Each of the 18 signals below tests one
//! such regularity. None of them is decisive alone; a path is bezier-like
//! when at least `min_triggered` of them fire.
//!
//! A signal whose metric cannot be computed (series too short, zero variance)
//! reports `value: None` and never fires.

use serde::Serialize;

use super::feature_extraction::DerivedSeries;
use super::stats::{autocorrelation_lag1, fraction, linear_fit_r2, mean, normalized_entropy, pearson};
use super::thresholds::{CurveThresholds, SmoothnessThresholds};
use crate::capture::types::Sample;

/// Names of the anti-smoothing signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothnessSignalKind {
    JerkSpikes,
    AccelSignChanges,
    CurvatureChange,
    VelocityPeaks,
    PathEfficiency,
    NoiseAutocorrelation,
    DirectionEntropy,
    VelocityReversals,
    JerkAutocorrelation,
    LinearAcceleration,
    SymmetricVelocity,
    ResidualXyCorrelation,
    PerfectStarts,
    MonotonicStarts,
    Fidget,
    ReversalRatio,
    SmoothCurveInverted,
    CurvatureFlipInverted,
}

/// One evaluated signal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmoothnessSignal {
    pub name: SmoothnessSignalKind,
    pub value: Option<f64>,
    pub triggered: bool,
}

/// Result of the whole suite
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothnessReport {
    pub signals: Vec<SmoothnessSignal>,
    pub triggered: usize,
    pub bezier_like: bool,
}

impl SmoothnessReport {
    /// Look up a signal by name
    pub fn signal(&self, name: SmoothnessSignalKind) -> Option<&SmoothnessSignal> {
        self.signals.iter().find(|s| s.name == name)
    }
}

/// Which side of the threshold looks machine-smooth
#[derive(Debug, Clone, Copy)]
enum Trigger {
    Below(f64),
    Above(f64),
}

impl Trigger {
    fn fires(self, value: f64) -> bool {
        match self {
            Trigger::Below(limit) => value < limit,
            Trigger::Above(limit) => value > limit,
        }
    }
}

fn evaluate(name: SmoothnessSignalKind, value: Option<f64>, trigger: Trigger) -> SmoothnessSignal {
    SmoothnessSignal {
        name,
        value,
        triggered: value.is_some_and(|v| trigger.fires(v)),
    }
}

/// Anti-smoothing analyzer
#[derive(Debug, Clone)]
pub struct SmoothnessAnalyzer<'a> {
    thresholds: &'a SmoothnessThresholds,
    curves: &'a CurveThresholds,
}

impl<'a> SmoothnessAnalyzer<'a> {
    pub fn new(thresholds: &'a SmoothnessThresholds, curves: &'a CurveThresholds) -> Self {
        Self { thresholds, curves }
    }

    /// Evaluate all signals over one movement
    pub fn analyze(&self, samples: &[Sample], series: &DerivedSeries, span_ms: f64) -> SmoothnessReport {
        use SmoothnessSignalKind::*;

        let t = self.thresholds;
        let speeds = series.speeds();

        let signals = vec![
            evaluate(JerkSpikes, self.jerk_spike_ratio(&series.jerk), Trigger::Below(t.jerk_spike_ratio_min)),
            evaluate(AccelSignChanges, accel_sign_change_rate(&speeds), Trigger::Below(t.accel_sign_change_min)),
            evaluate(CurvatureChange, curvature_change(&series.curvature), Trigger::Below(t.curvature_change_min)),
            evaluate(VelocityPeaks, velocity_peaks_per_second(&speeds, span_ms), Trigger::Below(t.velocity_peaks_per_sec_min)),
            evaluate(PathEfficiency, path_efficiency(samples, series), Trigger::Above(t.path_efficiency_max)),
            evaluate(NoiseAutocorrelation, noise_autocorrelation(series), Trigger::Above(t.noise_autocorrelation_max)),
            evaluate(DirectionEntropy, self.direction_entropy(&series.curvature), Trigger::Below(t.direction_entropy_min)),
            evaluate(VelocityReversals, velocity_reversal_rate(series), Trigger::Below(t.velocity_reversal_min)),
            evaluate(JerkAutocorrelation, autocorrelation_lag1(&series.jerk), Trigger::Above(t.jerk_autocorrelation_max)),
            evaluate(LinearAcceleration, self.linear_acceleration_ratio(series), Trigger::Above(t.linear_fit_ratio_max)),
            evaluate(SymmetricVelocity, self.velocity_symmetry(&speeds), Trigger::Above(t.symmetry_ratio_max)),
            evaluate(ResidualXyCorrelation, residual_xy_correlation(series), Trigger::Above(t.residual_correlation_max)),
            evaluate(PerfectStarts, self.perfect_start_ratio(series), Trigger::Above(t.perfect_start_ratio_max)),
            evaluate(MonotonicStarts, self.monotonic_start_ratio(&speeds), Trigger::Above(t.monotonic_start_ratio_max)),
            evaluate(Fidget, self.fidget_ratio(series), Trigger::Below(t.fidget_ratio_min)),
            evaluate(ReversalRatio, reversal_ratio(series), Trigger::Below(t.reversal_ratio_min)),
            evaluate(SmoothCurveInverted, self.smooth_curve_ratio(&series.curvature), Trigger::Above(t.smooth_curve_ratio_max)),
            evaluate(CurvatureFlipInverted, self.curvature_flip_rate(&series.curvature), Trigger::Below(t.curvature_flip_rate_min)),
        ];

        let triggered = signals.iter().filter(|s| s.triggered).count();
        SmoothnessReport {
            signals,
            triggered,
            bezier_like: triggered >= t.min_triggered,
        }
    }

    /// Fraction of jerk values far above the mean
    fn jerk_spike_ratio(&self, jerk: &[f64]) -> Option<f64> {
        if jerk.len() < 3 {
            return None;
        }
        let m = mean(jerk);
        if m <= 1e-12 {
            return Some(0.0);
        }
        let limit = self.thresholds.jerk_spike_factor * m;
        Some(fraction(jerk, |j| j > limit))
    }

    /// Normalized entropy of the left / straight / right turn histogram
    fn direction_entropy(&self, curvature: &[f64]) -> Option<f64> {
        let band = self.thresholds.straight_band_rad;
        let mut buckets = [0usize; 3];
        for angle in curvature {
            if *angle > band {
                buckets[0] += 1;
            } else if *angle < -band {
                buckets[2] += 1;
            } else {
                buckets[1] += 1;
            }
        }
        normalized_entropy(&buckets)
    }

    /// Fraction of acceleration-magnitude segments that a straight line fits
    fn linear_acceleration_ratio(&self, series: &DerivedSeries) -> Option<f64> {
        let segment = self.thresholds.linear_fit_segment.max(2);
        let magnitudes: Vec<f64> = series.accelerations.iter().map(|a| a.magnitude).collect();

        let fits: Vec<f64> = magnitudes.chunks_exact(segment).map(linear_fit_r2).collect();
        if fits.is_empty() {
            return None;
        }
        Some(fraction(&fits, |r2| r2 > self.thresholds.linear_fit_r2))
    }

    /// Fraction of speed pairs mirrored around the peak that match
    fn velocity_symmetry(&self, speeds: &[f64]) -> Option<f64> {
        let peak = speeds
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, s)| match best {
                Some((_, b)) if *s <= b => best,
                _ => Some((i, *s)),
            })
            .map(|(i, _)| i)?;

        let pairs = peak.min(speeds.len() - 1 - peak);
        if pairs < self.thresholds.symmetry_min_pairs {
            return None;
        }

        let symmetric = (1..=pairs)
            .filter(|k| {
                let before = speeds[peak - k];
                let after = speeds[peak + k];
                (before - after).abs() <= self.thresholds.symmetry_tolerance * before.max(after)
            })
            .count();
        Some(symmetric as f64 / pairs as f64)
    }

    /// After each pause, does the cursor leave in a dead-straight line?
    fn perfect_start_ratio(&self, series: &DerivedSeries) -> Option<f64> {
        let steps = &series.steps;
        let lookahead = self.thresholds.start_steps;

        let mut pauses = 0;
        let mut perfect = 0;
        for i in 0..steps.len() {
            if steps[i].dt <= self.thresholds.pause_gap_ms || i + lookahead >= steps.len() {
                continue;
            }
            pauses += 1;

            let consistent = steps[i..=i + lookahead].windows(2).all(|w| {
                if w[0].distance <= 1e-9 || w[1].distance <= 1e-9 {
                    return false;
                }
                let cosine = (w[0].dx * w[1].dx + w[0].dy * w[1].dy) / (w[0].distance * w[1].distance);
                cosine > self.thresholds.start_cosine
            });
            if consistent {
                perfect += 1;
            }
        }

        (pauses > 0).then(|| perfect as f64 / pauses as f64)
    }

    /// At each movement onset, does speed rise strictly for several steps?
    fn monotonic_start_ratio(&self, speeds: &[f64]) -> Option<f64> {
        let idle = self.thresholds.idle_speed;
        let run = self.thresholds.onset_steps;

        let mut onsets = 0;
        let mut monotonic = 0;
        for i in 0..speeds.len() {
            let is_onset = i == 0 || (speeds[i - 1] < idle && speeds[i] >= idle);
            if !is_onset || i + run >= speeds.len() {
                continue;
            }
            onsets += 1;
            if speeds[i..=i + run].windows(2).all(|w| w[0] < w[1]) {
                monotonic += 1;
            }
        }

        (onsets > 0).then(|| monotonic as f64 / onsets as f64)
    }

    /// Human hands drift while "still"; scripts hold the exact pixel
    fn fidget_ratio(&self, series: &DerivedSeries) -> Option<f64> {
        let idle: Vec<f64> = series
            .steps
            .iter()
            .filter(|s| s.speed < self.thresholds.idle_speed)
            .map(|s| s.distance)
            .collect();
        if idle.len() < self.thresholds.fidget_min_idle_steps {
            return None;
        }
        Some(fraction(&idle, |d| d > 0.0))
    }

    fn smooth_curve_ratio(&self, curvature: &[f64]) -> Option<f64> {
        if curvature.is_empty() {
            return None;
        }
        Some(fraction(curvature, |a| a.abs() < self.curves.smooth_angle_rad))
    }

    /// Sign flips among the clearly-turning angles
    fn curvature_flip_rate(&self, curvature: &[f64]) -> Option<f64> {
        let band = self.thresholds.straight_band_rad;
        let turning: Vec<f64> = curvature.iter().copied().filter(|a| a.abs() > band).collect();
        if turning.len() < 2 {
            return None;
        }
        let flips = turning.windows(2).filter(|w| w[0] * w[1] < 0.0).count();
        Some(flips as f64 / (turning.len() - 1) as f64)
    }
}

/// Sign changes of successive speed deltas
fn accel_sign_change_rate(speeds: &[f64]) -> Option<f64> {
    let deltas: Vec<f64> = speeds.windows(2).map(|w| w[1] - w[0]).collect();
    if deltas.len() < 2 {
        return None;
    }
    let changes = deltas.windows(2).filter(|w| w[0] * w[1] < 0.0).count();
    Some(changes as f64 / (deltas.len() - 1) as f64)
}

/// Mean absolute change between successive turning angles
fn curvature_change(curvature: &[f64]) -> Option<f64> {
    if curvature.len() < 2 {
        return None;
    }
    let changes: Vec<f64> = curvature.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    Some(mean(&changes))
}

/// Local speed maxima per second of movement
fn velocity_peaks_per_second(speeds: &[f64], span_ms: f64) -> Option<f64> {
    if speeds.len() < 3 || span_ms <= 0.0 {
        return None;
    }
    let peaks = speeds
        .windows(3)
        .filter(|w| w[1] > w[0] && w[1] >= w[2])
        .count();
    Some(peaks as f64 / (span_ms / 1000.0))
}

/// Endpoint distance over travelled distance
fn path_efficiency(samples: &[Sample], series: &DerivedSeries) -> Option<f64> {
    let total = series.path_length();
    let (first, last) = (samples.first()?, samples.last()?);
    if total <= 1e-9 {
        return None;
    }
    Some(first.distance_to(last) / total)
}

/// Mean lag-1 autocorrelation of the x and y residuals
fn noise_autocorrelation(series: &DerivedSeries) -> Option<f64> {
    let values: Vec<f64> = [
        autocorrelation_lag1(&series.residual_x()),
        autocorrelation_lag1(&series.residual_y()),
    ]
    .into_iter()
    .flatten()
    .collect();

    if values.is_empty() {
        return None;
    }
    Some(mean(&values))
}

/// Fraction of successive velocities where either axis flips sign
fn velocity_reversal_rate(series: &DerivedSeries) -> Option<f64> {
    if series.steps.len() < 2 {
        return None;
    }
    let reversals = series
        .steps
        .windows(2)
        .filter(|w| w[0].vx * w[1].vx < 0.0 || w[0].vy * w[1].vy < 0.0)
        .count();
    Some(reversals as f64 / (series.steps.len() - 1) as f64)
}

fn residual_xy_correlation(series: &DerivedSeries) -> Option<f64> {
    pearson(&series.residual_x(), &series.residual_y()).map(f64::abs)
}

/// Fraction of successive moving steps that point backwards
fn reversal_ratio(series: &DerivedSeries) -> Option<f64> {
    let moving: Vec<bool> = series
        .steps
        .windows(2)
        .filter(|w| w[0].distance > 0.0 && w[1].distance > 0.0)
        .map(|w| w[0].dx * w[1].dx + w[0].dy * w[1].dy < 0.0)
        .collect();
    if moving.is_empty() {
        return None;
    }
    Some(moving.iter().filter(|r| **r).count() as f64 / moving.len() as f64)
}
