//! Primary movement checks
//!
//! Five of the six primary checks: speed variation, curve ratio, jitter,
//! timing and continuity. The sixth (`notRobotic`) is a composite assembled in
//! [`super::signals`].

use serde::Serialize;

use super::feature_extraction::DerivedSeries;
use super::stats::{fraction, mean};
use super::thresholds::{
    ContinuityThresholds, CurveThresholds, JitterThresholds, SpeedThresholds, TimingThresholds,
};

/// Speed variation between the start and end of the movement
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedReport {
    pub mean_first_third: f64,
    pub mean_last_third: f64,
    pub max_speed: f64,
    pub min_speed: f64,
    pub passed: bool,
}

/// Human paths mix gentle and sharp turns
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveReport {
    /// Fraction of angle pairs below the smooth-angle threshold
    pub smooth_ratio: f64,
    pub angle_pairs: usize,
    pub passed: bool,
}

/// Axis sign reversals relative to the point count
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JitterReport {
    pub reversals: usize,
    pub reversal_ratio: f64,
    pub passed: bool,
}

/// Overall span and frequency of long gaps
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingReport {
    pub span_ms: f64,
    pub slow_gap_fraction: f64,
    pub stall_gap_fraction: f64,
    pub passed: bool,
}

/// Sampling density
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuityReport {
    pub fast_gap_fraction: f64,
    pub points_per_second: f64,
    pub passed: bool,
}

/// Compare the first and last thirds of the speed series
pub fn check_speed(series: &DerivedSeries, thresholds: &SpeedThresholds) -> SpeedReport {
    let speeds = series.speeds();
    let third = speeds.len() / 3;
    if third == 0 {
        return SpeedReport::default();
    }

    let mean_first_third = mean(&speeds[..third]);
    let mean_last_third = mean(&speeds[speeds.len() - third..]);
    let max_speed = speeds.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_speed = speeds.iter().copied().fold(f64::INFINITY, f64::min);

    let passed = (mean_first_third - mean_last_third).abs() > thresholds.min_mean_delta
        || max_speed > thresholds.min_max_ratio * min_speed;

    SpeedReport {
        mean_first_third,
        mean_last_third,
        max_speed,
        min_speed,
        passed,
    }
}

/// Ratio of smooth turning angles must sit strictly inside the band
pub fn check_curves(series: &DerivedSeries, thresholds: &CurveThresholds) -> CurveReport {
    let angle_pairs = series.curvature.len();
    let smooth_ratio = fraction(&series.curvature, |a| a.abs() < thresholds.smooth_angle_rad);
    let passed = angle_pairs > 0
        && smooth_ratio > thresholds.min_ratio
        && smooth_ratio < thresholds.max_ratio;

    CurveReport {
        smooth_ratio,
        angle_pairs,
        passed,
    }
}

/// Count sign reversals of the per-step dx and dy
pub fn check_jitter(
    series: &DerivedSeries,
    point_count: usize,
    thresholds: &JitterThresholds,
) -> JitterReport {
    let reversals: usize = series
        .steps
        .windows(2)
        .map(|w| {
            usize::from(w[0].dx * w[1].dx < 0.0) + usize::from(w[0].dy * w[1].dy < 0.0)
        })
        .sum();

    let reversal_ratio = if point_count == 0 {
        0.0
    } else {
        reversals as f64 / point_count as f64
    };

    JitterReport {
        reversals,
        reversal_ratio,
        passed: reversal_ratio < thresholds.max_reversal_ratio,
    }
}

pub fn check_timing(series: &DerivedSeries, span_ms: f64, thresholds: &TimingThresholds) -> TimingReport {
    let gaps = series.gaps();
    let slow_gap_fraction = fraction(&gaps, |g| g > thresholds.slow_gap_ms);
    let stall_gap_fraction = fraction(&gaps, |g| g > thresholds.stall_gap_ms);

    let passed = !gaps.is_empty()
        && span_ms > thresholds.min_span_ms
        && slow_gap_fraction < thresholds.max_slow_fraction
        && stall_gap_fraction < thresholds.max_stall_fraction;

    TimingReport {
        span_ms,
        slow_gap_fraction,
        stall_gap_fraction,
        passed,
    }
}

pub fn check_continuity(
    series: &DerivedSeries,
    point_count: usize,
    span_ms: f64,
    thresholds: &ContinuityThresholds,
) -> ContinuityReport {
    let gaps = series.gaps();
    let fast_gap_fraction = fraction(&gaps, |g| g < thresholds.fast_gap_ms);
    let points_per_second = if span_ms > 0.0 {
        point_count as f64 / (span_ms / 1000.0)
    } else {
        0.0
    };

    ContinuityReport {
        fast_gap_fraction,
        points_per_second,
        passed: fast_gap_fraction > thresholds.min_fast_fraction
            && points_per_second > thresholds.min_points_per_second,
    }
}
