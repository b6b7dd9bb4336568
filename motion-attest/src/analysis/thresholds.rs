//! Classifier thresholds
//!
//! Every constant the classifier compares against lives here, grouped per
//! check. The whole object is versioned so that a threshold retune is a data
//! change shipped through configuration, never a code change.
//!
//! Units: positions in pixels, time in milliseconds, speed in px/ms.

use serde::{Deserialize, Serialize};

/// Current threshold schema version
pub const THRESHOLDS_VERSION: u32 = 1;

/// Complete, versioned threshold set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Schema version of this threshold set
    pub version: u32,
    /// Fewer samples than this short-circuits to `insufficient_data`
    pub min_points: usize,
    /// Target hits needed for the target-tracking check
    pub target_hits_required: u32,
    pub speed: SpeedThresholds,
    pub curves: CurveThresholds,
    pub jitter: JitterThresholds,
    pub timing: TimingThresholds,
    pub continuity: ContinuityThresholds,
    pub straightness: StraightnessThresholds,
    pub smoothness: SmoothnessThresholds,
    pub regularity: RegularityThresholds,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            version: THRESHOLDS_VERSION,
            min_points: 15,
            target_hits_required: 5,
            speed: SpeedThresholds::default(),
            curves: CurveThresholds::default(),
            jitter: JitterThresholds::default(),
            timing: TimingThresholds::default(),
            continuity: ContinuityThresholds::default(),
            straightness: StraightnessThresholds::default(),
            smoothness: SmoothnessThresholds::default(),
            regularity: RegularityThresholds::default(),
        }
    }
}

/// Speed variation check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedThresholds {
    /// Minimum |mean(first third) - mean(last third)| in px/ms
    pub min_mean_delta: f64,
    /// Alternatively, max speed must exceed this multiple of min speed
    pub min_max_ratio: f64,
}

impl Default for SpeedThresholds {
    fn default() -> Self {
        Self {
            min_mean_delta: 0.05,
            min_max_ratio: 1.5,
        }
    }
}

/// Curve ratio check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveThresholds {
    /// Turning angles below this (radians) count as smooth
    pub smooth_angle_rad: f64,
    /// Both displacement vectors must be longer than this to form an angle pair
    pub min_segment_px: f64,
    /// Smooth ratio must be strictly above this
    pub min_ratio: f64,
    /// Smooth ratio must be strictly below this
    pub max_ratio: f64,
}

impl Default for CurveThresholds {
    fn default() -> Self {
        Self {
            smooth_angle_rad: 0.3,
            min_segment_px: 0.5,
            min_ratio: 0.3,
            max_ratio: 0.95,
        }
    }
}

/// Jitter check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterThresholds {
    /// Axis sign reversals per point must stay below this
    pub max_reversal_ratio: f64,
}

impl Default for JitterThresholds {
    fn default() -> Self {
        Self {
            max_reversal_ratio: 0.6,
        }
    }
}

/// Timing check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingThresholds {
    /// Total span must exceed this
    pub min_span_ms: f64,
    /// Gaps longer than this are "slow"
    pub slow_gap_ms: f64,
    /// Fraction of slow gaps must stay below this
    pub max_slow_fraction: f64,
    /// Gaps longer than this are "stalls"
    pub stall_gap_ms: f64,
    /// Fraction of stalls must stay below this
    pub max_stall_fraction: f64,
}

impl Default for TimingThresholds {
    fn default() -> Self {
        Self {
            min_span_ms: 300.0,
            slow_gap_ms: 50.0,
            max_slow_fraction: 0.3,
            stall_gap_ms: 150.0,
            max_stall_fraction: 0.1,
        }
    }
}

/// Continuity check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuityThresholds {
    /// Gaps shorter than this are "fast"
    pub fast_gap_ms: f64,
    /// Fraction of fast gaps must exceed this
    pub min_fast_fraction: f64,
    /// Sampling density must exceed this
    pub min_points_per_second: f64,
}

impl Default for ContinuityThresholds {
    fn default() -> Self {
        Self {
            fast_gap_ms: 30.0,
            min_fast_fraction: 0.4,
            min_points_per_second: 15.0,
        }
    }
}

/// Sliding-window straightness sub-test of `notRobotic`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StraightnessThresholds {
    /// Samples per window
    pub window: usize,
    /// Samples between window starts
    pub stride: usize,
    /// Windows whose endpoints are closer than this are not evaluated
    pub min_line_px: f64,
    /// Mean deviation / line length below this is too straight...
    pub max_deviation_ratio: f64,
    /// ...when the mean deviation is also below this
    pub max_mean_deviation_px: f64,
    /// Fail when at least this fraction of evaluated windows is too straight
    pub max_straight_fraction: f64,
}

impl Default for StraightnessThresholds {
    fn default() -> Self {
        Self {
            window: 20,
            stride: 10,
            min_line_px: 10.0,
            max_deviation_ratio: 0.005,
            max_mean_deviation_px: 2.0,
            max_straight_fraction: 0.5,
        }
    }
}

/// Anti-smoothing ("bezier-like") suite
///
/// Each `*_max` / `*_min` names the side on which the signal triggers:
/// a metric above a `_max` or below a `_min` looks machine-smooth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothnessThresholds {
    /// Triggered signals needed to classify the path as bezier-like
    pub min_triggered: usize,

    /// A jerk value above `jerk_spike_factor * mean` is a spike
    pub jerk_spike_factor: f64,
    pub jerk_spike_ratio_min: f64,
    pub accel_sign_change_min: f64,
    pub curvature_change_min: f64,
    pub velocity_peaks_per_sec_min: f64,
    pub path_efficiency_max: f64,
    pub noise_autocorrelation_max: f64,
    /// Turning angles within this band (radians) fall in the "straight" bucket
    pub straight_band_rad: f64,
    pub direction_entropy_min: f64,
    pub velocity_reversal_min: f64,
    pub jerk_autocorrelation_max: f64,
    /// Acceleration magnitudes per linear-fit segment
    pub linear_fit_segment: usize,
    pub linear_fit_r2: f64,
    pub linear_fit_ratio_max: f64,
    /// Relative tolerance for a mirrored speed pair to count as symmetric
    pub symmetry_tolerance: f64,
    pub symmetry_min_pairs: usize,
    pub symmetry_ratio_max: f64,
    pub residual_correlation_max: f64,
    /// Gaps longer than this count as a pause
    pub pause_gap_ms: f64,
    /// Step pairs inspected after a pause
    pub start_steps: usize,
    pub start_cosine: f64,
    pub perfect_start_ratio_max: f64,
    /// Speeds below this (px/ms) are idle
    pub idle_speed: f64,
    /// Strictly increasing speeds required after an onset
    pub onset_steps: usize,
    pub monotonic_start_ratio_max: f64,
    pub fidget_min_idle_steps: usize,
    pub fidget_ratio_min: f64,
    pub reversal_ratio_min: f64,
    pub smooth_curve_ratio_max: f64,
    pub curvature_flip_rate_min: f64,
}

impl Default for SmoothnessThresholds {
    fn default() -> Self {
        Self {
            min_triggered: 3,
            jerk_spike_factor: 3.0,
            jerk_spike_ratio_min: 0.02,
            accel_sign_change_min: 0.1,
            curvature_change_min: 0.02,
            velocity_peaks_per_sec_min: 1.5,
            path_efficiency_max: 0.98,
            noise_autocorrelation_max: 0.9,
            straight_band_rad: 0.05,
            direction_entropy_min: 0.5,
            velocity_reversal_min: 0.05,
            jerk_autocorrelation_max: 0.8,
            linear_fit_segment: 8,
            linear_fit_r2: 0.85,
            linear_fit_ratio_max: 0.6,
            symmetry_tolerance: 0.15,
            symmetry_min_pairs: 3,
            symmetry_ratio_max: 0.8,
            residual_correlation_max: 0.7,
            pause_gap_ms: 100.0,
            start_steps: 3,
            start_cosine: 0.95,
            perfect_start_ratio_max: 0.8,
            idle_speed: 0.1,
            onset_steps: 4,
            monotonic_start_ratio_max: 0.8,
            fidget_min_idle_steps: 3,
            fidget_ratio_min: 0.15,
            reversal_ratio_min: 0.02,
            smooth_curve_ratio_max: 0.9,
            curvature_flip_rate_min: 0.15,
        }
    }
}

/// Timing-regularity sub-test of `notRobotic`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegularityThresholds {
    /// Coefficient of variation of gaps below this is too regular
    pub min_gap_cv: f64,
}

impl Default for RegularityThresholds {
    fn default() -> Self {
        Self { min_gap_cv: 0.12 }
    }
}

impl Thresholds {
    /// Check the threshold set for values the classifier cannot work with.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.version == 0 {
            return Err(crate::Error::Config("thresholds.version must be > 0".to_string()));
        }
        if self.min_points < 5 {
            return Err(crate::Error::Config(format!(
                "thresholds.min_points must be >= 5, got {}",
                self.min_points
            )));
        }
        if self.straightness.window < 3 {
            return Err(crate::Error::Config(format!(
                "thresholds.straightness.window must be >= 3, got {}",
                self.straightness.window
            )));
        }
        if self.straightness.stride == 0 {
            return Err(crate::Error::Config(
                "thresholds.straightness.stride must be > 0".to_string(),
            ));
        }
        if self.smoothness.linear_fit_segment < 3 {
            return Err(crate::Error::Config(format!(
                "thresholds.smoothness.linear_fit_segment must be >= 3, got {}",
                self.smoothness.linear_fit_segment
            )));
        }
        if self.smoothness.min_triggered == 0 {
            return Err(crate::Error::Config(
                "thresholds.smoothness.min_triggered must be > 0".to_string(),
            ));
        }

        let fractions = [
            ("curves.min_ratio", self.curves.min_ratio),
            ("curves.max_ratio", self.curves.max_ratio),
            ("timing.max_slow_fraction", self.timing.max_slow_fraction),
            ("timing.max_stall_fraction", self.timing.max_stall_fraction),
            ("continuity.min_fast_fraction", self.continuity.min_fast_fraction),
            ("straightness.max_straight_fraction", self.straightness.max_straight_fraction),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(crate::Error::Config(format!(
                    "thresholds.{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.curves.min_ratio >= self.curves.max_ratio {
            return Err(crate::Error::Config(format!(
                "thresholds.curves.min_ratio ({}) must be below max_ratio ({})",
                self.curves.min_ratio, self.curves.max_ratio
            )));
        }
        Ok(())
    }
}
