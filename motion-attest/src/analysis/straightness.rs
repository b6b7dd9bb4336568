//! Sliding-window straightness test
//!
//! Scripted cursors often interpolate linearly between waypoints. A window of
//! samples is "too straight" when its interior points hug the chord between
//! the window endpoints both relatively and absolutely.

use serde::Serialize;

use super::thresholds::StraightnessThresholds;
use crate::capture::types::Sample;

/// Outcome of the straightness sub-test
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StraightnessReport {
    /// Windows whose endpoints were far enough apart to evaluate
    pub windows_evaluated: usize,
    pub windows_too_straight: usize,
    pub straight_fraction: f64,
    /// True when the path is NOT dominated by straight windows
    pub passed: bool,
}

/// Straightness analyzer
#[derive(Debug, Clone)]
pub struct StraightnessAnalyzer<'a> {
    thresholds: &'a StraightnessThresholds,
}

impl<'a> StraightnessAnalyzer<'a> {
    pub fn new(thresholds: &'a StraightnessThresholds) -> Self {
        Self { thresholds }
    }

    /// Slide the window over `samples` and count too-straight windows
    pub fn analyze(&self, samples: &[Sample]) -> StraightnessReport {
        let window = self.thresholds.window;
        let stride = self.thresholds.stride.max(1);

        let mut windows_evaluated = 0;
        let mut windows_too_straight = 0;

        let mut start = 0;
        while window >= 3 && start + window <= samples.len() {
            let chunk = &samples[start..start + window];
            if let Some(too_straight) = self.window_is_too_straight(chunk) {
                windows_evaluated += 1;
                if too_straight {
                    windows_too_straight += 1;
                }
            }
            start += stride;
        }

        let straight_fraction = if windows_evaluated == 0 {
            0.0
        } else {
            windows_too_straight as f64 / windows_evaluated as f64
        };

        let failed = windows_evaluated > 0
            && straight_fraction >= self.thresholds.max_straight_fraction;

        StraightnessReport {
            windows_evaluated,
            windows_too_straight,
            straight_fraction,
            passed: !failed,
        }
    }

    /// `None` when the chord is too short to judge
    fn window_is_too_straight(&self, chunk: &[Sample]) -> Option<bool> {
        let first = chunk.first()?;
        let last = chunk.last()?;
        let line_length = first.distance_to(last);
        if line_length < self.thresholds.min_line_px {
            return None;
        }

        let interior = &chunk[1..chunk.len() - 1];
        let mean_deviation = interior
            .iter()
            .map(|p| p.perpendicular_distance(first, last))
            .sum::<f64>()
            / interior.len() as f64;

        let deviation_ratio = mean_deviation / line_length;
        Some(
            deviation_ratio < self.thresholds.max_deviation_ratio
                && mean_deviation < self.thresholds.max_mean_deviation_px,
        )
    }
}
