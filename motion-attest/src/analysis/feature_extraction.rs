//! Kinematic feature extraction
//!
//! Turns an ordered sample sequence into the derived series every check reads:
//! per-step velocity, acceleration, jerk, signed turning angle and a
//! 4-neighbour smoothing residual.
//!
//! Pairs whose elapsed time is non-positive are skipped at every derivative
//! order, so each series can be shorter than its input but never contains a
//! division by zero.

use crate::capture::types::Sample;

/// Displacement between two consecutive samples with positive elapsed time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub dx: f64,
    pub dy: f64,
    /// Elapsed time (ms), always > 0
    pub dt: f64,
    /// Euclidean length (px)
    pub distance: f64,
    /// distance / dt (px/ms)
    pub speed: f64,
    pub vx: f64,
    pub vy: f64,
    /// Timestamp of the later sample
    pub t: f64,
}

/// Change of velocity between two consecutive steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Acceleration {
    pub ax: f64,
    pub ay: f64,
    pub magnitude: f64,
    pub t: f64,
}

/// Offset of a sample from the mean of its two predecessors and two successors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Residual {
    pub x: f64,
    pub y: f64,
}

/// All series derived from one sample sequence.
///
/// Produced once per analysis and shared read-only by the checks.
#[derive(Debug, Clone, Default)]
pub struct DerivedSeries {
    pub steps: Vec<Step>,
    pub accelerations: Vec<Acceleration>,
    /// Jerk magnitudes (px/ms³)
    pub jerk: Vec<f64>,
    /// Signed turning angles between consecutive steps (radians)
    pub curvature: Vec<f64>,
    pub residuals: Vec<Residual>,
}

impl DerivedSeries {
    /// Step speeds in capture order
    pub fn speeds(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.speed).collect()
    }

    /// Positive inter-sample gaps in capture order
    pub fn gaps(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.dt).collect()
    }

    pub fn residual_x(&self) -> Vec<f64> {
        self.residuals.iter().map(|r| r.x).collect()
    }

    pub fn residual_y(&self) -> Vec<f64> {
        self.residuals.iter().map(|r| r.y).collect()
    }

    /// Sum of step lengths
    pub fn path_length(&self) -> f64 {
        self.steps.iter().map(|s| s.distance).sum()
    }
}

/// Feature extraction engine
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    /// Both steps of a turning-angle pair must be longer than this (px)
    pub min_segment_px: f64,
}

impl FeatureExtractor {
    pub fn new(min_segment_px: f64) -> Self {
        Self { min_segment_px }
    }

    /// Derive every series from `samples`
    pub fn extract(&self, samples: &[Sample]) -> DerivedSeries {
        let steps = Self::steps(samples);
        let accelerations = Self::accelerations(&steps);
        let jerk = Self::jerk(&accelerations);
        let curvature = self.curvature(&steps);
        let residuals = Self::residuals(samples);

        DerivedSeries {
            steps,
            accelerations,
            jerk,
            curvature,
            residuals,
        }
    }

    fn steps(samples: &[Sample]) -> Vec<Step> {
        samples
            .windows(2)
            .filter_map(|w| {
                let dt = w[1].t - w[0].t;
                if dt <= 0.0 {
                    return None;
                }
                let dx = w[1].x - w[0].x;
                let dy = w[1].y - w[0].y;
                let distance = (dx * dx + dy * dy).sqrt();
                Some(Step {
                    dx,
                    dy,
                    dt,
                    distance,
                    speed: distance / dt,
                    vx: dx / dt,
                    vy: dy / dt,
                    t: w[1].t,
                })
            })
            .collect()
    }

    fn accelerations(steps: &[Step]) -> Vec<Acceleration> {
        steps
            .windows(2)
            .filter_map(|w| {
                let dt = w[1].t - w[0].t;
                if dt <= 0.0 {
                    return None;
                }
                let ax = (w[1].vx - w[0].vx) / dt;
                let ay = (w[1].vy - w[0].vy) / dt;
                Some(Acceleration {
                    ax,
                    ay,
                    magnitude: (ax * ax + ay * ay).sqrt(),
                    t: w[1].t,
                })
            })
            .collect()
    }

    fn jerk(accelerations: &[Acceleration]) -> Vec<f64> {
        accelerations
            .windows(2)
            .filter_map(|w| {
                let dt = w[1].t - w[0].t;
                if dt <= 0.0 {
                    return None;
                }
                let jx = w[1].ax - w[0].ax;
                let jy = w[1].ay - w[0].ay;
                Some((jx * jx + jy * jy).sqrt() / dt)
            })
            .collect()
    }

    /// Signed angle from one step to the next, `atan2(cross, dot)`
    fn curvature(&self, steps: &[Step]) -> Vec<f64> {
        steps
            .windows(2)
            .filter(|w| w[0].distance > self.min_segment_px && w[1].distance > self.min_segment_px)
            .map(|w| {
                let cross = w[0].dx * w[1].dy - w[0].dy * w[1].dx;
                let dot = w[0].dx * w[1].dx + w[0].dy * w[1].dy;
                cross.atan2(dot)
            })
            .collect()
    }

    fn residuals(samples: &[Sample]) -> Vec<Residual> {
        samples
            .windows(5)
            .map(|w| Residual {
                x: w[2].x - (w[0].x + w[1].x + w[3].x + w[4].x) / 4.0,
                y: w[2].y - (w[0].y + w[1].y + w[3].y + w[4].y) / 4.0,
            })
            .collect()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(0.5)
    }
}
