//! Core types for submitted movements
//!
//! Samples are kept in capture order. They are never re-sorted, even when the
//! client clock produced out-of-order timestamps.

use serde::{Deserialize, Deserializer, Serialize};

/// One pointer observation: planar position in pixels and a timestamp in
/// milliseconds.
///
/// Field order is part of the canonical movement hash; do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub t: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64, t: f64) -> Self {
        Self { x, y, t }
    }

    /// Euclidean distance to another sample
    pub fn distance_to(&self, other: &Sample) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Perpendicular distance to the line through `line_start` and `line_end`
    pub fn perpendicular_distance(&self, line_start: &Sample, line_end: &Sample) -> f64 {
        let dx = line_end.x - line_start.x;
        let dy = line_end.y - line_start.y;

        let line_length_sq = dx * dx + dy * dy;

        if line_length_sq < 1e-10 {
            // Degenerate line: fall back to point distance
            return self.distance_to(line_start);
        }

        let numerator = ((self.x - line_start.x) * dy - (self.y - line_start.y) * dx).abs();
        numerator / line_length_sq.sqrt()
    }
}

/// Body of `POST /api/verify`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementSubmission {
    /// Samples in capture order
    pub points: Vec<Sample>,
    /// Targets the client reports as hit after the reaction floor
    #[serde(default, deserialize_with = "clamped_hit_count")]
    pub target_hits: u32,
    /// Caller-supplied record identifier; generated when absent
    #[serde(default)]
    pub record_id: Option<String>,
}

/// Client-reported counts are plain integers; negatives count as zero
fn clamped_hit_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, i64::from(u32::MAX)) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to() {
        let a = Sample::new(0.0, 0.0, 0.0);
        let b = Sample::new(3.0, 4.0, 10.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_perpendicular_distance() {
        let start = Sample::new(0.0, 0.0, 0.0);
        let end = Sample::new(10.0, 0.0, 0.0);
        let p = Sample::new(5.0, 3.0, 0.0);
        assert!((p.perpendicular_distance(&start, &end) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_perpendicular_distance_degenerate_line() {
        let start = Sample::new(1.0, 1.0, 0.0);
        let p = Sample::new(4.0, 5.0, 0.0);
        assert!((p.perpendicular_distance(&start, &start) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_submission_defaults() {
        let json = r#"{"points":[{"x":1,"y":2,"t":3}]}"#;
        let submission: MovementSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(submission.points.len(), 1);
        assert_eq!(submission.points[0], Sample::new(1.0, 2.0, 3.0));
        assert_eq!(submission.target_hits, 0);
        assert!(submission.record_id.is_none());
    }

    #[test]
    fn test_submission_camel_case_fields() {
        let json = r#"{"points":[],"targetHits":6,"recordId":"abc"}"#;
        let submission: MovementSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(submission.target_hits, 6);
        assert_eq!(submission.record_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_negative_target_hits_clamp_to_zero() {
        let json = r#"{"points":[],"targetHits":-3}"#;
        let submission: MovementSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(submission.target_hits, 0);

        let json = r#"{"points":[],"targetHits":99999999999}"#;
        let submission: MovementSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(submission.target_hits, u32::MAX);
    }

    #[test]
    fn test_submission_rejects_non_array_points() {
        let json = r#"{"points":"nope"}"#;
        assert!(serde_json::from_str::<MovementSubmission>(json).is_err());
    }

    #[test]
    fn test_submission_rejects_missing_points() {
        let json = r#"{"targetHits":3}"#;
        assert!(serde_json::from_str::<MovementSubmission>(json).is_err());
    }
}
