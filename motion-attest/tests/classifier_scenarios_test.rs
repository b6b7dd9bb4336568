//! Integration tests for the classification pipeline
//!
//! Synthetic automation paths, a recorded human path and degenerate inputs,
//! driven through `MovementClassifier::analyze`.

use motion_attest::analysis::decision::FailureReason;
use motion_attest::analysis::Thresholds;
use motion_attest::capture::types::MovementSubmission;
use motion_attest::{AnalysisResult, MovementClassifier, Sample};

const HUMAN_PATH: &str = include_str!("fixtures/human_path.json");

fn human_submission() -> MovementSubmission {
    serde_json::from_str(HUMAN_PATH).expect("fixture should parse")
}

/// 50 evenly spaced points on a horizontal line, 16 ms apart
fn straight_line() -> Vec<Sample> {
    (0..50)
        .map(|i| Sample::new(100.0 + i as f64 * 5.0, 200.0, i as f64 * 16.0))
        .collect()
}

fn ease_in_out_cubic(u: f64) -> f64 {
    if u < 0.5 {
        4.0 * u * u * u
    } else {
        1.0 - (-2.0 * u + 2.0).powi(3) / 2.0
    }
}

/// Quadratic Bezier from (100, 300) to (600, 300) driven by an ease-in-out cubic
fn eased_bezier() -> Vec<Sample> {
    (0..50)
        .map(|i| {
            let u = ease_in_out_cubic(i as f64 / 49.0);
            let x = (1.0 - u).powi(2) * 100.0 + 2.0 * (1.0 - u) * u * 300.0 + u * u * 600.0;
            let y = (1.0 - u).powi(2) * 300.0 + 2.0 * (1.0 - u) * u * 50.0 + u * u * 300.0;
            Sample::new(x, y, i as f64 * 16.0)
        })
        .collect()
}

fn assert_invariants(result: &AnalysisResult) {
    assert!(result.checks_passed <= 7);
    if result.verified {
        assert_eq!(result.checks_passed, 7);
        assert!(!result.ai_detected);
        assert!(result.reason.is_none());
    } else {
        assert!(result.reason.is_some());
    }
}

#[test]
fn test_straight_line_is_robotic() {
    let result = MovementClassifier::default().analyze(&straight_line(), 6);

    let straightness = &result.metrics.straightness;
    assert_eq!(straightness.windows_evaluated, 4);
    assert!(straightness.straight_fraction >= 0.5);
    assert!(!straightness.passed);

    assert!(!result.checks.not_robotic);
    assert!(!result.verified);
    assert!(result.ai_detected);
    assert_eq!(result.reason, Some(FailureReason::AutomationSuspected));
    assert_invariants(&result);
}

#[test]
fn test_eased_bezier_is_bezier_like() {
    let result = MovementClassifier::default().analyze(&eased_bezier(), 6);

    assert!(result.metrics.straightness.passed, "curve should not look straight");
    assert!(result.metrics.smoothness.triggered >= 3);
    assert!(result.metrics.smoothness.bezier_like);
    assert!(!result.checks.not_robotic);
    assert!(!result.verified);
    assert_invariants(&result);
}

#[test]
fn test_recorded_human_path_verifies() {
    let submission = human_submission();
    assert_eq!(submission.target_hits, 6);

    let result = MovementClassifier::default().analyze(&submission.points, submission.target_hits);

    assert!(result.checks.speed, "speed: {:?}", result.metrics.speed);
    assert!(result.checks.curves, "curves: {:?}", result.metrics.curves);
    assert!(result.checks.jitter, "jitter: {:?}", result.metrics.jitter);
    assert!(result.checks.timing, "timing: {:?}", result.metrics.timing);
    assert!(result.checks.continuous, "continuity: {:?}", result.metrics.continuity);
    assert!(result.checks.not_robotic, "smoothness: {:?}", result.metrics.smoothness);
    assert!(result.checks.target_tracking);

    assert!(result.verified);
    assert_eq!(result.checks_passed, 7);
    assert!(!result.ai_detected);
    assert_eq!(result.point_count, submission.points.len());
    assert_invariants(&result);
}

#[test]
fn test_human_path_without_target_hits_fails() {
    let submission = human_submission();
    let result = MovementClassifier::default().analyze(&submission.points, 4);
    assert!(!result.verified);
    assert_eq!(result.checks_passed, 6);
    assert!(!result.ai_detected);
    assert_eq!(result.reason, Some(FailureReason::ChecksFailed));
}

#[test]
fn test_stationary_points_do_not_panic() {
    let points: Vec<Sample> = (0..20).map(|i| Sample::new(50.0, 50.0, i as f64 * 16.0)).collect();
    let result = MovementClassifier::default().analyze(&points, 6);

    assert!(!result.verified);
    assert!(!result.checks.speed);
    assert!(!result.checks.curves);
    assert_eq!(result.metrics.curves.angle_pairs, 0);
    assert_eq!(result.metrics.straightness.windows_evaluated, 0);
    assert_invariants(&result);
}

#[test]
fn test_identical_timestamps_do_not_panic() {
    let points: Vec<Sample> = (0..20).map(|i| Sample::new(i as f64 * 4.0, 10.0, 1000.0)).collect();
    let result = MovementClassifier::default().analyze(&points, 6);
    assert!(!result.verified);
    assert_eq!(result.duration, 0.0);
    assert_invariants(&result);
}

#[test]
fn test_fully_identical_samples_do_not_panic() {
    let points = vec![Sample::new(50.0, 50.0, 1000.0); 20];
    let result = MovementClassifier::default().analyze(&points, 6);

    assert!(!result.verified);
    assert!(result.ai_detected);
    assert_eq!(result.checks_passed, 2);
    assert_eq!(result.duration, 0.0);
    assert_eq!(result.point_count, 20);
    assert_eq!(result.reason, Some(FailureReason::AutomationSuspected));
    assert_invariants(&result);
}

#[test]
fn test_fewer_than_min_points_is_insufficient() {
    let classifier = MovementClassifier::default();
    for n in 0..15 {
        let points: Vec<Sample> = straight_line().into_iter().take(n).collect();
        let result = classifier.analyze(&points, 10);
        assert!(!result.verified);
        assert_eq!(result.checks_passed, 0);
        assert_eq!(result.reason, Some(FailureReason::InsufficientData));
    }
}

#[test]
fn test_out_of_order_timestamps_are_not_resorted() {
    let mut points = human_submission().points;
    points.swap(10, 11);
    let result = MovementClassifier::default().analyze(&points, 6);
    assert_eq!(result.point_count, points.len());
    assert_invariants(&result);
}

#[test]
fn test_retuned_thresholds_change_verdict() {
    let submission = human_submission();
    let thresholds = Thresholds {
        target_hits_required: 10,
        ..Thresholds::default()
    };
    let result = MovementClassifier::new(thresholds).analyze(&submission.points, submission.target_hits);
    assert!(!result.checks.target_tracking);
    assert!(!result.verified);
}
