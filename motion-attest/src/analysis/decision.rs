//! Decision Aggregator

use serde::Serialize;

use super::signals::SignalVector;

/// Automation is suspected once this many AI-sensitive checks fail
const AUTOMATION_FAILURE_LIMIT: usize = 2;

/// Why a movement was not verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Fewer samples than the configured minimum
    InsufficientData,
    /// At least two of curves / continuous / notRobotic / timing failed
    AutomationSuspected,
    ChecksFailed,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::InsufficientData => "insufficient_data",
            FailureReason::AutomationSuspected => "automation_suspected",
            FailureReason::ChecksFailed => "checks_failed",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict derived from a [`SignalVector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub verified: bool,
    /// 0..=7
    pub checks_passed: u8,
    pub ai_detected: bool,
}

impl Decision {
    pub fn from_signals(checks: &SignalVector) -> Self {
        let primary = checks.primary();
        let primary_passed = primary.iter().filter(|c| **c).count() as u8;
        let checks_passed = primary_passed + u8::from(checks.target_tracking);

        Self {
            verified: primary.iter().all(|c| *c) && checks.target_tracking,
            checks_passed,
            ai_detected: checks.automation_failures() >= AUTOMATION_FAILURE_LIMIT,
        }
    }

    /// `None` when verified
    pub fn reason(&self) -> Option<FailureReason> {
        if self.verified {
            None
        } else if self.ai_detected {
            Some(FailureReason::AutomationSuspected)
        } else {
            Some(FailureReason::ChecksFailed)
        }
    }
}
