//! Request handlers for `/api/*`

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ApiError;
use super::AppState;
use crate::analysis::decision::FailureReason;
use crate::analysis::signals::{SignalMetrics, SignalVector};
use crate::capture::types::MovementSubmission;

/// `POST /api/verify` success body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedResponse {
    pub verified: bool,
    pub signature: String,
    pub session_id: String,
    pub timestamp: i64,
    pub checks: SignalVector,
    pub checks_passed: u8,
    pub metrics: SignalMetrics,
}

/// `POST /api/verify` failure body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedResponse {
    pub verified: bool,
    pub ai_detected: bool,
    pub checks: SignalVector,
    pub checks_passed: u8,
    pub reason: Option<FailureReason>,
    pub metrics: SignalMetrics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureCheckRequest {
    pub session_id: Option<String>,
    pub signature: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub server_side_verification: bool,
    pub active_sessions: usize,
}

/// Classify a movement and, when verified, issue a signed session
pub async fn verify(
    State(state): State<Arc<AppState>>,
    body: Result<Json<MovementSubmission>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(submission) = body?;

    let result = state
        .classifier
        .analyze(&submission.points, submission.target_hits);
    let record_id = submission
        .record_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    info!(
        record_id = %record_id,
        points = result.point_count,
        checks_passed = result.checks_passed,
        verified = result.verified,
        ai_detected = result.ai_detected,
        "Movement analyzed"
    );

    if !result.verified {
        return Ok(Json(RejectedResponse {
            verified: false,
            ai_detected: result.ai_detected,
            checks: result.checks,
            checks_passed: result.checks_passed,
            reason: result.reason,
            metrics: result.metrics,
        })
        .into_response());
    }

    let now = state.clock.now_millis();
    let attestation = state
        .attestor
        .issue(&submission.points, &record_id, result.checks_passed, now)?;
    let session = state.sessions.register(&attestation, &record_id);

    Ok(Json(VerifiedResponse {
        verified: true,
        signature: attestation.signature,
        session_id: session.session_id,
        timestamp: attestation.timestamp,
        checks: result.checks,
        checks_passed: result.checks_passed,
        metrics: result.metrics,
    })
    .into_response())
}

/// Re-verify a previously issued session
pub async fn verify_signature(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SignatureCheckRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;

    let (Some(session_id), Some(signature)) = (
        request.session_id.filter(|s| !s.is_empty()),
        request.signature.filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "sessionId and signature are required".to_string(),
        ));
    };

    let lookup = state.sessions.lookup(&session_id, &signature);
    info!(
        session_id = %session_id,
        valid = lookup.valid,
        reason = ?lookup.reason,
        "Session re-verification"
    );

    Ok(Json(lookup).into_response())
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        server_side_verification: true,
        active_sessions: state.sessions.active_count(),
    })
}
