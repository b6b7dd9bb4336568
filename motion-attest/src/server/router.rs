//! Router construction for the attestation server.

use std::any::Any;
use std::sync::Arc;

use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::error::internal_error_response;
use super::handlers;
use super::AppState;

/// Build the full axum router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, permissive_cors: bool) -> Router {
    let api = Router::new()
        .route("/api/verify", post(handlers::verify))
        .route("/api/verify-signature", post(handlers::verify_signature))
        .route("/api/health", get(handlers::health))
        .with_state(state);

    let api = if permissive_cors {
        api.layer(CorsLayer::permissive())
    } else {
        api
    };

    api.layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(%detail, "Handler panicked");
    internal_error_response()
}
