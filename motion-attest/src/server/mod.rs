//! HTTP surface
//!
//! [`AppState`] is built once at startup, shared with every handler through
//! axum `State`, and torn down after graceful shutdown.

pub mod error;
pub mod handlers;
pub mod router;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::analysis::classifier::MovementClassifier;
use crate::attestation::session_registry::SessionRegistry;
use crate::attestation::signer::Attestor;
use crate::time::clock::Clock;

pub use error::ApiError;
pub use router::build_router;

/// Service state owned by one server instance
#[derive(Debug)]
pub struct AppState {
    pub classifier: MovementClassifier,
    pub attestor: Attestor,
    pub sessions: SessionRegistry,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        classifier: MovementClassifier,
        attestor: Attestor,
        sessions: SessionRegistry,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            classifier,
            attestor,
            sessions,
            clock,
        }
    }

    /// Drop all sessions; returns how many were discarded
    pub fn shutdown(&self) -> usize {
        self.sessions.clear()
    }
}

/// Bind `bind_addr` and serve until Ctrl-C
pub async fn serve(bind_addr: &str, state: Arc<AppState>, permissive_cors: bool) -> crate::Result<()> {
    let app = build_router(Arc::clone(&state), permissive_cors);

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| crate::Error::Server(format!("failed to bind to {bind_addr}: {e}")))?;
    info!("motion-attest listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let discarded = state.shutdown();
    info!(discarded, "Server stopped, session registry cleared");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl-C handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
