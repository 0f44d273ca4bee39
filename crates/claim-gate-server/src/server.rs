// crates/claim-gate-server/src/server.rs
// ============================================================================
// Module: Server Assembly
// Description: Router construction and the serving loop.
// Purpose: Bind the configured address and route requests to handlers.
// Dependencies: axum, tokio, crate::handlers, crate::state
// ============================================================================

//! ## Overview
//! Router construction is separated from serving so tests can drive the
//! router directly. The serving loop binds the configured address, applies
//! the configured body limit, and runs until interrupted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::handlers::handle_authorize;
use crate::handlers::handle_delete_candidate;
use crate::handlers::handle_health;
use crate::handlers::handle_permissions;
use crate::handlers::handle_ready;
use crate::handlers::handle_update_attributes;
use crate::state::AppState;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Serving loop errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The configured address could not be bound.
    #[error("bind failed on {addr}: {reason}")]
    Bind {
        /// Address that failed to bind.
        addr: String,
        /// Underlying failure description.
        reason: String,
    },
    /// The accept loop terminated with an error.
    #[error("serve failed: {0}")]
    Serve(String),
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the gateway router over shared application state.
#[must_use]
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.server.max_body_bytes);
    Router::new()
        .route("/api/authorize", post(handle_authorize))
        .route("/api/permissions", get(handle_permissions))
        .route("/api/candidates/{id}", delete(handle_delete_candidate))
        .route("/api/user-attributes", post(handle_update_attributes))
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .layer(body_limit)
        .with_state(state)
}

// ============================================================================
// SECTION: Serving Loop
// ============================================================================

/// Binds the configured address and serves until interrupted.
///
/// # Errors
///
/// Returns [`ServeError`] when binding or serving fails.
pub async fn serve(state: Arc<AppState>) -> Result<(), ServeError> {
    let addr = state.config.server.bind.clone();
    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await.map_err(|err| ServeError::Bind {
        addr: addr.clone(),
        reason: err.to_string(),
    })?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| ServeError::Serve(err.to_string()))
}

/// Resolves when the process receives an interrupt.
async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
}
