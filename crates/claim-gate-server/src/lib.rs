// crates/claim-gate-server/src/lib.rs
// ============================================================================
// Module: Claim Gate Server
// Description: HTTP surface of the authorization gateway.
// Purpose: Route bearer-token requests through the policy decision flow.
// Dependencies: axum, claim-gate-core, claim-gate-config, claim-gate-providers
// ============================================================================

//! ## Overview
//! The server crate wires the core normalization and query construction into
//! an axum HTTP surface. Every request follows the same shape: extract the
//! bearer token, decode and normalize claims, build an authorization query,
//! await the external decision, and map the outcome onto an HTTP status.
//! Invariants:
//! - Authentication failures (missing header, undecodable token, missing
//!   subject) return 401 before any outbound call is made.
//! - Only an exact ALLOW decision produces a success response.
//! - No state outlives a single request/response cycle.
//!
//! Security posture: bearer tokens are untrusted input; structural decoding
//! reproduces the observed upstream behavior and RS256 verification is
//! available behind configuration.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::LogDecisionAuditSink;
pub use auth::TokenDecodeError;
pub use auth::TokenDecoder;
pub use auth::TokenSetupError;
pub use auth::bearer_token;
pub use error::GatewayError;
pub use server::ServeError;
pub use server::build_router;
pub use server::serve;
pub use state::AppState;
pub use telemetry::GatewayMetrics;
pub use telemetry::NoopGatewayMetrics;
pub use telemetry::RequestMetricEvent;
pub use telemetry::RequestOutcome;
pub use telemetry::RouteLabel;
