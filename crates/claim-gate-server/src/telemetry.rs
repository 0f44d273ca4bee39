// crates/claim-gate-server/src/telemetry.rs
// ============================================================================
// Module: Gateway Telemetry
// Description: Request metric events and the metrics recording seam.
// Purpose: Count requests per route/outcome and record handler latency.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Telemetry is a trait seam: handlers emit one metric event per request and
//! one latency observation, and deployments choose a recorder. The default
//! recorder drops everything.
//! Invariants:
//! - Labels are closed enums; no request data leaks into metric labels.
//! - Recording must never fail a request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// SECTION: Labels
// ============================================================================

/// Route handled by the gateway, used as a metric label.
///
/// # Invariants
/// - Closed set; labels never carry request data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteLabel {
    /// Single authorization check.
    Authorize,
    /// Batched permission listing.
    Permissions,
    /// Candidate deletion.
    DeleteCandidate,
    /// Directory attribute update.
    UpdateAttributes,
    /// Liveness probe.
    Health,
    /// Readiness probe.
    Ready,
}

impl RouteLabel {
    /// Returns the stable label string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Authorize => "authorize",
            Self::Permissions => "permissions",
            Self::DeleteCandidate => "delete_candidate",
            Self::UpdateAttributes => "update_attributes",
            Self::Health => "health",
            Self::Ready => "ready",
        }
    }
}

/// Request outcome class, used as a metric label.
///
/// # Invariants
/// - Mirrors the error taxonomy; one label per status class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Request succeeded.
    Ok,
    /// Credentials were missing or unusable.
    Unauthenticated,
    /// Policy decision was not ALLOW.
    Forbidden,
    /// Request body or parameters were malformed.
    InvalidInput,
    /// Internal or external-service failure.
    Error,
}

impl RequestOutcome {
    /// Returns the stable label string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::InvalidInput => "invalid_input",
            Self::Error => "error",
        }
    }
}

/// One counted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestMetricEvent {
    /// Route that handled the request.
    pub route: RouteLabel,
    /// Outcome class of the request.
    pub outcome: RequestOutcome,
}

// ============================================================================
// SECTION: Recorder Seam
// ============================================================================

/// Metrics recording seam for the gateway.
///
/// # Invariants
/// - Implementations must be non-blocking and infallible.
pub trait GatewayMetrics: Send + Sync {
    /// Records one completed request.
    fn record_request(&self, event: RequestMetricEvent);

    /// Records the wall-clock latency of one request.
    fn record_latency(&self, route: RouteLabel, elapsed: Duration);
}

/// Recorder that drops all telemetry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGatewayMetrics;

impl GatewayMetrics for NoopGatewayMetrics {
    fn record_request(&self, _event: RequestMetricEvent) {}

    fn record_latency(&self, _route: RouteLabel, _elapsed: Duration) {}
}
