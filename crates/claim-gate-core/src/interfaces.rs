// crates/claim-gate-core/src/interfaces.rs
// ============================================================================
// Module: Claim Gate Interfaces
// Description: Backend-agnostic interfaces for policy decisions and directory writes.
// Purpose: Define the contract surfaces used by the gateway runtime.
// Dependencies: async-trait, serde, thiserror, crate::query, crate::decision
// ============================================================================

//! ## Overview
//! Interfaces define how the gateway integrates with its external
//! collaborators (the policy decision service and the user directory)
//! without embedding backend-specific details. Implementations must be
//! deterministic for identical inputs and fail closed on transport errors.
//!
//! Security posture: interface implementations talk to external systems on
//! behalf of untrusted callers; no retries are attempted and failures
//! surface immediately.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::decision::BatchDecisionItem;
use crate::decision::Decision;
use crate::identifiers::ActionId;
use crate::identifiers::DirectoryUsername;
use crate::identifiers::PrincipalId;
use crate::identifiers::ResourceId;
use crate::query::AuthorizationBatch;
use crate::query::AuthorizationQuery;

// ============================================================================
// SECTION: Policy Decision Point
// ============================================================================

/// Policy decision service errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Transport-level failure reaching the policy service.
    #[error("policy service transport error: {0}")]
    Transport(String),
    /// The policy service returned a non-success status.
    #[error("policy service returned status {status}")]
    Status {
        /// HTTP status code returned by the service.
        status: u16,
    },
    /// The policy service response could not be decoded.
    #[error("policy service response decode failed: {0}")]
    Decode(String),
}

/// Backend-agnostic policy decision point.
#[async_trait]
pub trait PolicyDecisionPoint: Send + Sync {
    /// Evaluates a single authorization query.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when the decision cannot be obtained.
    async fn is_authorized(&self, query: &AuthorizationQuery) -> Result<Decision, PolicyError>;

    /// Evaluates a batched authorization query as one call.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when the batch cannot be evaluated.
    async fn batch_is_authorized(
        &self,
        batch: &AuthorizationBatch,
    ) -> Result<Vec<BatchDecisionItem>, PolicyError>;
}

// ============================================================================
// SECTION: Directory Service
// ============================================================================

/// User directory errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Transport-level failure reaching the directory.
    #[error("directory transport error: {0}")]
    Transport(String),
    /// The directory returned a non-success status.
    #[error("directory returned status {status}")]
    Status {
        /// HTTP status code returned by the directory.
        status: u16,
    },
}

/// Fixed attribute set written to the user directory.
///
/// Values are written verbatim; no format or range validation is applied.
///
/// # Invariants
/// - Exactly these four attributes are written, always together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeUpdate {
    /// Department attribute value.
    pub department: String,
    /// Status attribute value.
    pub status: String,
    /// Location attribute value.
    pub location: String,
    /// Time-window attribute value.
    pub time: String,
}

/// Backend-agnostic user directory for administrative attribute writes.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Writes the fixed attribute set for the given username.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the write fails.
    async fn update_attributes(
        &self,
        username: &DirectoryUsername,
        update: &AttributeUpdate,
    ) -> Result<(), DirectoryError>;
}

// ============================================================================
// SECTION: Decision Audit
// ============================================================================

/// Audit record for one policy decision.
///
/// # Invariants
/// - Events describe the decision only; recording them has no side effects
///   on the request outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionAuditEvent {
    /// Principal the decision applies to.
    pub principal: PrincipalId,
    /// Action that was evaluated.
    pub action: ActionId,
    /// Resource the action targeted.
    pub resource: ResourceId,
    /// Decision returned by the policy service.
    pub decision: Decision,
}

/// Audit sink for policy decisions.
pub trait DecisionAuditSink: Send + Sync {
    /// Records a decision event.
    fn record(&self, event: &DecisionAuditEvent);
}

/// No-op audit sink.
///
/// # Invariants
/// - Events are intentionally discarded.
pub struct NoopDecisionAuditSink;

impl DecisionAuditSink for NoopDecisionAuditSink {
    fn record(&self, _event: &DecisionAuditEvent) {}
}
