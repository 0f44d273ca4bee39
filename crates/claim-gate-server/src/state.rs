// crates/claim-gate-server/src/state.rs
// ============================================================================
// Module: Application State
// Description: Shared per-process state handed to every request handler.
// Purpose: Hold configuration, the query builder, and backend seams.
// Dependencies: claim-gate-core, claim-gate-config
// ============================================================================

//! ## Overview
//! All handler collaborators live behind one shared state value: validated
//! configuration, a query builder fixed to the configured store and
//! namespace, the token decoder, and trait objects for the policy service,
//! directory, metrics, and audit sinks. Handlers only read from it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use claim_gate_config::ClaimGateConfig;
use claim_gate_core::DecisionAuditSink;
use claim_gate_core::DirectoryService;
use claim_gate_core::PolicyDecisionPoint;
use claim_gate_core::QueryBuilder;

use crate::auth::TokenDecoder;
use crate::telemetry::GatewayMetrics;

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared application state.
///
/// # Invariants
/// - Constructed once at startup from validated configuration; handlers
///   never mutate it.
pub struct AppState {
    /// Validated gateway configuration.
    pub config: ClaimGateConfig,
    /// Query builder fixed to the configured store and namespace.
    pub query_builder: QueryBuilder,
    /// Policy decision service.
    pub policy: Arc<dyn PolicyDecisionPoint>,
    /// User directory for attribute writes.
    pub directory: Arc<dyn DirectoryService>,
    /// Bearer token decoder.
    pub decoder: TokenDecoder,
    /// Request metrics recorder.
    pub metrics: Arc<dyn GatewayMetrics>,
    /// Decision audit sink.
    pub audit: Arc<dyn DecisionAuditSink>,
}

impl AppState {
    /// Builds state from validated configuration and backend seams.
    #[must_use]
    pub fn new(
        config: ClaimGateConfig,
        policy: Arc<dyn PolicyDecisionPoint>,
        directory: Arc<dyn DirectoryService>,
        decoder: TokenDecoder,
        metrics: Arc<dyn GatewayMetrics>,
        audit: Arc<dyn DecisionAuditSink>,
    ) -> Self {
        let query_builder =
            QueryBuilder::new(config.policy.store_id.clone(), config.policy.schema_namespace.clone());
        Self {
            config,
            query_builder,
            policy,
            directory,
            decoder,
            metrics,
            audit,
        }
    }
}
