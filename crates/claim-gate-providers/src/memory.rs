// crates/claim-gate-providers/src/memory.rs
// ============================================================================
// Module: In-Memory Test Doubles
// Description: Static policy tables and recording directory for tests.
// Purpose: Substitute external collaborators behind the core interfaces.
// Dependencies: claim-gate-core
// ============================================================================

//! ## Overview
//! In-memory implementations of the core interfaces, used wherever tests
//! need deterministic decisions without a network: a static decision table
//! keyed by principal/action/resource with a configurable default, and a
//! recording directory that captures writes and can inject failures.
//! Invariants:
//! - Lookups are deterministic; repeated identical queries yield identical
//!   decisions.
//! - Batch evaluation visits every request without deduplication.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use claim_gate_core::AttributeUpdate;
use claim_gate_core::AuthorizationBatch;
use claim_gate_core::AuthorizationQuery;
use claim_gate_core::BatchDecisionItem;
use claim_gate_core::Decision;
use claim_gate_core::DirectoryError;
use claim_gate_core::DirectoryService;
use claim_gate_core::DirectoryUsername;
use claim_gate_core::PolicyDecisionPoint;
use claim_gate_core::PolicyError;

// ============================================================================
// SECTION: Static Policy Client
// ============================================================================

/// Decision table key: principal, action, and resource identifiers.
type DecisionKey = (String, String, String);

/// Policy decision point backed by a static decision table.
///
/// # Invariants
/// - Entries are matched on exact principal/action/resource identifiers.
/// - Unmatched queries receive the configured default decision.
#[derive(Debug)]
pub struct StaticPolicyClient {
    /// Explicit decisions keyed by principal/action/resource.
    decisions: BTreeMap<DecisionKey, Decision>,
    /// Decision returned when no entry matches.
    default: Decision,
    /// Error injected on every call when set.
    fail_with: Option<String>,
}

impl StaticPolicyClient {
    /// Creates a client that answers `default` for every unmatched query.
    #[must_use]
    pub const fn new(default: Decision) -> Self {
        Self {
            decisions: BTreeMap::new(),
            default,
            fail_with: None,
        }
    }

    /// Creates a client that fails every call with a transport error.
    #[must_use]
    pub const fn failing(message: String) -> Self {
        Self {
            decisions: BTreeMap::new(),
            default: Decision::Deny,
            fail_with: Some(message),
        }
    }

    /// Adds an explicit decision for a principal/action/resource triple.
    #[must_use]
    pub fn with_decision(
        mut self,
        principal: &str,
        action: &str,
        resource: &str,
        decision: Decision,
    ) -> Self {
        self.decisions
            .insert((principal.to_string(), action.to_string(), resource.to_string()), decision);
        self
    }

    /// Looks up the decision for one identifier triple.
    fn decide(&self, principal: &str, action: &str, resource: &str) -> Decision {
        self.decisions
            .get(&(principal.to_string(), action.to_string(), resource.to_string()))
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}

#[async_trait]
impl PolicyDecisionPoint for StaticPolicyClient {
    async fn is_authorized(&self, query: &AuthorizationQuery) -> Result<Decision, PolicyError> {
        if let Some(message) = &self.fail_with {
            return Err(PolicyError::Transport(message.clone()));
        }
        Ok(self.decide(
            &query.principal.entity_id,
            query.action.action_id.as_str(),
            &query.resource.entity_id,
        ))
    }

    async fn batch_is_authorized(
        &self,
        batch: &AuthorizationBatch,
    ) -> Result<Vec<BatchDecisionItem>, PolicyError> {
        if let Some(message) = &self.fail_with {
            return Err(PolicyError::Transport(message.clone()));
        }
        Ok(batch
            .requests
            .iter()
            .map(|request| BatchDecisionItem {
                action: request.action.action_id.clone(),
                decision: self.decide(
                    &request.principal.entity_id,
                    request.action.action_id.as_str(),
                    &request.resource.entity_id,
                ),
            })
            .collect())
    }
}

// ============================================================================
// SECTION: Recording Directory Client
// ============================================================================

/// Directory service that records writes in memory.
///
/// # Invariants
/// - Writes are recorded only when the injected failure is absent.
#[derive(Debug, Default)]
pub struct RecordingDirectoryClient {
    /// Captured writes in call order.
    updates: Mutex<Vec<(DirectoryUsername, AttributeUpdate)>>,
    /// Error injected on every call when set.
    fail_with: Option<String>,
}

impl RecordingDirectoryClient {
    /// Creates a recording client that accepts every write.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client that fails every write with a transport error.
    #[must_use]
    pub const fn failing(message: String) -> Self {
        Self {
            updates: Mutex::new(Vec::new()),
            fail_with: Some(message),
        }
    }

    /// Returns the captured writes in call order.
    #[must_use]
    pub fn updates(&self) -> Vec<(DirectoryUsername, AttributeUpdate)> {
        self.updates.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DirectoryService for RecordingDirectoryClient {
    async fn update_attributes(
        &self,
        username: &DirectoryUsername,
        update: &AttributeUpdate,
    ) -> Result<(), DirectoryError> {
        if let Some(message) = &self.fail_with {
            return Err(DirectoryError::Transport(message.clone()));
        }
        if let Ok(mut guard) = self.updates.lock() {
            guard.push((username.clone(), update.clone()));
        }
        Ok(())
    }
}
