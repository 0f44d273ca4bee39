// crates/claim-gate-core/src/decision.rs
// ============================================================================
// Module: Decision Interpreter
// Description: Policy decision values and batch result filtering.
// Purpose: Interpret decision service responses with exact-ALLOW semantics.
// Dependencies: serde, crate::identifiers
// ============================================================================

//! ## Overview
//! Decisions arrive from the policy service as strings. Only the exact wire
//! value `ALLOW` grants access; `DENY`, unknown values, and absent results
//! all deny. There are no partial-allow or conditional-allow semantics.
//! Invariants:
//! - Unknown wire values deserialize to [`Decision::Other`] and fail closed.
//! - Batch filtering is deterministic for a given decision set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::identifiers::ActionId;

// ============================================================================
// SECTION: Decision
// ============================================================================

/// Wire value granting access.
const ALLOW_WIRE: &str = "ALLOW";

/// Wire value denying access.
const DENY_WIRE: &str = "DENY";

/// Policy decision for a single authorization query.
///
/// # Invariants
/// - Only [`Decision::Allow`] grants access; every other variant denies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The policy service allowed the request.
    Allow,
    /// The policy service denied the request.
    Deny,
    /// Any other wire value; treated as deny.
    Other(String),
}

impl Decision {
    /// Parses a wire decision value; unrecognized values map to `Other`.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value {
            ALLOW_WIRE => Self::Allow,
            DENY_WIRE => Self::Deny,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns true only for the exact allow decision.
    #[must_use]
    pub const fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns the stable wire label for the decision.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Allow => ALLOW_WIRE,
            Self::Deny => DENY_WIRE,
            Self::Other(value) => value.as_str(),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Decision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Decision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&value))
    }
}

// ============================================================================
// SECTION: Batch Results
// ============================================================================

/// One batch result, tagged by the originating action.
///
/// # Invariants
/// - `action` correlates the result back to the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDecisionItem {
    /// Action the decision applies to.
    pub action: ActionId,
    /// Decision for the action.
    pub decision: Decision,
}

/// Filters batch results down to the actions that were allowed.
///
/// The output follows result order, which matches the submitted action order,
/// so it is deterministic for a given decision set. Non-allow decisions are
/// dropped, not transformed.
#[must_use]
pub fn allowed_actions(results: &[BatchDecisionItem]) -> Vec<ActionId> {
    results
        .iter()
        .filter(|item| item.decision.is_allow())
        .map(|item| item.action.clone())
        .collect()
}
