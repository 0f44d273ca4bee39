// crates/claim-gate-core/src/claims.rs
// ============================================================================
// Module: Claim Normalizer
// Description: Raw token claim mapping and normalized principal claims.
// Purpose: Normalize untyped claims into a deterministic principal shape.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The claim normalizer turns a raw decoded claim mapping into a typed
//! principal shape: subject, email, a deduplicated group set, and the fixed
//! custom attribute bundle (department, status, location, time-window).
//! Group claims arrive in two source representations (a sequence of strings
//! or a single comma-delimited string) and normalize to the same set.
//! Invariants:
//! - A missing subject claim fails with [`ClaimError::MissingSubject`];
//!   callers must map this to an authentication failure.
//! - Group normalization is order-insensitive and removes duplicates.
//! - Absent custom attributes default to the empty string.
//!
//! Security posture: claims are untrusted input; decoding is structural only
//! and signature/expiry checks belong to the server boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::identifiers::DirectoryUsername;
use crate::identifiers::GroupName;
use crate::identifiers::PrincipalId;

// ============================================================================
// SECTION: Claim Names
// ============================================================================

/// Subject claim name.
pub const SUBJECT_CLAIM: &str = "sub";

/// Email claim name.
pub const EMAIL_CLAIM: &str = "email";

/// Group claim names probed in order; the first present claim wins.
pub const GROUP_CLAIMS: &[&str] = &["cognito:groups", "groups"];

/// Directory username claim name; falls back to the subject when absent.
pub const USERNAME_CLAIM: &str = "cognito:username";

/// Prefix for custom attribute claims.
pub const CUSTOM_CLAIM_PREFIX: &str = "custom:";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Claim normalization errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimError {
    /// The token carried no subject claim.
    #[error("token has no subject claim")]
    MissingSubject,
}

// ============================================================================
// SECTION: Raw Claims
// ============================================================================

/// Raw decoded claim mapping, untyped beyond JSON structure.
///
/// # Invariants
/// - Values are held verbatim as decoded; no validation is applied here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawClaims(Map<String, Value>);

impl RawClaims {
    /// Wraps a decoded JSON object as a raw claim mapping.
    #[must_use]
    pub const fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    /// Returns the value of a claim by name, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns a claim's string value, if present and a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Returns a custom attribute claim, accepting both the lowercase and
    /// capitalized spellings observed in issued tokens (`custom:status` and
    /// `custom:Status`).
    #[must_use]
    pub fn get_custom(&self, attribute: &str) -> Option<&str> {
        let lower = format!("{CUSTOM_CLAIM_PREFIX}{attribute}");
        if let Some(value) = self.get_str(&lower) {
            return Some(value);
        }
        let mut capitalized = String::with_capacity(attribute.len());
        let mut chars = attribute.chars();
        if let Some(first) = chars.next() {
            capitalized.extend(first.to_uppercase());
            capitalized.push_str(chars.as_str());
        }
        self.get_str(&format!("{CUSTOM_CLAIM_PREFIX}{capitalized}"))
    }
}

impl From<Map<String, Value>> for RawClaims {
    fn from(values: Map<String, Value>) -> Self {
        Self::new(values)
    }
}

// ============================================================================
// SECTION: Normalized Claims
// ============================================================================

/// Fixed custom attribute bundle attached to principal entities.
///
/// # Invariants
/// - Absent source claims are represented as empty strings, never `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAttributes {
    /// Department attribute.
    pub department: String,
    /// Status attribute.
    pub status: String,
    /// Location attribute.
    pub location: String,
    /// Time-window attribute.
    pub time: String,
}

/// Normalized principal claims derived from a raw claim mapping.
///
/// # Invariants
/// - `subject` is always present; construction fails otherwise.
/// - `groups` is deduplicated and deterministic in iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedClaims {
    /// Principal identity (the subject claim, verbatim).
    pub subject: PrincipalId,
    /// Email claim, empty when absent.
    pub email: String,
    /// Deduplicated group membership set.
    pub groups: BTreeSet<GroupName>,
    /// Custom attribute bundle with empty-string defaults.
    pub attributes: CustomAttributes,
    /// Directory username, falling back to the subject when absent.
    pub username: DirectoryUsername,
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Normalizes a raw claim mapping into typed principal claims.
///
/// # Errors
///
/// Returns [`ClaimError::MissingSubject`] when no subject claim is present.
pub fn normalize_claims(raw: &RawClaims) -> Result<NormalizedClaims, ClaimError> {
    let subject = raw.get_str(SUBJECT_CLAIM).ok_or(ClaimError::MissingSubject)?;
    let groups_value = GROUP_CLAIMS.iter().find_map(|claim| raw.get(claim));
    let username = raw.get_str(USERNAME_CLAIM).unwrap_or(subject);
    Ok(NormalizedClaims {
        subject: PrincipalId::new(subject),
        email: raw.get_str(EMAIL_CLAIM).unwrap_or_default().to_string(),
        groups: normalize_groups(groups_value),
        attributes: CustomAttributes {
            department: raw.get_custom("department").unwrap_or_default().to_string(),
            status: raw.get_custom("status").unwrap_or_default().to_string(),
            location: raw.get_custom("location").unwrap_or_default().to_string(),
            time: raw.get_custom("time").unwrap_or_default().to_string(),
        },
        username: DirectoryUsername::new(username),
    })
}

/// Normalizes a group claim value into a deduplicated group set.
///
/// A sequence claim is used verbatim (non-string entries are skipped); a
/// single string claim is split on commas with each element trimmed; an
/// absent claim yields the empty set. Empty elements are dropped.
#[must_use]
pub fn normalize_groups(value: Option<&Value>) -> BTreeSet<GroupName> {
    match value {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(Value::as_str)
            .filter(|entry| !entry.is_empty())
            .map(GroupName::new)
            .collect(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(GroupName::new)
            .collect(),
        _ => BTreeSet::new(),
    }
}
