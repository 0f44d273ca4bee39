// crates/claim-gate-core/src/lib.rs
// ============================================================================
// Module: Claim Gate Core
// Description: Claim normalization, authorization query model, and interfaces.
// Purpose: Provide the backend-agnostic core of the authorization gateway.
// Dependencies: serde, serde_json, thiserror, async-trait
// ============================================================================

//! ## Overview
//! This crate holds the reusable contract of the gateway: normalizing bearer
//! token claims into a principal identity, constructing single and batched
//! authorization queries for an external policy decision service, and
//! interpreting decisions with exact-ALLOW semantics. Everything here is
//! request-scoped and carries no state across invocations.
//! Invariants:
//! - A missing subject claim is an authentication failure, never an
//!   authorization failure.
//! - Only the exact wire decision `ALLOW` grants access; every other value
//!   fails closed.
//!
//! Security posture: token claims are untrusted input; decoding and
//! verification happen at the server boundary before this crate is reached.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod claims;
pub mod decision;
pub mod identifiers;
pub mod interfaces;
pub mod query;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use claims::ClaimError;
pub use claims::CustomAttributes;
pub use claims::NormalizedClaims;
pub use claims::RawClaims;
pub use claims::normalize_claims;
pub use claims::normalize_groups;
pub use decision::BatchDecisionItem;
pub use decision::Decision;
pub use decision::allowed_actions;
pub use identifiers::ActionId;
pub use identifiers::DirectoryUsername;
pub use identifiers::GroupName;
pub use identifiers::PolicyStoreId;
pub use identifiers::PrincipalId;
pub use identifiers::ResourceId;
pub use interfaces::AttributeUpdate;
pub use interfaces::DecisionAuditEvent;
pub use interfaces::DecisionAuditSink;
pub use interfaces::DirectoryError;
pub use interfaces::DirectoryService;
pub use interfaces::NoopDecisionAuditSink;
pub use interfaces::PolicyDecisionPoint;
pub use interfaces::PolicyError;
pub use query::ActionRef;
pub use query::AttributeValue;
pub use query::AuthorizationBatch;
pub use query::AuthorizationQuery;
pub use query::BatchRequestItem;
pub use query::Entity;
pub use query::EntityRef;
pub use query::QueryBuilder;
