// crates/claim-gate-config/src/lib.rs
// ============================================================================
// Module: Claim Gate Config
// Description: Canonical configuration model, loading, and validation.
// Purpose: Provide fail-closed configuration for the authorization gateway.
// Dependencies: claim-gate-core, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration for the gateway: server bind settings, policy decision
//! service endpoint and store, directory endpoint, and token handling.
//! Loading reads a TOML file with strict input guards, then applies
//! `CLAIM_GATE_*` environment overrides. Validation fails closed: empty
//! store identifiers, empty action lists, cleartext endpoints, and zero
//! timeouts are rejected.
//!
//! Security posture: configuration selects trust-sensitive behavior (token
//! verification, directory write gating); defaults prefer the strict side.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod model;
mod validate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use model::AuthConfig;
pub use model::ClaimGateConfig;
pub use model::ConfigError;
pub use model::DirectoryConfig;
pub use model::PolicyServiceConfig;
pub use model::ServerConfig;
pub use model::VerificationMode;
