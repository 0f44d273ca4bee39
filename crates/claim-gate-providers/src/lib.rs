// crates/claim-gate-providers/src/lib.rs
// ============================================================================
// Module: Claim Gate Providers
// Description: Concrete collaborator clients for the authorization gateway.
// Purpose: Provide HTTP and in-memory policy/directory implementations.
// Dependencies: claim-gate-core, reqwest, serde, url
// ============================================================================

//! ## Overview
//! This crate ships the concrete implementations of the core interfaces: an
//! HTTP policy decision client, an HTTP directory client, and in-memory
//! doubles used by tests. The HTTP clients enforce a fail-closed transport
//! policy: redirects disabled, bounded timeouts, https required unless
//! explicitly allowed, and non-success statuses surfaced as errors with no
//! retries.
//! Invariants:
//! - A transport or status failure never degrades into an allow decision.
//! - Each request is independently evaluated; clients hold no decision state.
//!
//! Security posture: these clients act on behalf of untrusted callers;
//! endpoints and credentials come from validated configuration only.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod directory_http;
pub mod memory;
pub mod policy_http;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use directory_http::HttpDirectoryClient;
pub use directory_http::HttpDirectoryClientConfig;
pub use memory::RecordingDirectoryClient;
pub use memory::StaticPolicyClient;
pub use policy_http::HttpPolicyClient;
pub use policy_http::HttpPolicyClientConfig;
