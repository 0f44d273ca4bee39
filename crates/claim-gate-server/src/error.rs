// crates/claim-gate-server/src/error.rs
// ============================================================================
// Module: Gateway Errors
// Description: Request error taxonomy and HTTP response mapping.
// Purpose: Map failure classes onto stable status codes and JSON bodies.
// Dependencies: axum, claim-gate-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Four failure classes cover every request: `Unauthenticated` (401),
//! `Forbidden` (403), `InvalidInput` (400), and `Internal` (500). External
//! service failures map to `Internal` with a best-effort message; callers
//! receive only `{"error": message}` bodies with no structured sub-codes.
//! Invariants:
//! - A missing subject claim is `Unauthenticated`, never `Forbidden`.
//! - Policy and directory failures surface immediately with no retries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use claim_gate_core::ClaimError;
use claim_gate_core::DirectoryError;
use claim_gate_core::PolicyError;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Error Taxonomy
// ============================================================================

/// Client-facing error body for missing credentials.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Client-facing error body for undecodable or subject-less tokens.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token";

/// Request error taxonomy for the gateway.
///
/// # Invariants
/// - Variants are stable for programmatic handling; the HTTP mapping in
///   [`IntoResponse`] is part of the external contract.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or unusable credentials; maps to 401.
    #[error("{0}")]
    Unauthenticated(String),
    /// Policy decision was not ALLOW; maps to 403.
    #[error("Forbidden")]
    Forbidden,
    /// Malformed request body or parameters; maps to 400.
    #[error("{0}")]
    InvalidInput(String),
    /// Any other failure, including external-service errors; maps to 500.
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the HTTP status for the error class.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

// ============================================================================
// SECTION: Conversions
// ============================================================================

impl From<ClaimError> for GatewayError {
    fn from(error: ClaimError) -> Self {
        match error {
            ClaimError::MissingSubject => Self::Unauthenticated(INVALID_TOKEN_MESSAGE.to_string()),
        }
    }
}

impl From<PolicyError> for GatewayError {
    fn from(error: PolicyError) -> Self {
        Self::Internal(error.to_string())
    }
}

impl From<DirectoryError> for GatewayError {
    fn from(error: DirectoryError) -> Self {
        Self::Internal(error.to_string())
    }
}
