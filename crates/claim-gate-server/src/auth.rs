// crates/claim-gate-server/src/auth.rs
// ============================================================================
// Module: Bearer Token Handling
// Description: Bearer extraction, structural decoding, and RS256 verification.
// Purpose: Turn the Authorization header into raw claims at the trust boundary.
// Dependencies: axum, base64, jsonwebtoken, serde_json, claim-gate-config
// ============================================================================

//! ## Overview
//! Token handling happens in two steps: extract the bearer credential from
//! the `Authorization` header, then decode it into a raw claim mapping. The
//! default mode decodes structurally (base64url payload, no signature or
//! expiry checks), reproducing the observed upstream behavior; the RS256
//! mode verifies signature and expiry against the identity provider's
//! published key.
//! Invariants:
//! - Extraction and decoding failures are authentication failures (401).
//! - Structural decoding never inspects the signature segment.
//!
//! Security posture: structural mode is a documented reproduction of a
//! known gap; deployments with provider keys should configure RS256.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use claim_gate_config::VerificationMode;
use claim_gate_core::RawClaims;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Token decoding errors; all map to authentication failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenDecodeError {
    /// No `Authorization` header was present.
    #[error("authorization header missing")]
    MissingHeader,
    /// The token could not be decoded or verified.
    #[error("token undecodable: {0}")]
    Undecodable(String),
}

/// Token decoder construction errors, surfaced at startup.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum TokenSetupError {
    /// The verification key file could not be read.
    #[error("verification key not readable: {0}")]
    KeyRead(String),
    /// The verification key file could not be parsed as an RSA PEM.
    #[error("verification key not parsable: {0}")]
    KeyParse(String),
}

// ============================================================================
// SECTION: Bearer Extraction
// ============================================================================

/// Extracts the bearer credential from the `Authorization` header.
///
/// The `Bearer ` prefix is stripped when present; otherwise the header value
/// is used verbatim, matching the observed upstream behavior.
///
/// # Errors
///
/// Returns [`TokenDecodeError::MissingHeader`] when the header is absent or
/// not valid UTF-8.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, TokenDecodeError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(TokenDecodeError::MissingHeader)?;
    Ok(value.strip_prefix("Bearer ").unwrap_or(value))
}

// ============================================================================
// SECTION: Token Decoder
// ============================================================================

/// Decodes bearer tokens into raw claim mappings.
///
/// # Invariants
/// - Built once at startup; decoding itself is stateless.
pub enum TokenDecoder {
    /// Structural decoding only; no signature or expiry enforcement.
    Structural,
    /// RS256 signature and expiry verification.
    Rs256 {
        /// Identity provider public key.
        key: Box<DecodingKey>,
        /// Claim validation rules (expiry, optional issuer and audience).
        validation: Box<Validation>,
    },
}

impl TokenDecoder {
    /// Builds a decoder from the configured verification mode.
    ///
    /// # Errors
    ///
    /// Returns [`TokenSetupError`] when RS256 key material cannot be loaded.
    pub fn from_mode(mode: &VerificationMode) -> Result<Self, TokenSetupError> {
        match mode {
            VerificationMode::Structural => Ok(Self::Structural),
            VerificationMode::Rs256 {
                public_key_pem_path,
                issuer,
                audience,
            } => {
                let pem = fs::read(public_key_pem_path)
                    .map_err(|err| TokenSetupError::KeyRead(err.to_string()))?;
                let key = DecodingKey::from_rsa_pem(&pem)
                    .map_err(|err| TokenSetupError::KeyParse(err.to_string()))?;
                let mut validation = Validation::new(Algorithm::RS256);
                if let Some(issuer) = issuer {
                    validation.set_issuer(&[issuer]);
                }
                match audience {
                    Some(audience) => validation.set_audience(&[audience]),
                    None => validation.validate_aud = false,
                }
                Ok(Self::Rs256 {
                    key: Box::new(key),
                    validation: Box::new(validation),
                })
            }
        }
    }

    /// Decodes a bearer token into raw claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenDecodeError::Undecodable`] when the token cannot be
    /// decoded (or, in RS256 mode, verified).
    pub fn decode(&self, token: &str) -> Result<RawClaims, TokenDecodeError> {
        match self {
            Self::Structural => decode_structural(token),
            Self::Rs256 {
                key,
                validation,
            } => {
                let data = jsonwebtoken::decode::<Value>(token, key, validation)
                    .map_err(|err| TokenDecodeError::Undecodable(err.to_string()))?;
                claims_object(data.claims)
            }
        }
    }
}

// ============================================================================
// SECTION: Structural Decoding
// ============================================================================

/// Decodes the payload segment of a compact JWS without verification.
fn decode_structural(token: &str) -> Result<RawClaims, TokenDecodeError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| TokenDecodeError::Undecodable("not a compact jws".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|err| TokenDecodeError::Undecodable(format!("payload not base64url: {err}")))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|err| TokenDecodeError::Undecodable(format!("payload not json: {err}")))?;
    claims_object(value)
}

/// Requires the decoded claims to be a JSON object.
fn claims_object(value: Value) -> Result<RawClaims, TokenDecodeError> {
    match value {
        Value::Object(map) => Ok(RawClaims::new(map)),
        _ => Err(TokenDecodeError::Undecodable("claims must be a json object".to_string())),
    }
}

/// Encodes a claim object as an unsigned compact JWS for test fixtures.
#[cfg(test)]
pub(crate) fn unsigned_token(claims: &serde_json::Map<String, Value>) -> String {
    let header = URL_SAFE_NO_PAD.encode(b"{\"alg\":\"none\",\"typ\":\"JWT\"}");
    let payload = URL_SAFE_NO_PAD.encode(Value::Object(claims.clone()).to_string());
    format!("{header}.{payload}.")
}
