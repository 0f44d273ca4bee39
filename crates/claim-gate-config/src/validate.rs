// crates/claim-gate-config/src/validate.rs
// ============================================================================
// Module: Config Validation
// Description: Fail-closed validation of the gateway configuration.
// Purpose: Reject unusable or trust-degrading configuration before startup.
// Dependencies: crate::model
// ============================================================================

//! ## Overview
//! Validation runs once at load time and rejects configurations that would
//! make the gateway unusable (empty store id, empty action list, unparsable
//! bind address) or silently weaken trust (cleartext endpoints without an
//! explicit opt-in, zero timeouts, missing verification key files).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;

use crate::model::ClaimGateConfig;
use crate::model::ConfigError;
use crate::model::VerificationMode;

// ============================================================================
// SECTION: Validation
// ============================================================================

impl ClaimGateConfig {
    /// Validates the configuration, failing closed on unusable settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid("server bind must be a socket address".to_string()));
        }
        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Invalid("server max body bytes must be nonzero".to_string()));
        }
        if self.policy.store_id.as_str().is_empty() {
            return Err(ConfigError::Invalid("policy store id must not be empty".to_string()));
        }
        if self.policy.actions.is_empty() {
            return Err(ConfigError::Invalid("policy action list must not be empty".to_string()));
        }
        if self.policy.schema_namespace.is_empty() {
            return Err(ConfigError::Invalid("policy schema namespace must not be empty".to_string()));
        }
        if self.policy.timeout_ms == 0 {
            return Err(ConfigError::Invalid("policy timeout must be nonzero".to_string()));
        }
        validate_endpoint("policy endpoint", &self.policy.endpoint, self.policy.allow_http)?;
        if self.directory.timeout_ms == 0 {
            return Err(ConfigError::Invalid("directory timeout must be nonzero".to_string()));
        }
        validate_endpoint(
            "directory endpoint",
            &self.directory.endpoint,
            self.directory.allow_http,
        )?;
        if let VerificationMode::Rs256 {
            public_key_pem_path, ..
        } = &self.auth.verification
            && !public_key_pem_path.is_file()
        {
            return Err(ConfigError::Invalid(
                "verification public key file does not exist".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates an outbound endpoint URL scheme against the cleartext policy.
fn validate_endpoint(label: &str, endpoint: &str, allow_http: bool) -> Result<(), ConfigError> {
    if endpoint.is_empty() {
        return Err(ConfigError::Invalid(format!("{label} must not be empty")));
    }
    if endpoint.starts_with("https://") {
        return Ok(());
    }
    if endpoint.starts_with("http://") {
        if allow_http {
            return Ok(());
        }
        return Err(ConfigError::Invalid(format!(
            "{label} uses cleartext http without allow_http"
        )));
    }
    Err(ConfigError::Invalid(format!("{label} must be an http(s) url")))
}
