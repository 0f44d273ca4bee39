// crates/claim-gate-config/src/model.rs
// ============================================================================
// Module: Config Model
// Description: Typed configuration sections, defaults, loading, and overrides.
// Purpose: Define the configuration surface consumed by the gateway.
// Dependencies: claim-gate-core, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! The configuration model mirrors the gateway's collaborators: one section
//! per external service plus the inbound server and token-handling sections.
//! Defaults reproduce the observed deployment (candidate policy store,
//! four-action permission list) while keeping trust-sensitive toggles strict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use claim_gate_core::ActionId;
use claim_gate_core::PolicyStoreId;
use claim_gate_core::ResourceId;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Load Guards
// ============================================================================

/// Maximum accepted config path length in bytes.
const MAX_CONFIG_PATH_BYTES: usize = 4_096;

/// Maximum accepted config path component length in bytes.
const MAX_PATH_COMPONENT_BYTES: usize = 255;

/// Maximum accepted config file size in bytes.
const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576;

// ============================================================================
// SECTION: Environment Overrides
// ============================================================================

/// Environment override for the policy service endpoint.
pub const ENV_POLICY_ENDPOINT: &str = "CLAIM_GATE_POLICY_ENDPOINT";

/// Environment override for the policy store identifier.
pub const ENV_POLICY_STORE_ID: &str = "CLAIM_GATE_POLICY_STORE_ID";

/// Environment override for the directory service endpoint.
pub const ENV_DIRECTORY_ENDPOINT: &str = "CLAIM_GATE_DIRECTORY_ENDPOINT";

/// Environment override for the server bind address.
pub const ENV_BIND_ADDR: &str = "CLAIM_GATE_BIND_ADDR";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read or failed an input guard.
    #[error("config load failed: {0}")]
    Load(String),
    /// Config file could not be parsed as TOML.
    #[error("config parse failed: {0}")]
    Parse(String),
    /// Config contents failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// Inbound HTTP server settings.
///
/// # Invariants
/// - `bind` must parse as a socket address at validation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    pub bind: String,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Policy decision service settings.
///
/// # Invariants
/// - `store_id` and `actions` must be non-empty at validation time.
/// - Cleartext endpoints require `allow_http`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PolicyServiceConfig {
    /// Base URL of the policy decision service.
    pub endpoint: String,
    /// Policy store evaluated against.
    pub store_id: PolicyStoreId,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Allow cleartext HTTP endpoints (disabled by default).
    pub allow_http: bool,
    /// Schema namespace prefixed onto entity and action types.
    pub schema_namespace: String,
    /// Ordered action list evaluated by the permissions endpoint.
    pub actions: Vec<ActionId>,
    /// Fixed resource the permissions endpoint evaluates against.
    pub permission_resource_id: ResourceId,
}

impl Default for PolicyServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://localhost:8443".to_string(),
            store_id: PolicyStoreId::new(""),
            timeout_ms: 5_000,
            allow_http: false,
            schema_namespace: "JobApp".to_string(),
            actions: vec![
                ActionId::new("ReadCandidate"),
                ActionId::new("CreateCandidate"),
                ActionId::new("UpdateCandidate"),
                ActionId::new("DeleteCandidate"),
            ],
            permission_resource_id: ResourceId::new("12"),
        }
    }
}

/// User directory settings.
///
/// # Invariants
/// - Cleartext endpoints require `allow_http`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DirectoryConfig {
    /// Base URL of the directory service.
    pub endpoint: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Allow cleartext HTTP endpoints (disabled by default).
    pub allow_http: bool,
    /// User pool the directory writes are scoped to.
    pub user_pool_id: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://localhost:8444".to_string(),
            timeout_ms: 5_000,
            allow_http: false,
            user_pool_id: String::new(),
        }
    }
}

/// Token verification mode.
///
/// # Invariants
/// - `Structural` reproduces the observed behavior (decode without
///   signature or expiry checks); `Rs256` is the hardened mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case", deny_unknown_fields)]
pub enum VerificationMode {
    /// Structural decoding only; no signature or expiry enforcement.
    Structural,
    /// RS256 signature and expiry verification against a published key.
    Rs256 {
        /// Path to the identity provider's RSA public key (PEM).
        public_key_pem_path: PathBuf,
        /// Expected issuer; unchecked when absent.
        issuer: Option<String>,
        /// Expected audience; unchecked when absent.
        audience: Option<String>,
    },
}

/// Token handling and write-gating settings.
///
/// # Invariants
/// - `require_authz_for_directory_writes` defaults to `true`; the
///   permissive mode exists only to reproduce the observed behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AuthConfig {
    /// Token verification mode.
    pub verification: VerificationMode,
    /// Require a passing authorization query before directory writes.
    pub require_authz_for_directory_writes: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            verification: VerificationMode::Structural,
            require_authz_for_directory_writes: true,
        }
    }
}

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Root gateway configuration.
///
/// # Invariants
/// - `validate` must pass before the configuration is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ClaimGateConfig {
    /// Inbound HTTP server settings.
    pub server: ServerConfig,
    /// Policy decision service settings.
    pub policy: PolicyServiceConfig,
    /// User directory settings.
    pub directory: DirectoryConfig,
    /// Token handling settings.
    pub auth: AuthConfig,
}

impl ClaimGateConfig {
    /// Loads configuration from an optional TOML file, applies environment
    /// overrides, and validates the result.
    ///
    /// With no path, defaults plus environment overrides are used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, parsing, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_toml_str(&read_config_file(path)?)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the TOML is malformed.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies `CLAIM_GATE_*` environment overrides in place.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = env::var(ENV_POLICY_ENDPOINT) {
            self.policy.endpoint = endpoint;
        }
        if let Ok(store_id) = env::var(ENV_POLICY_STORE_ID) {
            self.policy.store_id = PolicyStoreId::new(store_id);
        }
        if let Ok(endpoint) = env::var(ENV_DIRECTORY_ENDPOINT) {
            self.directory.endpoint = endpoint;
        }
        if let Ok(bind) = env::var(ENV_BIND_ADDR) {
            self.server.bind = bind;
        }
    }
}

// ============================================================================
// SECTION: File Guards
// ============================================================================

/// Reads a config file with strict path, size, and encoding guards.
fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    if path.as_os_str().len() > MAX_CONFIG_PATH_BYTES {
        return Err(ConfigError::Load("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_BYTES {
            return Err(ConfigError::Load("config path component too long".to_string()));
        }
    }
    let metadata = fs::metadata(path)
        .map_err(|err| ConfigError::Load(format!("config file not readable: {err}")))?;
    if metadata.len() > MAX_CONFIG_FILE_BYTES {
        return Err(ConfigError::Load("config file exceeds size limit".to_string()));
    }
    let bytes = fs::read(path)
        .map_err(|err| ConfigError::Load(format!("config file not readable: {err}")))?;
    String::from_utf8(bytes).map_err(|_| ConfigError::Load("config file must be utf-8".to_string()))
}
