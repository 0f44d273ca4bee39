// crates/claim-gate-providers/src/directory_http.rs
// ============================================================================
// Module: HTTP Directory Client
// Description: User directory client for administrative attribute writes.
// Purpose: Push the fixed attribute set to the external directory over HTTP.
// Dependencies: claim-gate-core, reqwest, serde, url
// ============================================================================

//! ## Overview
//! [`HttpDirectoryClient`] performs administrative attribute writes against
//! the external user directory. The write carries exactly the fixed
//! attribute set (department, status, location, time) for one username; no
//! attribute value validation is applied at this layer.
//! Invariants:
//! - Redirects are not followed and cleartext endpoints are rejected unless
//!   configured otherwise.
//! - Non-success statuses fail closed as errors; no retries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use claim_gate_core::AttributeUpdate;
use claim_gate_core::DirectoryError;
use claim_gate_core::DirectoryService;
use claim_gate_core::DirectoryUsername;
use reqwest::Client;
use reqwest::redirect::Policy;
use serde::Serialize;
use url::Url;

use crate::policy_http::parse_endpoint;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP directory client.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` endpoints.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpDirectoryClientConfig {
    /// Base URL of the directory service.
    pub endpoint: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// User agent string for outbound requests.
    pub user_agent: String,
    /// User pool the writes are scoped to.
    pub user_pool_id: String,
}

impl Default for HttpDirectoryClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_ms: 5_000,
            allow_http: false,
            user_agent: "claim-gate/0.1".to_string(),
            user_pool_id: String::new(),
        }
    }
}

// ============================================================================
// SECTION: Wire Shapes
// ============================================================================

/// Request body for an attribute write.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAttributesRequest<'a> {
    /// User pool the write is scoped to.
    user_pool_id: &'a str,
    /// Attribute set written verbatim.
    attributes: &'a AttributeUpdate,
}

// ============================================================================
// SECTION: Client Implementation
// ============================================================================

/// User directory client backed by an HTTP service.
///
/// # Invariants
/// - Built once at startup and shared across requests.
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    /// Validated base endpoint for the directory service.
    endpoint: Url,
    /// User pool the writes are scoped to.
    user_pool_id: String,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpDirectoryClient {
    /// Creates a new HTTP directory client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the endpoint violates the scheme
    /// policy or the HTTP client cannot be constructed.
    pub fn new(config: &HttpDirectoryClientConfig) -> Result<Self, DirectoryError> {
        let endpoint = parse_endpoint(&config.endpoint, config.allow_http)
            .map_err(DirectoryError::Transport)?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|_| DirectoryError::Transport("http client build failed".to_string()))?;
        Ok(Self {
            endpoint,
            user_pool_id: config.user_pool_id.clone(),
            client,
        })
    }
}

#[async_trait]
impl DirectoryService for HttpDirectoryClient {
    async fn update_attributes(
        &self,
        username: &DirectoryUsername,
        update: &AttributeUpdate,
    ) -> Result<(), DirectoryError> {
        let url = self
            .endpoint
            .join(&format!("v1/users/{}/attributes", username.as_str()))
            .map_err(|err| DirectoryError::Transport(format!("invalid request url: {err}")))?;
        let body = UpdateAttributesRequest {
            user_pool_id: &self.user_pool_id,
            attributes: update,
        };
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|err| DirectoryError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
