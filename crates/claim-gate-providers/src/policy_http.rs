// crates/claim-gate-providers/src/policy_http.rs
// ============================================================================
// Module: HTTP Policy Decision Client
// Description: Policy decision point backed by an HTTP decision service.
// Purpose: Submit single and batched authorization queries over HTTP.
// Dependencies: claim-gate-core, reqwest, serde, url
// ============================================================================

//! ## Overview
//! [`HttpPolicyClient`] submits authorization queries to the external policy
//! decision service as JSON and maps responses into [`Decision`] values.
//! Batch submissions are one network call; results are correlated back to
//! their originating actions by the service's echoed request metadata.
//! Invariants:
//! - Redirects are not followed.
//! - Cleartext endpoints are rejected unless configured otherwise.
//! - Non-success statuses and undecodable bodies fail closed as errors.
//! - No retries; a failure surfaces immediately to the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use claim_gate_core::ActionRef;
use claim_gate_core::AuthorizationBatch;
use claim_gate_core::AuthorizationQuery;
use claim_gate_core::BatchDecisionItem;
use claim_gate_core::Decision;
use claim_gate_core::PolicyDecisionPoint;
use claim_gate_core::PolicyError;
use reqwest::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use url::Url;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP policy decision client.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` endpoints.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpPolicyClientConfig {
    /// Base URL of the policy decision service.
    pub endpoint: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpPolicyClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_ms: 5_000,
            allow_http: false,
            user_agent: "claim-gate/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Wire Shapes
// ============================================================================

/// Response body for a single authorization query.
#[derive(Debug, Deserialize)]
struct IsAuthorizedResponse {
    /// Decision returned by the service.
    decision: Decision,
}

/// Response body for a batched authorization query.
#[derive(Debug, Deserialize)]
struct BatchIsAuthorizedResponse {
    /// Per-request results in submission order.
    results: Vec<BatchResultEntry>,
}

/// One entry in a batch response.
#[derive(Debug, Deserialize)]
struct BatchResultEntry {
    /// Echo of the originating request, used for correlation.
    request: Option<BatchResultRequest>,
    /// Decision for the request.
    decision: Decision,
}

/// Echoed request metadata within a batch result.
#[derive(Debug, Deserialize)]
struct BatchResultRequest {
    /// Action the result applies to.
    action: Option<ActionRef>,
}

// ============================================================================
// SECTION: Client Implementation
// ============================================================================

/// Policy decision point backed by an HTTP decision service.
///
/// # Invariants
/// - Built once at startup and shared across requests; holds no per-request
///   state beyond the pooled connections inside [`Client`].
#[derive(Debug, Clone)]
pub struct HttpPolicyClient {
    /// Validated base endpoint for the decision service.
    endpoint: Url,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpPolicyClient {
    /// Creates a new HTTP policy client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when the endpoint violates the scheme policy
    /// or the HTTP client cannot be constructed.
    pub fn new(config: &HttpPolicyClientConfig) -> Result<Self, PolicyError> {
        let endpoint = parse_endpoint(&config.endpoint, config.allow_http)
            .map_err(PolicyError::Transport)?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|_| PolicyError::Transport("http client build failed".to_string()))?;
        Ok(Self {
            endpoint,
            client,
        })
    }

    /// Resolves a request path against the base endpoint.
    fn request_url(&self, path: &str) -> Result<Url, PolicyError> {
        self.endpoint
            .join(path)
            .map_err(|err| PolicyError::Transport(format!("invalid request url: {err}")))
    }
}

#[async_trait]
impl PolicyDecisionPoint for HttpPolicyClient {
    async fn is_authorized(&self, query: &AuthorizationQuery) -> Result<Decision, PolicyError> {
        let url = self.request_url("v1/is-authorized")?;
        let response = self
            .client
            .post(url)
            .json(query)
            .send()
            .await
            .map_err(|err| PolicyError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PolicyError::Status {
                status: status.as_u16(),
            });
        }
        let body: IsAuthorizedResponse =
            response.json().await.map_err(|err| PolicyError::Decode(err.to_string()))?;
        Ok(body.decision)
    }

    async fn batch_is_authorized(
        &self,
        batch: &AuthorizationBatch,
    ) -> Result<Vec<BatchDecisionItem>, PolicyError> {
        let url = self.request_url("v1/batch-is-authorized")?;
        let response = self
            .client
            .post(url)
            .json(batch)
            .send()
            .await
            .map_err(|err| PolicyError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PolicyError::Status {
                status: status.as_u16(),
            });
        }
        let body: BatchIsAuthorizedResponse =
            response.json().await.map_err(|err| PolicyError::Decode(err.to_string()))?;
        // Results lacking an echoed action cannot be correlated and are
        // dropped, which denies by omission.
        Ok(body
            .results
            .into_iter()
            .filter_map(|entry| {
                entry.request.and_then(|request| request.action).map(|action| BatchDecisionItem {
                    action: action.action_id,
                    decision: entry.decision,
                })
            })
            .collect())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses and validates an endpoint URL against the cleartext policy.
pub(crate) fn parse_endpoint(endpoint: &str, allow_http: bool) -> Result<Url, String> {
    let url = Url::parse(endpoint).map_err(|err| format!("invalid endpoint url: {err}"))?;
    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        scheme => return Err(format!("unsupported endpoint scheme: {scheme}")),
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err("endpoint credentials are not allowed".to_string());
    }
    // Trailing-slash normalization keeps Url::join from swallowing the last
    // path segment.
    if url.path().ends_with('/') {
        Ok(url)
    } else {
        let mut normalized = url;
        normalized.set_path(&format!("{}/", normalized.path()));
        Ok(normalized)
    }
}
