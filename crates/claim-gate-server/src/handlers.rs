// crates/claim-gate-server/src/handlers.rs
// ============================================================================
// Module: Request Handlers
// Description: Gateway endpoint handlers and their request/response shapes.
// Purpose: Run the token/normalize/query/decide flow per endpoint.
// Dependencies: axum, claim-gate-core, serde, crate::auth, crate::state
// ============================================================================

//! ## Overview
//! Each endpoint follows the same flow: extract and decode the bearer
//! token, normalize claims, build the authorization query, await the policy
//! decision, and map it onto an HTTP outcome. The flows differ only in the
//! (action, resource) pair and in what happens on ALLOW.
//! Invariants:
//! - Authentication failures return 401 before any outbound call is made.
//! - Only an exact ALLOW decision produces a success response; everything
//!   else is 403.
//! - Every decision acted on is offered to the audit sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::Path;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::response::Response;
use claim_gate_core::ActionId;
use claim_gate_core::AttributeUpdate;
use claim_gate_core::AuthorizationQuery;
use claim_gate_core::Decision;
use claim_gate_core::DecisionAuditEvent;
use claim_gate_core::NormalizedClaims;
use claim_gate_core::PrincipalId;
use claim_gate_core::ResourceId;
use claim_gate_core::allowed_actions;
use claim_gate_core::normalize_claims;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::auth::TokenDecodeError;
use crate::auth::bearer_token;
use crate::error::GatewayError;
use crate::error::INVALID_TOKEN_MESSAGE;
use crate::error::UNAUTHORIZED_MESSAGE;
use crate::state::AppState;
use crate::telemetry::RequestMetricEvent;
use crate::telemetry::RequestOutcome;
use crate::telemetry::RouteLabel;

// ============================================================================
// SECTION: Endpoint Defaults
// ============================================================================

/// Action evaluated when an authorize request names none.
const DEFAULT_ACTION: &str = "ReadCandidate";

/// Candidate evaluated when an authorize request names none.
const DEFAULT_CANDIDATE: &str = "candidate-123";

/// Action evaluated for candidate deletion.
const DELETE_ACTION: &str = "DeleteCandidate";

/// Action gating directory attribute writes.
const UPDATE_ATTRIBUTES_ACTION: &str = "UpdateUserAttributes";

// ============================================================================
// SECTION: Request And Response Shapes
// ============================================================================

/// Authorize endpoint request body; both fields are optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorizeRequest {
    /// Action to evaluate; defaults to the read action.
    pub action: Option<ActionId>,
    /// Candidate to evaluate against; defaults to the sample candidate.
    pub candidate_id: Option<ResourceId>,
}

/// Authorize endpoint success body.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeResponse {
    /// Always `true` on this path; denials never reach it.
    pub success: bool,
    /// Human-readable success summary.
    pub message: String,
    /// Decision returned by the policy service.
    pub decision: Decision,
}

/// Permissions endpoint success body.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionsResponse {
    /// Actions the principal is allowed, in configured evaluation order.
    pub permissions: Vec<ActionId>,
}

/// Delete endpoint success body.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Always `true` on this path; denials never reach it.
    pub success: bool,
    /// Human-readable success summary.
    pub message: String,
}

/// Attribute update request body; absent fields write empty strings.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UpdateAttributesRequest {
    /// Department attribute value.
    pub department: String,
    /// Status attribute value.
    pub status: String,
    /// Location attribute value.
    pub location: String,
    /// Time-window attribute value.
    pub time: String,
}

/// Attribute update success body.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateAttributesResponse {
    /// Human-readable success summary.
    pub message: String,
}

// ============================================================================
// SECTION: Shared Flow
// ============================================================================

/// Extracts, decodes, and normalizes the caller's bearer token.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<NormalizedClaims, GatewayError> {
    let token = bearer_token(headers).map_err(unauthenticated)?;
    let raw = state.decoder.decode(token).map_err(unauthenticated)?;
    Ok(normalize_claims(&raw)?)
}

/// Maps token failures onto the client-facing 401 bodies.
fn unauthenticated(error: TokenDecodeError) -> GatewayError {
    match error {
        TokenDecodeError::MissingHeader => {
            GatewayError::Unauthenticated(UNAUTHORIZED_MESSAGE.to_string())
        }
        TokenDecodeError::Undecodable(_) => {
            GatewayError::Unauthenticated(INVALID_TOKEN_MESSAGE.to_string())
        }
    }
}

/// Evaluates one query, audits the decision, and enforces exact ALLOW.
async fn decide(state: &AppState, query: &AuthorizationQuery) -> Result<Decision, GatewayError> {
    let decision = state.policy.is_authorized(query).await?;
    state.audit.record(&DecisionAuditEvent {
        principal: PrincipalId::new(query.principal.entity_id.clone()),
        action: query.action.action_id.clone(),
        resource: ResourceId::new(query.resource.entity_id.clone()),
        decision: decision.clone(),
    });
    if decision.is_allow() {
        Ok(decision)
    } else {
        Err(GatewayError::Forbidden)
    }
}

/// Records metrics for one finished request and produces the response.
fn finish<T>(
    state: &AppState,
    route: RouteLabel,
    started: Instant,
    result: Result<Json<T>, GatewayError>,
) -> Response
where
    T: Serialize,
{
    let outcome = match &result {
        Ok(_) => RequestOutcome::Ok,
        Err(GatewayError::Unauthenticated(_)) => RequestOutcome::Unauthenticated,
        Err(GatewayError::Forbidden) => RequestOutcome::Forbidden,
        Err(GatewayError::InvalidInput(_)) => RequestOutcome::InvalidInput,
        Err(GatewayError::Internal(_)) => RequestOutcome::Error,
    };
    state.metrics.record_request(RequestMetricEvent {
        route,
        outcome,
    });
    state.metrics.record_latency(route, started.elapsed());
    match result {
        Ok(body) => body.into_response(),
        Err(error) => error.into_response(),
    }
}

/// Accepts a parsed JSON body, rejecting malformed payloads as 400.
fn accept_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, GatewayError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(GatewayError::InvalidInput(rejection.body_text())),
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `POST /api/authorize`: single authorization check.
pub async fn handle_authorize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<AuthorizeRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let result = authorize_inner(&state, &headers, body).await;
    finish(&state, RouteLabel::Authorize, started, result)
}

/// Authorize flow, separated so the outer handler can record metrics.
async fn authorize_inner(
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Json<AuthorizeRequest>, JsonRejection>,
) -> Result<Json<AuthorizeResponse>, GatewayError> {
    let claims = authenticate(state, headers)?;
    let request = accept_body(body)?;
    let action = request.action.unwrap_or_else(|| ActionId::new(DEFAULT_ACTION));
    let candidate = request.candidate_id.unwrap_or_else(|| ResourceId::new(DEFAULT_CANDIDATE));
    let query = state.query_builder.single(&claims, &action, &candidate);
    let decision = decide(state, &query).await?;
    Ok(Json(AuthorizeResponse {
        success: true,
        message: format!("User {} authorized for {action}", claims.subject),
        decision,
    }))
}

/// `GET /api/permissions`: batched permission listing.
pub async fn handle_permissions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let result = permissions_inner(&state, &headers).await;
    finish(&state, RouteLabel::Permissions, started, result)
}

/// Permissions flow, separated so the outer handler can record metrics.
async fn permissions_inner(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Json<PermissionsResponse>, GatewayError> {
    let claims = authenticate(state, headers)?;
    let batch = state.query_builder.batch(
        &claims,
        &state.config.policy.actions,
        &state.config.policy.permission_resource_id,
    );
    let results = state.policy.batch_is_authorized(&batch).await?;
    for item in &results {
        state.audit.record(&DecisionAuditEvent {
            principal: claims.subject.clone(),
            action: item.action.clone(),
            resource: state.config.policy.permission_resource_id.clone(),
            decision: item.decision.clone(),
        });
    }
    Ok(Json(PermissionsResponse {
        permissions: allowed_actions(&results),
    }))
}

/// `DELETE /api/candidates/{id}`: candidate deletion behind a decision.
pub async fn handle_delete_candidate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let result = delete_candidate_inner(&state, &headers, id).await;
    finish(&state, RouteLabel::DeleteCandidate, started, result)
}

/// Delete flow, separated so the outer handler can record metrics.
async fn delete_candidate_inner(
    state: &AppState,
    headers: &HeaderMap,
    id: String,
) -> Result<Json<DeleteResponse>, GatewayError> {
    let claims = authenticate(state, headers)?;
    if id.is_empty() {
        return Err(GatewayError::InvalidInput("candidate id must not be empty".to_string()));
    }
    let candidate = ResourceId::new(id);
    let query = state.query_builder.single(&claims, &ActionId::new(DELETE_ACTION), &candidate);
    decide(state, &query).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: format!("Candidate {candidate} deleted by user {}", claims.subject),
    }))
}

/// `POST /api/user-attributes`: gated directory attribute write.
pub async fn handle_update_attributes(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<UpdateAttributesRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let result = update_attributes_inner(&state, &headers, body).await;
    finish(&state, RouteLabel::UpdateAttributes, started, result)
}

/// Attribute update flow, separated so the outer handler can record metrics.
async fn update_attributes_inner(
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Json<UpdateAttributesRequest>, JsonRejection>,
) -> Result<Json<UpdateAttributesResponse>, GatewayError> {
    let claims = authenticate(state, headers)?;
    let request = accept_body(body)?;
    if state.config.auth.require_authz_for_directory_writes {
        let query =
            state.query_builder.single_self(&claims, &ActionId::new(UPDATE_ATTRIBUTES_ACTION));
        decide(state, &query).await?;
    }
    let update = AttributeUpdate {
        department: request.department,
        status: request.status,
        location: request.location,
        time: request.time,
    };
    state.directory.update_attributes(&claims.username, &update).await?;
    Ok(Json(UpdateAttributesResponse {
        message: "Attributes updated successfully".to_string(),
    }))
}

/// `GET /health`: liveness probe.
pub async fn handle_health(State(state): State<Arc<AppState>>) -> Response {
    let started = Instant::now();
    let body: Result<Json<Value>, GatewayError> = Ok(Json(json!({"status": "ok"})));
    finish(&state, RouteLabel::Health, started, body)
}

/// `GET /ready`: readiness probe.
pub async fn handle_ready(State(state): State<Arc<AppState>>) -> Response {
    let started = Instant::now();
    let body: Result<Json<Value>, GatewayError> = Ok(Json(json!({"status": "ready"})));
    finish(&state, RouteLabel::Ready, started, body)
}

#[cfg(test)]
mod tests;
