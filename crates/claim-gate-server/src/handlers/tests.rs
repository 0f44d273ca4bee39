// crates/claim-gate-server/src/handlers/tests.rs
// ============================================================================
// Module: Handler Tests
// Description: Endpoint flow tests against in-memory backends.
// Purpose: Validate status mapping, gating, and decision handling.
// Dependencies: claim-gate-providers, tokio, tower
// ============================================================================

//! Endpoint behavior tests with in-memory policy and directory doubles.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Mutex;

use axum::body::Body;
use axum::body::to_bytes;
use axum::http::Request;
use axum::http::StatusCode;
use claim_gate_config::ClaimGateConfig;
use claim_gate_config::PolicyServiceConfig;
use claim_gate_core::PolicyStoreId;
use claim_gate_providers::RecordingDirectoryClient;
use claim_gate_providers::StaticPolicyClient;
use serde_json::Map;
use tower::ServiceExt;

use super::*;
use crate::auth::TokenDecoder;
use crate::auth::unsigned_token;
use crate::server::build_router;
use crate::telemetry::NoopGatewayMetrics;

/// Audit sink capturing events for assertions.
#[derive(Default)]
struct RecordingAuditSink {
    /// Captured events in record order.
    events: Mutex<Vec<DecisionAuditEvent>>,
}

impl claim_gate_core::DecisionAuditSink for RecordingAuditSink {
    fn record(&self, event: &DecisionAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

fn test_config() -> ClaimGateConfig {
    ClaimGateConfig {
        policy: PolicyServiceConfig {
            store_id: PolicyStoreId::new("store-1"),
            ..PolicyServiceConfig::default()
        },
        ..ClaimGateConfig::default()
    }
}

fn state_with(
    policy: StaticPolicyClient,
    directory: Arc<RecordingDirectoryClient>,
    config: ClaimGateConfig,
    audit: Arc<dyn claim_gate_core::DecisionAuditSink>,
) -> Arc<AppState> {
    Arc::new(AppState::new(
        config,
        Arc::new(policy),
        directory,
        TokenDecoder::Structural,
        Arc::new(NoopGatewayMetrics),
        audit,
    ))
}

fn default_state(policy: StaticPolicyClient) -> Arc<AppState> {
    state_with(
        policy,
        Arc::new(RecordingDirectoryClient::new()),
        test_config(),
        Arc::new(claim_gate_core::NoopDecisionAuditSink),
    )
}

fn token_for(claims: serde_json::Value) -> String {
    let serde_json::Value::Object(map) = claims else {
        panic!("claims literal must be an object");
    };
    unsigned_token(&map)
}

fn bearer_headers(claims: serde_json::Value) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let value = format!("Bearer {}", token_for(claims));
    headers.insert(
        axum::http::header::AUTHORIZATION,
        value.parse().expect("header value"),
    );
    headers
}

fn user_headers() -> HeaderMap {
    bearer_headers(json!({"sub": "u1", "cognito:groups": "admin"}))
}

fn body_of(request: AuthorizeRequest) -> Result<Json<AuthorizeRequest>, JsonRejection> {
    Ok(Json(request))
}

// ============================================================================
// SECTION: Authentication
// ============================================================================

#[tokio::test]
async fn missing_header_is_unauthenticated_without_outbound_calls() {
    let state = default_state(StaticPolicyClient::failing("must not be called".to_string()));
    let result =
        authorize_inner(&state, &HeaderMap::new(), body_of(AuthorizeRequest::default())).await;
    match result {
        Err(GatewayError::Unauthenticated(message)) => assert_eq!(message, "Unauthorized"),
        other => panic!("expected unauthenticated, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_token_is_unauthenticated() {
    let state = default_state(StaticPolicyClient::failing("must not be called".to_string()));
    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::AUTHORIZATION,
        "Bearer not-a-token".parse().expect("header value"),
    );
    let result = authorize_inner(&state, &headers, body_of(AuthorizeRequest::default())).await;
    match result {
        Err(GatewayError::Unauthenticated(message)) => assert_eq!(message, "Invalid token"),
        other => panic!("expected unauthenticated, got {other:?}"),
    }
}

#[tokio::test]
async fn token_without_subject_is_unauthenticated() {
    let state = default_state(StaticPolicyClient::failing("must not be called".to_string()));
    let headers = bearer_headers(json!({"email": "user@example.com"}));
    let result = authorize_inner(&state, &headers, body_of(AuthorizeRequest::default())).await;
    match result {
        Err(GatewayError::Unauthenticated(message)) => assert_eq!(message, "Invalid token"),
        other => panic!("expected unauthenticated, got {other:?}"),
    }
}

#[tokio::test]
async fn permissions_rejects_subjectless_tokens_without_outbound_calls() {
    let state = default_state(StaticPolicyClient::failing("must not be called".to_string()));
    let headers = bearer_headers(json!({"email": "user@example.com"}));
    let result = permissions_inner(&state, &headers).await;
    match result {
        Err(GatewayError::Unauthenticated(message)) => assert_eq!(message, "Invalid token"),
        other => panic!("expected unauthenticated, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_rejects_subjectless_tokens_without_outbound_calls() {
    let state = default_state(StaticPolicyClient::failing("must not be called".to_string()));
    let headers = bearer_headers(json!({"email": "user@example.com"}));
    let result = delete_candidate_inner(&state, &headers, "42".to_string()).await;
    match result {
        Err(GatewayError::Unauthenticated(message)) => assert_eq!(message, "Invalid token"),
        other => panic!("expected unauthenticated, got {other:?}"),
    }
}

#[tokio::test]
async fn update_rejects_subjectless_tokens_without_touching_backends() {
    let directory = Arc::new(RecordingDirectoryClient::failing("must not be called".to_string()));
    let state = state_with(
        StaticPolicyClient::failing("must not be called".to_string()),
        Arc::clone(&directory),
        test_config(),
        Arc::new(claim_gate_core::NoopDecisionAuditSink),
    );
    let headers = bearer_headers(json!({"email": "user@example.com"}));
    let result = update_attributes_inner(&state, &headers, update_body()).await;
    match result {
        Err(GatewayError::Unauthenticated(message)) => assert_eq!(message, "Invalid token"),
        other => panic!("expected unauthenticated, got {other:?}"),
    }
    assert!(directory.updates().is_empty());
}

#[tokio::test]
async fn bare_token_without_bearer_prefix_is_accepted() {
    let state = default_state(StaticPolicyClient::new(Decision::Allow));
    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::AUTHORIZATION,
        token_for(json!({"sub": "u1"})).parse().expect("header value"),
    );
    let result = authorize_inner(&state, &headers, body_of(AuthorizeRequest::default())).await;
    assert!(result.is_ok());
}

// ============================================================================
// SECTION: Authorize
// ============================================================================

#[tokio::test]
async fn authorize_allow_uses_defaults_and_reports_subject() {
    let policy = StaticPolicyClient::new(Decision::Deny).with_decision(
        "u1",
        "ReadCandidate",
        "candidate-123",
        Decision::Allow,
    );
    let state = default_state(policy);
    let Json(response) =
        authorize_inner(&state, &user_headers(), body_of(AuthorizeRequest::default()))
            .await
            .expect("authorize");
    assert!(response.success);
    assert_eq!(response.message, "User u1 authorized for ReadCandidate");
    assert!(response.decision.is_allow());
}

#[tokio::test]
async fn authorize_deny_is_forbidden() {
    let state = default_state(StaticPolicyClient::new(Decision::Deny));
    let result =
        authorize_inner(&state, &user_headers(), body_of(AuthorizeRequest::default())).await;
    assert!(matches!(result, Err(GatewayError::Forbidden)));
}

#[tokio::test]
async fn authorize_honors_explicit_action_and_candidate() {
    let policy = StaticPolicyClient::new(Decision::Deny).with_decision(
        "u1",
        "UpdateCandidate",
        "42",
        Decision::Allow,
    );
    let state = default_state(policy);
    let request = AuthorizeRequest {
        action: Some(ActionId::new("UpdateCandidate")),
        candidate_id: Some(ResourceId::new("42")),
    };
    let Json(response) = authorize_inner(&state, &user_headers(), body_of(request))
        .await
        .expect("authorize");
    assert_eq!(response.message, "User u1 authorized for UpdateCandidate");
}

#[tokio::test]
async fn authorize_records_the_decision() {
    let audit = Arc::new(RecordingAuditSink::default());
    let state = state_with(
        StaticPolicyClient::new(Decision::Allow),
        Arc::new(RecordingDirectoryClient::new()),
        test_config(),
        Arc::clone(&audit) as Arc<dyn claim_gate_core::DecisionAuditSink>,
    );
    let _ = authorize_inner(&state, &user_headers(), body_of(AuthorizeRequest::default()))
        .await
        .expect("authorize");
    let events = audit.events.lock().expect("events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].principal.as_str(), "u1");
    assert_eq!(events[0].action.as_str(), "ReadCandidate");
    assert_eq!(events[0].resource.as_str(), "candidate-123");
    assert!(events[0].decision.is_allow());
}

// ============================================================================
// SECTION: Permissions
// ============================================================================

#[tokio::test]
async fn permissions_returns_allowed_subset_in_configured_order() {
    let policy = StaticPolicyClient::new(Decision::Deny)
        .with_decision("u1", "ReadCandidate", "12", Decision::Allow)
        .with_decision("u1", "DeleteCandidate", "12", Decision::Allow);
    let state = default_state(policy);
    let Json(response) = permissions_inner(&state, &user_headers()).await.expect("permissions");
    let ids: Vec<&str> = response.permissions.iter().map(ActionId::as_str).collect();
    assert_eq!(ids, vec!["ReadCandidate", "DeleteCandidate"]);
}

#[tokio::test]
async fn permissions_with_no_allows_is_empty_not_forbidden() {
    let state = default_state(StaticPolicyClient::new(Decision::Deny));
    let Json(response) = permissions_inner(&state, &user_headers()).await.expect("permissions");
    assert!(response.permissions.is_empty());
}

// ============================================================================
// SECTION: Delete Candidate
// ============================================================================

#[tokio::test]
async fn delete_allow_reports_candidate_and_subject() {
    let policy = StaticPolicyClient::new(Decision::Deny).with_decision(
        "u1",
        "DeleteCandidate",
        "42",
        Decision::Allow,
    );
    let state = default_state(policy);
    let Json(response) = delete_candidate_inner(&state, &user_headers(), "42".to_string())
        .await
        .expect("delete");
    assert!(response.success);
    assert_eq!(response.message, "Candidate 42 deleted by user u1");
}

#[tokio::test]
async fn delete_deny_is_forbidden() {
    let state = default_state(StaticPolicyClient::new(Decision::Deny));
    let result = delete_candidate_inner(&state, &user_headers(), "42".to_string()).await;
    assert!(matches!(result, Err(GatewayError::Forbidden)));
}

// ============================================================================
// SECTION: Attribute Updates
// ============================================================================

fn update_body() -> Result<Json<UpdateAttributesRequest>, JsonRejection> {
    Ok(Json(UpdateAttributesRequest {
        department: "eng".to_string(),
        status: "active".to_string(),
        location: "remote".to_string(),
        time: "09-17".to_string(),
    }))
}

#[tokio::test]
async fn denied_update_never_reaches_the_directory() {
    let directory = Arc::new(RecordingDirectoryClient::new());
    let state = state_with(
        StaticPolicyClient::new(Decision::Deny),
        Arc::clone(&directory),
        test_config(),
        Arc::new(claim_gate_core::NoopDecisionAuditSink),
    );
    let result = update_attributes_inner(&state, &user_headers(), update_body()).await;
    assert!(matches!(result, Err(GatewayError::Forbidden)));
    assert!(directory.updates().is_empty());
}

#[tokio::test]
async fn allowed_update_writes_the_directory_username() {
    let directory = Arc::new(RecordingDirectoryClient::new());
    let policy = StaticPolicyClient::new(Decision::Deny).with_decision(
        "u1",
        "UpdateUserAttributes",
        "u1",
        Decision::Allow,
    );
    let state = state_with(
        policy,
        Arc::clone(&directory),
        test_config(),
        Arc::new(claim_gate_core::NoopDecisionAuditSink),
    );
    let headers = bearer_headers(json!({"sub": "u1", "cognito:username": "user.one"}));
    let _ = update_attributes_inner(&state, &headers, update_body()).await.expect("update");
    let updates = directory.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0.as_str(), "user.one");
    assert_eq!(updates[0].1.department, "eng");
}

#[tokio::test]
async fn update_gating_can_be_disabled_by_configuration() {
    let directory = Arc::new(RecordingDirectoryClient::new());
    let mut config = test_config();
    config.auth.require_authz_for_directory_writes = false;
    let state = state_with(
        StaticPolicyClient::failing("must not be called".to_string()),
        Arc::clone(&directory),
        config,
        Arc::new(claim_gate_core::NoopDecisionAuditSink),
    );
    let _ = update_attributes_inner(&state, &user_headers(), update_body()).await.expect("update");
    assert_eq!(directory.updates().len(), 1);
    assert_eq!(directory.updates()[0].0.as_str(), "u1");
}

#[tokio::test]
async fn absent_update_fields_write_empty_strings() {
    let directory = Arc::new(RecordingDirectoryClient::new());
    let mut config = test_config();
    config.auth.require_authz_for_directory_writes = false;
    let state = state_with(
        StaticPolicyClient::new(Decision::Allow),
        Arc::clone(&directory),
        config,
        Arc::new(claim_gate_core::NoopDecisionAuditSink),
    );
    let _ = update_attributes_inner(&state, &user_headers(), Ok(Json(UpdateAttributesRequest::default())))
        .await
        .expect("update");
    assert_eq!(directory.updates()[0].1, AttributeUpdate::default());
}

// ============================================================================
// SECTION: Router
// ============================================================================

#[tokio::test]
async fn router_maps_missing_header_to_401_with_error_body() {
    let state = default_state(StaticPolicyClient::new(Decision::Allow));
    let router = build_router(state);
    let response = router
        .oneshot(
            Request::post("/api/authorize")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body, json!({"error": "Unauthorized"}));
}

#[tokio::test]
async fn router_maps_deny_to_403_forbidden_body() {
    let state = default_state(StaticPolicyClient::new(Decision::Deny));
    let router = build_router(state);
    let response = router
        .oneshot(
            Request::post("/api/authorize")
                .header("authorization", format!("Bearer {}", token_for(json!({"sub": "u1"}))))
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body, json!({"error": "Forbidden"}));
}

#[tokio::test]
async fn router_rejects_malformed_bodies_with_400() {
    let state = default_state(StaticPolicyClient::new(Decision::Allow));
    let router = build_router(state);
    let response = router
        .oneshot(
            Request::post("/api/authorize")
                .header("authorization", format!("Bearer {}", token_for(json!({"sub": "u1"}))))
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn router_serves_probes_without_credentials() {
    let state = default_state(StaticPolicyClient::new(Decision::Deny));
    let router = build_router(state);
    let health = router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(health.status(), StatusCode::OK);
    let ready = router
        .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(ready.status(), StatusCode::OK);
}

#[test]
fn unsigned_tokens_round_trip_through_the_structural_decoder() {
    let mut map = Map::new();
    map.insert("sub".to_string(), json!("u1"));
    let token = unsigned_token(&map);
    let raw = TokenDecoder::Structural.decode(&token).expect("decode");
    assert_eq!(raw.get_str("sub"), Some("u1"));
}
