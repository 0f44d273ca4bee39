// crates/claim-gate-core/tests/query_construction.rs
// ============================================================================
// Module: Query Construction Tests
// Description: Validate single and batched authorization query shapes.
// Purpose: Ensure entity attachment and batch ordering are deterministic.
// Dependencies: claim-gate-core, serde_json
// ============================================================================

//! Authorization query builder behavior tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]

use claim_gate_core::ActionId;
use claim_gate_core::AttributeValue;
use claim_gate_core::NormalizedClaims;
use claim_gate_core::PolicyStoreId;
use claim_gate_core::QueryBuilder;
use claim_gate_core::RawClaims;
use claim_gate_core::ResourceId;
use claim_gate_core::normalize_claims;
use serde_json::Value;
use serde_json::json;

fn sample_claims() -> NormalizedClaims {
    let Value::Object(map) = json!({
        "sub": "u1",
        "email": "user@example.com",
        "cognito:groups": "admin,support",
        "custom:department": "eng",
    }) else {
        panic!("claims literal must be an object");
    };
    normalize_claims(&RawClaims::new(map)).expect("normalize")
}

fn builder() -> QueryBuilder {
    QueryBuilder::new(PolicyStoreId::new("store-1"), "JobApp")
}

#[test]
fn single_query_targets_namespaced_types() {
    let query =
        builder().single(&sample_claims(), &ActionId::new("ReadCandidate"), &ResourceId::new("42"));
    assert_eq!(query.policy_store_id.as_str(), "store-1");
    assert_eq!(query.principal.entity_type, "JobApp::User");
    assert_eq!(query.principal.entity_id, "u1");
    assert_eq!(query.action.action_type, "JobApp::Action");
    assert_eq!(query.action.action_id.as_str(), "ReadCandidate");
    assert_eq!(query.resource.entity_type, "JobApp::Candidate");
    assert_eq!(query.resource.entity_id, "42");
}

#[test]
fn single_query_always_attaches_principal_entity() {
    let query =
        builder().single(&sample_claims(), &ActionId::new("ReadCandidate"), &ResourceId::new("42"));
    assert_eq!(query.entities.len(), 1);
    let entity = &query.entities[0];
    assert_eq!(entity.identifier.entity_type, "JobApp::User");
    assert_eq!(
        entity.attributes.get("sub"),
        Some(&AttributeValue::String("u1".to_string()))
    );
    assert_eq!(
        entity.attributes.get("email"),
        Some(&AttributeValue::String("user@example.com".to_string()))
    );
    assert_eq!(
        entity.attributes.get("department"),
        Some(&AttributeValue::String("eng".to_string()))
    );
    assert_eq!(
        entity.attributes.get("status"),
        Some(&AttributeValue::String(String::new()))
    );
    let Some(AttributeValue::Set(groups)) = entity.attributes.get("groups") else {
        panic!("groups attribute must be an entity set");
    };
    let ids: Vec<&str> =
        groups.iter().map(|wrap| wrap.entity_identifier.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["admin", "support"]);
    assert!(
        groups.iter().all(|wrap| wrap.entity_identifier.entity_type == "JobApp::Role"),
        "group references must use the role entity type"
    );
}

#[test]
fn self_query_targets_the_principal_entity() {
    let query = builder().single_self(&sample_claims(), &ActionId::new("UpdateUserAttributes"));
    assert_eq!(query.resource, query.principal);
    assert_eq!(query.resource.entity_type, "JobApp::User");
    assert_eq!(query.resource.entity_id, "u1");
    assert_eq!(query.entities.len(), 1);
}

#[test]
fn batch_preserves_action_order_without_deduplication() {
    let actions = vec![
        ActionId::new("ReadCandidate"),
        ActionId::new("DeleteCandidate"),
        ActionId::new("ReadCandidate"),
    ];
    let batch = builder().batch(&sample_claims(), &actions, &ResourceId::new("12"));
    let ids: Vec<&str> =
        batch.requests.iter().map(|item| item.action.action_id.as_str()).collect();
    assert_eq!(ids, vec!["ReadCandidate", "DeleteCandidate", "ReadCandidate"]);
    assert!(
        batch.requests.iter().all(|item| item.resource.entity_id == "12"),
        "every batch request targets the fixed resource"
    );
    assert_eq!(batch.entities.len(), 1);
}

#[test]
fn query_serializes_with_camel_case_wire_keys() {
    let query =
        builder().single(&sample_claims(), &ActionId::new("ReadCandidate"), &ResourceId::new("42"));
    let wire = serde_json::to_value(&query).expect("serialize");
    assert_eq!(wire["policyStoreId"], json!("store-1"));
    assert_eq!(wire["principal"]["entityType"], json!("JobApp::User"));
    assert_eq!(wire["action"]["actionId"], json!("ReadCandidate"));
    assert_eq!(
        wire["entities"][0]["attributes"]["groups"]["set"][0]["entityIdentifier"]["entityType"],
        json!("JobApp::Role")
    );
    assert_eq!(
        wire["entities"][0]["attributes"]["sub"]["string"],
        json!("u1")
    );
}

#[test]
fn identical_claims_build_identical_queries() {
    let action = ActionId::new("DeleteCandidate");
    let resource = ResourceId::new("42");
    let first = builder().single(&sample_claims(), &action, &resource);
    let second = builder().single(&sample_claims(), &action, &resource);
    assert_eq!(first, second);
}
