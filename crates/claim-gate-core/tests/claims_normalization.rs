// crates/claim-gate-core/tests/claims_normalization.rs
// ============================================================================
// Module: Claim Normalization Tests
// Description: Validate subject, email, group, and attribute normalization.
// Purpose: Ensure both group claim representations normalize identically.
// Dependencies: claim-gate-core, serde_json
// ============================================================================

//! Claim normalization behavior tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;

use claim_gate_core::ClaimError;
use claim_gate_core::GroupName;
use claim_gate_core::RawClaims;
use claim_gate_core::normalize_claims;
use claim_gate_core::normalize_groups;
use serde_json::Value;
use serde_json::json;

fn raw(value: Value) -> RawClaims {
    match value {
        Value::Object(map) => RawClaims::new(map),
        other => panic!("expected object literal, got {other}"),
    }
}

fn group_set(names: &[&str]) -> BTreeSet<GroupName> {
    names.iter().copied().map(GroupName::new).collect()
}

#[test]
fn missing_subject_is_a_claim_error() {
    let claims = raw(json!({"email": "user@example.com"}));
    assert_eq!(normalize_claims(&claims), Err(ClaimError::MissingSubject));
}

#[test]
fn subject_and_email_pass_through_verbatim() {
    let claims = raw(json!({"sub": "u1", "email": "user@example.com"}));
    let normalized = normalize_claims(&claims).expect("normalize");
    assert_eq!(normalized.subject.as_str(), "u1");
    assert_eq!(normalized.email, "user@example.com");
}

#[test]
fn absent_email_defaults_to_empty_string() {
    let claims = raw(json!({"sub": "u1"}));
    let normalized = normalize_claims(&claims).expect("normalize");
    assert_eq!(normalized.email, "");
}

#[test]
fn comma_string_and_sequence_normalize_to_the_same_set() {
    let from_string = raw(json!({"sub": "u1", "cognito:groups": "a,b,c"}));
    let from_array = raw(json!({"sub": "u1", "cognito:groups": ["a", "b", "c"]}));
    let left = normalize_claims(&from_string).expect("normalize string form");
    let right = normalize_claims(&from_array).expect("normalize array form");
    assert_eq!(left.groups, right.groups);
    assert_eq!(left.groups, group_set(&["a", "b", "c"]));
}

#[test]
fn comma_string_groups_are_trimmed() {
    let claims = raw(json!({"sub": "u1", "cognito:groups": " admin , support "}));
    let normalized = normalize_claims(&claims).expect("normalize");
    assert_eq!(normalized.groups, group_set(&["admin", "support"]));
}

#[test]
fn duplicate_groups_are_removed() {
    let claims = raw(json!({"sub": "u1", "cognito:groups": ["admin", "admin", "support"]}));
    let normalized = normalize_claims(&claims).expect("normalize");
    assert_eq!(normalized.groups, group_set(&["admin", "support"]));
}

#[test]
fn absent_group_claim_yields_empty_set() {
    let claims = raw(json!({"sub": "u1"}));
    let normalized = normalize_claims(&claims).expect("normalize");
    assert!(normalized.groups.is_empty());
}

#[test]
fn empty_elements_are_dropped() {
    assert_eq!(normalize_groups(Some(&json!("a,,b,"))), group_set(&["a", "b"]));
    assert_eq!(normalize_groups(Some(&json!(["a", "", "b"]))), group_set(&["a", "b"]));
}

#[test]
fn non_string_group_entries_are_skipped() {
    assert_eq!(normalize_groups(Some(&json!(["a", 7, null, "b"]))), group_set(&["a", "b"]));
}

#[test]
fn plain_groups_claim_is_accepted_when_provider_claim_is_absent() {
    let claims = raw(json!({"sub": "u1", "groups": "admin"}));
    let normalized = normalize_claims(&claims).expect("normalize");
    assert_eq!(normalized.groups, group_set(&["admin"]));
}

#[test]
fn custom_attributes_accept_both_claim_spellings() {
    let lowercase = raw(json!({
        "sub": "u1",
        "custom:department": "eng",
        "custom:status": "active",
    }));
    let capitalized = raw(json!({
        "sub": "u1",
        "custom:department": "eng",
        "custom:Status": "active",
        "custom:Location": "remote",
        "custom:Time": "09-17",
    }));
    let left = normalize_claims(&lowercase).expect("normalize lowercase");
    assert_eq!(left.attributes.department, "eng");
    assert_eq!(left.attributes.status, "active");
    assert_eq!(left.attributes.location, "");
    let right = normalize_claims(&capitalized).expect("normalize capitalized");
    assert_eq!(right.attributes.status, "active");
    assert_eq!(right.attributes.location, "remote");
    assert_eq!(right.attributes.time, "09-17");
}

#[test]
fn username_falls_back_to_subject() {
    let with_username = raw(json!({"sub": "u1", "cognito:username": "user.one"}));
    let without_username = raw(json!({"sub": "u1"}));
    assert_eq!(
        normalize_claims(&with_username).expect("normalize").username.as_str(),
        "user.one"
    );
    assert_eq!(normalize_claims(&without_username).expect("normalize").username.as_str(), "u1");
}
