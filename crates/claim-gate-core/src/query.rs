// crates/claim-gate-core/src/query.rs
// ============================================================================
// Module: Authorization Query Builder
// Description: Query model and construction for the policy decision service.
// Purpose: Build single and batched principal/action/resource queries.
// Dependencies: serde, crate::claims, crate::identifiers
// ============================================================================

//! ## Overview
//! The query builder turns normalized claims plus an (action, resource) pair
//! into the wire shape the policy decision service evaluates. Entity types
//! are namespaced (`JobApp::User`, `JobApp::Candidate`, `JobApp::Role`) with
//! the namespace supplied by configuration.
//! Invariants:
//! - The normalized principal entity (subject, email, groups, custom
//!   attributes) is always attached; the observed pattern attached it
//!   inconsistently and this implementation chose one consistent policy.
//! - Batch construction preserves the configured action order, performs no
//!   deduplication, and never short-circuits: every action is evaluated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::claims::NormalizedClaims;
use crate::identifiers::ActionId;
use crate::identifiers::PolicyStoreId;
use crate::identifiers::ResourceId;

// ============================================================================
// SECTION: Entity Kinds
// ============================================================================

/// Entity kind label for principals.
const USER_KIND: &str = "User";

/// Entity kind label for candidate resources.
const CANDIDATE_KIND: &str = "Candidate";

/// Entity kind label for group roles.
const ROLE_KIND: &str = "Role";

/// Action type label within the schema namespace.
const ACTION_KIND: &str = "Action";

// ============================================================================
// SECTION: Wire Model
// ============================================================================

/// Reference to an entity by namespaced type and identifier.
///
/// # Invariants
/// - `entity_type` is fully namespaced (for example `JobApp::User`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    /// Namespaced entity type.
    pub entity_type: String,
    /// Entity identifier.
    pub entity_id: String,
}

/// Reference to an action by namespaced type and identifier.
///
/// # Invariants
/// - `action_type` is fully namespaced (for example `JobApp::Action`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRef {
    /// Namespaced action type.
    pub action_type: String,
    /// Action identifier.
    pub action_id: ActionId,
}

/// Wrapper for entity references inside set-valued attributes.
///
/// # Invariants
/// - Mirrors the policy service wire shape for entity sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityIdentifier {
    /// Referenced entity.
    pub entity_identifier: EntityRef,
}

/// Attribute value attached to an entity.
///
/// # Invariants
/// - Serializes as `{"string": ...}` or `{"set": [...]}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeValue {
    /// String attribute value.
    String(String),
    /// Set of entity references.
    Set(Vec<EntityIdentifier>),
}

/// Entity with attached attributes, supplied as query context.
///
/// # Invariants
/// - Attribute keys are unique; `BTreeMap` keeps serialization deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity being described.
    pub identifier: EntityRef,
    /// Named attributes for the entity.
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// Single authorization query.
///
/// # Invariants
/// - Constructed fresh per request; nothing is cached or reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationQuery {
    /// Policy store evaluated against.
    pub policy_store_id: PolicyStoreId,
    /// Principal on whose behalf the action is evaluated.
    pub principal: EntityRef,
    /// Action being attempted.
    pub action: ActionRef,
    /// Resource the action targets.
    pub resource: EntityRef,
    /// Context entities (the principal entity with attributes).
    pub entities: Vec<Entity>,
}

/// One request within an authorization batch.
///
/// # Invariants
/// - Shares the batch-level entity list; carries no entities of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequestItem {
    /// Principal on whose behalf the action is evaluated.
    pub principal: EntityRef,
    /// Action being attempted.
    pub action: ActionRef,
    /// Resource the action targets.
    pub resource: EntityRef,
}

/// Batched authorization query, one request per action.
///
/// # Invariants
/// - `requests` preserves the order actions were supplied in, without
///   deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationBatch {
    /// Policy store evaluated against.
    pub policy_store_id: PolicyStoreId,
    /// Context entities shared by all requests.
    pub entities: Vec<Entity>,
    /// Per-action requests.
    pub requests: Vec<BatchRequestItem>,
}

// ============================================================================
// SECTION: Query Builder
// ============================================================================

/// Builds authorization queries for a fixed policy store and schema namespace.
///
/// # Invariants
/// - The same claims always produce the same query shape (deterministic).
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    /// Policy store targeted by built queries.
    store_id: PolicyStoreId,
    /// Schema namespace prefixed onto entity and action types.
    namespace: String,
}

impl QueryBuilder {
    /// Creates a builder for the given policy store and schema namespace.
    #[must_use]
    pub fn new(store_id: PolicyStoreId, namespace: impl Into<String>) -> Self {
        Self {
            store_id,
            namespace: namespace.into(),
        }
    }

    /// Builds a single-query authorization request.
    #[must_use]
    pub fn single(
        &self,
        claims: &NormalizedClaims,
        action: &ActionId,
        resource: &ResourceId,
    ) -> AuthorizationQuery {
        AuthorizationQuery {
            policy_store_id: self.store_id.clone(),
            principal: self.user_ref(claims),
            action: self.action_ref(action),
            resource: self.candidate_ref(resource),
            entities: vec![self.principal_entity(claims)],
        }
    }

    /// Builds a single-query request whose resource is the principal's own
    /// user entity, for self-service operations.
    #[must_use]
    pub fn single_self(&self, claims: &NormalizedClaims, action: &ActionId) -> AuthorizationQuery {
        AuthorizationQuery {
            policy_store_id: self.store_id.clone(),
            principal: self.user_ref(claims),
            action: self.action_ref(action),
            resource: self.user_ref(claims),
            entities: vec![self.principal_entity(claims)],
        }
    }

    /// Builds a batched authorization request, one entry per action.
    #[must_use]
    pub fn batch(
        &self,
        claims: &NormalizedClaims,
        actions: &[ActionId],
        resource: &ResourceId,
    ) -> AuthorizationBatch {
        let principal = self.user_ref(claims);
        let resource = self.candidate_ref(resource);
        AuthorizationBatch {
            policy_store_id: self.store_id.clone(),
            entities: vec![self.principal_entity(claims)],
            requests: actions
                .iter()
                .map(|action| BatchRequestItem {
                    principal: principal.clone(),
                    action: self.action_ref(action),
                    resource: resource.clone(),
                })
                .collect(),
        }
    }

    /// Builds the principal entity with normalized attributes attached.
    #[must_use]
    pub fn principal_entity(&self, claims: &NormalizedClaims) -> Entity {
        let mut attributes = BTreeMap::new();
        attributes
            .insert("sub".to_string(), AttributeValue::String(claims.subject.as_str().to_string()));
        attributes.insert("email".to_string(), AttributeValue::String(claims.email.clone()));
        attributes.insert(
            "department".to_string(),
            AttributeValue::String(claims.attributes.department.clone()),
        );
        attributes
            .insert("status".to_string(), AttributeValue::String(claims.attributes.status.clone()));
        attributes.insert(
            "location".to_string(),
            AttributeValue::String(claims.attributes.location.clone()),
        );
        attributes
            .insert("time".to_string(), AttributeValue::String(claims.attributes.time.clone()));
        attributes.insert(
            "groups".to_string(),
            AttributeValue::Set(
                claims
                    .groups
                    .iter()
                    .map(|group| EntityIdentifier {
                        entity_identifier: EntityRef {
                            entity_type: self.namespaced(ROLE_KIND),
                            entity_id: group.as_str().to_string(),
                        },
                    })
                    .collect(),
            ),
        );
        Entity {
            identifier: self.user_ref(claims),
            attributes,
        }
    }

    /// Returns the namespaced user reference for the claims subject.
    fn user_ref(&self, claims: &NormalizedClaims) -> EntityRef {
        EntityRef {
            entity_type: self.namespaced(USER_KIND),
            entity_id: claims.subject.as_str().to_string(),
        }
    }

    /// Returns the namespaced candidate reference for a resource identifier.
    fn candidate_ref(&self, resource: &ResourceId) -> EntityRef {
        EntityRef {
            entity_type: self.namespaced(CANDIDATE_KIND),
            entity_id: resource.as_str().to_string(),
        }
    }

    /// Returns the namespaced action reference for an action identifier.
    fn action_ref(&self, action: &ActionId) -> ActionRef {
        ActionRef {
            action_type: self.namespaced(ACTION_KIND),
            action_id: action.clone(),
        }
    }

    /// Joins the schema namespace and a kind label.
    fn namespaced(&self, kind: &str) -> String {
        format!("{}::{kind}", self.namespace)
    }
}
