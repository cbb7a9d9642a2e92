// Copyright 2025 Cowboy AI, LLC.

//! Access to the remote policy-management service
//!
//! The remote service exposes four verbs (`create`, `retrieve`, `update`,
//! `delete`) on three families of endpoints. Every call carries the same
//! envelope, [`PolicyRequest`], discriminated by its `type`.
//!
//! [`PolicyApi`] is the transport seam. [`http::HttpPolicyApi`] talks to a real
//! service, [`in_memory::InMemoryPolicyApi`] emulates one for tests, and
//! [`client::PolicyClient`] layers typed per-resource operations on top of
//! either.

pub mod client;
pub mod http;
pub mod in_memory;
pub mod resources;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ClassificationResult;
use crate::identifiers::ProjectId;

pub use client::PolicyClient;
pub use http::HttpPolicyApi;
pub use in_memory::InMemoryPolicyApi;

/// Endpoint family on the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Conditions, collections, sequences, lexicons and their expressions
    Classification,
    /// Policies
    Policy,
    /// Sequence workflows
    Workflow,
}

impl Family {
    /// Path segment of the family
    pub fn as_str(self) -> &'static str {
        match self {
            Family::Classification => "classification",
            Family::Policy => "policy",
            Family::Workflow => "workflow",
        }
    }
}

/// Operation performed on an endpoint family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Create a resource
    Create,
    /// Read one, many or a page of resources
    Retrieve,
    /// Update a resource
    Update,
    /// Delete one or many resources
    Delete,
}

impl Verb {
    /// Path segment of the verb
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Retrieve => "retrieve",
            Verb::Update => "update",
            Verb::Delete => "delete",
        }
    }
}

/// Remote resource type carried in the envelope `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// A condition tree node
    Condition,
    /// A collection of policies with a matching condition
    Collection,
    /// An ordered list of collections
    CollectionSequence,
    /// A named list of expressions
    Lexicon,
    /// One expression of a lexicon
    LexiconExpression,
    /// A policy
    Policy,
    /// An ordered list of collection sequences
    SequenceWorkflow,
}

impl ResourceType {
    /// Endpoint family serving this type
    pub fn family(self) -> Family {
        match self {
            ResourceType::Policy => Family::Policy,
            ResourceType::SequenceWorkflow => Family::Workflow,
            _ => Family::Classification,
        }
    }

    /// Wire name of the type
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Condition => "condition",
            ResourceType::Collection => "collection",
            ResourceType::CollectionSequence => "collection_sequence",
            ResourceType::Lexicon => "lexicon",
            ResourceType::LexiconExpression => "lexicon_expression",
            ResourceType::Policy => "policy",
            ResourceType::SequenceWorkflow => "sequence_workflow",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verb applied to an endpoint family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Endpoint family
    pub family: Family,
    /// Verb
    pub verb: Verb,
}

impl Endpoint {
    /// Endpoint serving `verb` for `kind`
    pub fn new(kind: ResourceType, verb: Verb) -> Self {
        Self {
            family: kind.family(),
            verb,
        }
    }

    /// Relative path, e.g. `classification/create`
    pub fn path(&self) -> String {
        format!("{}/{}", self.family.as_str(), self.verb.as_str())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.family.as_str(), self.verb.as_str())
    }
}

/// One id or a list of ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdSelector {
    /// A single resource
    One(i64),
    /// Several resources
    Many(Vec<i64>),
}

impl IdSelector {
    /// Selected ids in order
    pub fn ids(&self) -> Vec<i64> {
        match self {
            IdSelector::One(id) => vec![*id],
            IdSelector::Many(ids) => ids.clone(),
        }
    }
}

/// How child lists are merged on update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UpdateBehaviour {
    /// Append to the existing children
    Add,
    /// Replace the existing children
    Replace,
}

/// Request envelope shared by every remote call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRequest {
    /// Tenant the call is made for
    pub project_id: ProjectId,
    /// Resource type addressed
    #[serde(rename = "type")]
    pub kind: ResourceType,
    /// Addressed resource(s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<IdSelector>,
    /// Resource name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Resource description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Type specific payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional: Option<Value>,
    /// Page size of a paged retrieve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_page_results: Option<usize>,
    /// One-based index of the first result of a paged retrieve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    /// Child list merge mode of an update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_behaviour: Option<UpdateBehaviour>,
}

impl PolicyRequest {
    /// Empty envelope for `kind`
    pub fn new(project_id: &ProjectId, kind: ResourceType) -> Self {
        Self {
            project_id: project_id.clone(),
            kind,
            id: None,
            name: None,
            description: None,
            additional: None,
            max_page_results: None,
            start: None,
            update_behaviour: None,
        }
    }

    /// Address a single resource
    pub fn with_id(mut self, id: impl Into<i64>) -> Self {
        self.id = Some(IdSelector::One(id.into()));
        self
    }

    /// Address several resources
    pub fn with_ids<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<i64>,
    {
        self.id = Some(IdSelector::Many(ids.into_iter().map(Into::into).collect()));
        self
    }

    /// Set the name
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Set the type specific payload
    pub fn with_additional(mut self, additional: Value) -> Self {
        self.additional = Some(additional);
        self
    }

    /// Request one page, `start` being one-based
    pub fn with_page(mut self, start: usize, max_page_results: usize) -> Self {
        self.start = Some(start);
        self.max_page_results = Some(max_page_results);
        self
    }

    /// Set the child list merge mode
    pub fn with_update_behaviour(mut self, behaviour: UpdateBehaviour) -> Self {
        self.update_behaviour = Some(behaviour);
        self
    }

    /// Endpoint this request is sent to for `verb`
    pub fn endpoint(&self, verb: Verb) -> Endpoint {
        Endpoint::new(self.kind, verb)
    }
}

/// Result of a retrieve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Number of matches across all pages
    #[serde(default)]
    pub totalhits: usize,
    /// Matches on this page
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> ListResponse<T> {
    /// Wrap a list of results
    pub fn new(results: Vec<T>, totalhits: usize) -> Self {
        Self { totalhits, results }
    }
}

/// Transport to the remote policy service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PolicyApi: Send + Sync {
    /// Send `request` to the endpoint serving `verb` and return the response body
    async fn call(&self, verb: Verb, request: PolicyRequest) -> ClassificationResult<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_endpoint_paths() {
        let project = ProjectId::new("p");
        let request = PolicyRequest::new(&project, ResourceType::Lexicon);
        assert_eq!(request.endpoint(Verb::Create).path(), "classification/create");
        let request = PolicyRequest::new(&project, ResourceType::Policy);
        assert_eq!(request.endpoint(Verb::Retrieve).path(), "policy/retrieve");
        let request = PolicyRequest::new(&project, ResourceType::SequenceWorkflow);
        assert_eq!(request.endpoint(Verb::Delete).to_string(), "workflow/delete");
    }

    #[test]
    fn test_envelope_serialization() {
        let request = PolicyRequest::new(&ProjectId::new("tenant"), ResourceType::CollectionSequence)
            .with_id(4)
            .with_name(Some("rule".to_string()))
            .with_additional(json!({"evaluation_enabled": true}))
            .with_update_behaviour(UpdateBehaviour::Add);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "project_id": "tenant",
                "type": "collection_sequence",
                "id": 4,
                "name": "rule",
                "additional": {"evaluation_enabled": true},
                "update_behaviour": "ADD"
            })
        );
    }

    #[test]
    fn test_id_list_serialization() {
        let request = PolicyRequest::new(&ProjectId::new("t"), ResourceType::Condition)
            .with_ids(vec![3i64, 5])
            .with_page(1, 10);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["id"], json!([3, 5]));
        assert_eq!(value["start"], json!(1));
        assert_eq!(value["max_page_results"], json!(10));
    }

    #[test]
    fn test_list_response_defaults() {
        let response: ListResponse<Value> = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.totalhits, 0);
        assert!(response.results.is_empty());
    }
}
