// Copyright 2025 Cowboy AI, LLC.

//! Workflows

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::identifiers::WorkflowId;
use crate::policy_api::resources::WorkflowResource;

/// An ordered set of Classification Rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Id, the id of the backing sequence workflow
    pub id: WorkflowId,
    /// Name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&WorkflowResource> for Workflow {
    fn from(workflow: &WorkflowResource) -> Self {
        Self {
            id: workflow.id,
            name: workflow.name.clone(),
            description: workflow.description.clone(),
            notes: workflow.additional.notes.clone(),
        }
    }
}

/// Caller payload creating or updating a Workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInput {
    /// Name
    pub name: String,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
