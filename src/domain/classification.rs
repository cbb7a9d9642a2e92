// Copyright 2025 Cowboy AI, LLC.

//! Classifications

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::condition::{ClassificationTarget, ConditionAdditional};
use crate::identifiers::ClassificationId;
use crate::linkage::PolicyDescription;

/// A named condition tree deciding whether a document belongs to a class
///
/// Backed by one Policy, whose description carries the metadata, and one
/// Condition holding the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Id, the id of the backing Policy
    pub id: ClassificationId,
    /// Name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Caller defined type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Documents the classification applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification_target: Option<ClassificationTarget>,
    /// Root of the condition tree
    pub additional: ConditionAdditional,
}

/// Caller payload creating or replacing a Classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationInput {
    /// Name
    pub name: String,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Caller defined type
    #[serde(rename = "type")]
    pub kind: String,
    /// Documents the classification applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification_target: Option<ClassificationTarget>,
    /// Root of the condition tree in public form, validated when transcoded
    pub additional: Value,
}

impl ClassificationInput {
    /// Metadata stored in the Policy description
    pub fn policy_description(&self) -> PolicyDescription {
        PolicyDescription {
            name: Some(self.name.clone()),
            description: self.description.clone(),
            kind: Some(self.kind.clone()),
        }
    }
}
