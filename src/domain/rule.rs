// Copyright 2025 Cowboy AI, LLC.

//! Classification Rules and what hangs off them

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::condition::Condition;
use crate::identifiers::{ClassificationId, ClassificationRuleId, RuleClassificationId};
use crate::policy_api::resources::{CollectionResource, CollectionSequenceResource};

/// A prioritised rule on a Workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRule {
    /// Id, the id of the backing collection sequence
    pub id: ClassificationRuleId,
    /// Name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Evaluation priority on the Workflow
    pub priority: i64,
}

impl ClassificationRule {
    /// Assemble from the backing sequence and its order on the Workflow
    pub fn from_sequence(sequence: &CollectionSequenceResource, priority: i64) -> Self {
        Self {
            id: sequence.id,
            name: sequence.name.clone(),
            description: sequence.description.clone(),
            priority,
        }
    }
}

/// Caller payload creating or updating a Classification Rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRuleInput {
    /// Name
    pub name: String,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Priority; appended after the last rule when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

/// Association of a Classification with a Classification Rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleClassification {
    /// Id, the id of the backing collection
    pub id: RuleClassificationId,
    /// Classification applied when the rule matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification_id: Option<ClassificationId>,
}

impl From<&CollectionResource> for RuleClassification {
    fn from(collection: &CollectionResource) -> Self {
        Self {
            id: collection.id,
            classification_id: collection.first_policy_id(),
        }
    }
}

/// Caller payload creating or updating a Rule Classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleClassificationInput {
    /// Classification to apply
    pub classification_id: ClassificationId,
}

/// A condition a document must meet for a Classification Rule to apply
pub type RuleCondition = Condition;

/// Caller payload creating or replacing a Rule Condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleConditionInput {
    /// Name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Condition payload in public form, validated when transcoded
    pub additional: Value,
}
