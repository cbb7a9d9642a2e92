// Copyright 2025 Cowboy AI, LLC.

//! Typed remote resources
//!
//! Fields the crate does not interpret are kept in a flattened `extra` map so
//! a resource read from the remote service can be written back without losing
//! anything.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::identifiers::{
    CollectionId, CollectionSequenceId, ConditionId, LexiconExpressionId, LexiconId, PolicyId,
    WorkflowId,
};

/// A remote Condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResource {
    /// Remote id
    pub id: ConditionId,
    /// Name, used for cross-references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Type specific payload in remote form
    #[serde(default)]
    pub additional: Value,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConditionResource {
    /// Notes on the condition payload
    pub fn notes(&self) -> Option<&str> {
        self.additional.get("notes").and_then(Value::as_str)
    }

    /// Parent of this condition when it is a child of another stored condition
    pub fn parent_condition_id(&self) -> Option<ConditionId> {
        self.additional
            .get("parent_condition_id")
            .and_then(Value::as_i64)
            .map(ConditionId::new)
    }

    /// Whole condition as a JSON value
    pub fn to_value(&self) -> Value {
        let mut object = self.extra.clone();
        object.insert("id".to_string(), json!(self.id));
        if let Some(name) = &self.name {
            object.insert("name".to_string(), Value::String(name.clone()));
        }
        object.insert("additional".to_string(), self.additional.clone());
        Value::Object(object)
    }

    /// Direct children of a boolean condition retrieved with its children
    pub fn children(&self) -> &[Value] {
        self.additional
            .get("children")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Policy definition applied to every Classification Policy
pub fn default_policy_definition() -> Value {
    json!({
        "priority": 0,
        "policy_type_id": 1,
        "details": {
            "fieldActions": [
                {"name": "Travel Documents", "action": "ADD_FIELD_VALUE", "value": "1"}
            ]
        }
    })
}

/// A remote Policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyResource {
    /// Remote id
    pub id: PolicyId,
    /// Name, used for cross-references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description, holding the encoded Classification metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Policy definition
    #[serde(default)]
    pub additional: Value,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of a remote Collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionAdditional {
    /// Policies applied when the collection matches
    #[serde(default)]
    pub policy_ids: Vec<PolicyId>,
    /// Condition the collection matches with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A remote Collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionResource {
    /// Remote id
    pub id: CollectionId,
    /// Name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Payload
    #[serde(default)]
    pub additional: CollectionAdditional,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CollectionResource {
    /// Id of the condition the collection matches with
    pub fn condition_id(&self) -> Option<ConditionId> {
        self.additional
            .condition
            .as_ref()
            .and_then(|condition| condition.get("id"))
            .and_then(Value::as_i64)
            .map(ConditionId::new)
    }

    /// First policy on the collection
    pub fn first_policy_id(&self) -> Option<PolicyId> {
        self.additional.policy_ids.first().copied()
    }
}

/// One entry of a collection sequence
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionSequenceEntry {
    /// Collections evaluated by this entry
    #[serde(default)]
    pub collection_ids: Vec<CollectionId>,
    /// Evaluation order of the entry
    #[serde(default)]
    pub order: Option<i64>,
    /// Whether evaluation stops at the first match
    #[serde(default)]
    pub stop_on_match: bool,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CollectionSequenceEntry {
    /// Entry evaluating a single collection
    pub fn for_collection(collection_id: CollectionId) -> Self {
        Self {
            collection_ids: vec![collection_id],
            order: None,
            stop_on_match: false,
            extra: Map::new(),
        }
    }
}

/// Payload of a remote collection sequence
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionSequenceAdditional {
    /// Ordered entries
    #[serde(default)]
    pub collection_sequence_entries: Vec<CollectionSequenceEntry>,
    /// Whether the sequence is evaluated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_enabled: Option<bool>,
    /// Conditions referenced by the collections, present on detailed retrieves
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub condition_fragments: Vec<Value>,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CollectionSequenceAdditional {
    /// Every collection id across all entries, in entry order
    pub fn collection_ids(&self) -> Vec<CollectionId> {
        self.collection_sequence_entries
            .iter()
            .flat_map(|entry| entry.collection_ids.iter().copied())
            .collect()
    }

    /// Whether any entry evaluates `collection_id`
    pub fn contains_collection(&self, collection_id: CollectionId) -> bool {
        self.collection_sequence_entries
            .iter()
            .any(|entry| entry.collection_ids.contains(&collection_id))
    }

    /// Remove `collection_id` from every entry, dropping entries left empty
    pub fn remove_collection(&mut self, collection_id: CollectionId) {
        for entry in &mut self.collection_sequence_entries {
            entry.collection_ids.retain(|id| *id != collection_id);
        }
        self.collection_sequence_entries
            .retain(|entry| !entry.collection_ids.is_empty());
    }

    /// Remove every entry, returning the collection ids they held
    pub fn clear_entries(&mut self) -> Vec<CollectionId> {
        let ids = self.collection_ids();
        self.collection_sequence_entries.clear();
        ids
    }
}

/// A remote collection sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSequenceResource {
    /// Remote id
    pub id: CollectionSequenceId,
    /// Name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Payload
    #[serde(default)]
    pub additional: CollectionSequenceAdditional,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reference from a workflow to one of its collection sequences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEntry {
    /// Referenced sequence
    pub collection_sequence_id: CollectionSequenceId,
    /// Owning workflow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_workflow_id: Option<WorkflowId>,
    /// Evaluation order, the public priority
    #[serde(default)]
    pub order: i64,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of a remote sequence workflow
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowAdditional {
    /// Free form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Entries, one per collection sequence
    #[serde(default)]
    pub sequence_entries: Vec<WorkflowEntry>,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowAdditional {
    /// Entry referencing `sequence_id`
    pub fn entry(&self, sequence_id: CollectionSequenceId) -> Option<&WorkflowEntry> {
        self.sequence_entries
            .iter()
            .find(|entry| entry.collection_sequence_id == sequence_id)
    }

    /// Insert an entry for `sequence_id`
    ///
    /// With an order, every entry at or after that order moves up by one so
    /// orders stay unique. Without one, the entry is appended after the
    /// highest existing order. Returns the order assigned.
    pub fn insert_entry(
        &mut self,
        sequence_id: CollectionSequenceId,
        workflow_id: WorkflowId,
        order: Option<i64>,
    ) -> i64 {
        let order = match order {
            Some(order) => {
                for entry in &mut self.sequence_entries {
                    if entry.order >= order {
                        entry.order += 1;
                    }
                }
                order
            }
            None => {
                self.sequence_entries
                    .iter()
                    .map(|entry| entry.order)
                    .fold(0, i64::max)
                    + 1
            }
        };
        self.sequence_entries.push(WorkflowEntry {
            collection_sequence_id: sequence_id,
            sequence_workflow_id: Some(workflow_id),
            order,
            extra: Map::new(),
        });
        order
    }

    /// Remove the entry for `sequence_id`, returning it
    pub fn remove_entry(&mut self, sequence_id: CollectionSequenceId) -> Option<WorkflowEntry> {
        let index = self
            .sequence_entries
            .iter()
            .position(|entry| entry.collection_sequence_id == sequence_id)?;
        Some(self.sequence_entries.remove(index))
    }

    /// Overwrite the order of the entry for `sequence_id` in place
    pub fn set_order(&mut self, sequence_id: CollectionSequenceId, order: i64) -> bool {
        match self
            .sequence_entries
            .iter_mut()
            .find(|entry| entry.collection_sequence_id == sequence_id)
        {
            Some(entry) => {
                entry.order = order;
                true
            }
            None => false,
        }
    }

    /// Entries sorted by order
    pub fn entries_by_order(&self) -> Vec<&WorkflowEntry> {
        let mut entries: Vec<&WorkflowEntry> = self.sequence_entries.iter().collect();
        entries.sort_by_key(|entry| entry.order);
        entries
    }
}

/// A remote sequence workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResource {
    /// Remote id
    pub id: WorkflowId,
    /// Name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Payload
    #[serde(default)]
    pub additional: WorkflowAdditional,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of a remote lexicon expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconExpressionAdditional {
    /// The expression text
    pub expression: String,
    /// Owning lexicon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexicon_id: Option<LexiconId>,
    /// `text` or `regex`
    #[serde(rename = "type")]
    pub kind: String,
}

/// A remote lexicon expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconExpressionResource {
    /// Remote id, absent on expressions about to be created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LexiconExpressionId>,
    /// Always `lexicon_expression`
    #[serde(rename = "type", default = "lexicon_expression_type")]
    pub kind: String,
    /// Payload
    pub additional: LexiconExpressionAdditional,
}

fn lexicon_expression_type() -> String {
    "lexicon_expression".to_string()
}

impl LexiconExpressionResource {
    /// Expression to be stored on `lexicon_id`
    pub fn new(
        id: Option<LexiconExpressionId>,
        lexicon_id: LexiconId,
        expression: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind: lexicon_expression_type(),
            additional: LexiconExpressionAdditional {
                expression: expression.into(),
                lexicon_id: Some(lexicon_id),
                kind: kind.into(),
            },
        }
    }
}

/// Payload of a remote lexicon
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LexiconAdditional {
    /// Expressions on the lexicon, present when requested
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lexicon_expressions: Vec<LexiconExpressionResource>,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A remote lexicon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconResource {
    /// Remote id
    pub id: LexiconId,
    /// Name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Payload
    #[serde(default)]
    pub additional: LexiconAdditional,
}

impl LexiconResource {
    /// Ids in `ids` that are not expressions of this lexicon
    pub fn missing_expressions(&self, ids: &[LexiconExpressionId]) -> Vec<LexiconExpressionId> {
        ids.iter()
            .copied()
            .filter(|id| {
                !self
                    .additional
                    .lexicon_expressions
                    .iter()
                    .any(|expression| expression.id == Some(*id))
            })
            .collect()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
