// Copyright 2025 Cowboy AI, LLC.

//! Condition trees in their public form

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identifiers::{ConditionId, LexiconId};

/// Remote payload carried unchanged for condition types without a simplified form
pub type Passthrough = Map<String, Value>;

/// A node of a condition tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Condition {
    /// Remote id, absent until the condition is stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ConditionId>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Type specific payload
    pub additional: ConditionAdditional,
}

/// Payload of a condition node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConditionAdditional {
    /// Evaluation order among siblings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Free form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Type discriminated body
    #[serde(flatten)]
    pub body: ConditionBody,
}

/// Type discriminated body of a condition node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConditionBody {
    /// Combines child conditions with a boolean operator
    Boolean {
        /// `and` / `or`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operator: Option<String>,
        /// Child conditions, always present
        #[serde(default)]
        children: Vec<Condition>,
    },
    /// Regular expression match on a field
    Regex {
        /// Field to test
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        /// Pattern
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
    /// Date comparison
    Date(Comparison),
    /// Numeric comparison
    Number(Comparison),
    /// String comparison
    String(Comparison),
    /// Field presence
    Exists {
        /// Field to test
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },
    /// Match against the terms of a term list
    Termlist {
        /// Field to test
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        /// Term list to match against
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<LexiconId>,
    },
    /// Reference to another stored condition
    Fragment(Passthrough),
    /// Negation of a nested condition
    Not(Passthrough),
    /// Full text match
    Text(Passthrough),
}

/// Field / operator / value triple shared by the comparison types
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Comparison {
    /// Field to compare
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Comparison operator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Value to compare against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ConditionBody {
    /// The public type discriminator
    pub fn type_name(&self) -> &'static str {
        match self {
            ConditionBody::Boolean { .. } => "boolean",
            ConditionBody::Regex { .. } => "regex",
            ConditionBody::Date(_) => "date",
            ConditionBody::Number(_) => "number",
            ConditionBody::String(_) => "string",
            ConditionBody::Exists { .. } => "exists",
            ConditionBody::Termlist { .. } => "termlist",
            ConditionBody::Fragment(_) => "fragment",
            ConditionBody::Not(_) => "not",
            ConditionBody::Text(_) => "text",
        }
    }

    /// An `and` node without children
    pub fn empty_and() -> Self {
        ConditionBody::Boolean {
            operator: Some("and".to_string()),
            children: Vec::new(),
        }
    }
}

impl ConditionAdditional {
    /// Payload with the given body and no order or notes
    pub fn new(body: ConditionBody) -> Self {
        Self {
            order: None,
            notes: None,
            body,
        }
    }
}

impl Condition {
    /// Unsaved condition with the given payload
    pub fn new(additional: ConditionAdditional) -> Self {
        Self {
            id: None,
            name: None,
            additional,
        }
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Find the node with `id` in this tree, searching depth first
    pub fn find(&self, id: ConditionId) -> Option<&Condition> {
        if self.id == Some(id) {
            return Some(self);
        }
        match &self.additional.body {
            ConditionBody::Boolean { children, .. } => {
                children.iter().find_map(|child| child.find(id))
            }
            _ => None,
        }
    }
}

/// Which documents a Classification applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationTarget {
    /// The container and every descendant
    All,
    /// Every descendant but not the container
    Children,
    /// Only the container
    Container,
    /// The container and its immediate children
    ContainerAndImmediateChildren,
    /// Only the immediate children
    ImmediateChildren,
}

impl ClassificationTarget {
    /// All five targets
    pub const ALL_VALUES: [ClassificationTarget; 5] = [
        ClassificationTarget::All,
        ClassificationTarget::Children,
        ClassificationTarget::Container,
        ClassificationTarget::ContainerAndImmediateChildren,
        ClassificationTarget::ImmediateChildren,
    ];

    /// The `(include_descendants, target)` pair stored on the remote condition
    pub fn to_policy_properties(self) -> (bool, &'static str) {
        match self {
            ClassificationTarget::All => (true, "ALL"),
            ClassificationTarget::Children => (true, "CHILDREN"),
            ClassificationTarget::Container => (false, "CONTAINER"),
            ClassificationTarget::ContainerAndImmediateChildren => (false, "ALL"),
            ClassificationTarget::ImmediateChildren => (false, "CHILDREN"),
        }
    }

    /// Derive the target from the remote `(include_descendants, target)` pair
    ///
    /// The target string is matched case-insensitively. A container has no
    /// descendants, so `(true, "CONTAINER")` also maps to [`Container`](Self::Container).
    pub fn from_policy_properties(
        include_descendants: bool,
        target: &str,
    ) -> Option<ClassificationTarget> {
        match (include_descendants, target.to_ascii_uppercase().as_str()) {
            (true, "ALL") => Some(ClassificationTarget::All),
            (true, "CHILDREN") => Some(ClassificationTarget::Children),
            (_, "CONTAINER") => Some(ClassificationTarget::Container),
            (false, "ALL") => Some(ClassificationTarget::ContainerAndImmediateChildren),
            (false, "CHILDREN") => Some(ClassificationTarget::ImmediateChildren),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_boolean_condition_serialization() {
        let condition = Condition::new(ConditionAdditional {
            order: Some(1),
            notes: None,
            body: ConditionBody::Boolean {
                operator: Some("or".to_string()),
                children: vec![Condition::new(ConditionAdditional::new(
                    ConditionBody::Exists {
                        field: Some("TITLE".to_string()),
                    },
                ))],
            },
        });

        let value = serde_json::to_value(&condition).unwrap();
        assert_eq!(
            value,
            json!({
                "additional": {
                    "order": 1,
                    "type": "boolean",
                    "operator": "or",
                    "children": [
                        {"additional": {"type": "exists", "field": "TITLE"}}
                    ]
                }
            })
        );

        let back: Condition = serde_json::from_value(value).unwrap();
        assert_eq!(back, condition);
    }

    #[test]
    fn test_boolean_without_children_deserializes_empty() {
        let condition: Condition = serde_json::from_value(json!({
            "additional": {"type": "boolean", "operator": "and"}
        }))
        .unwrap();
        assert_eq!(condition.additional.body, ConditionBody::empty_and());
    }

    #[test]
    fn test_passthrough_keeps_unknown_fields() {
        let condition: Condition = serde_json::from_value(json!({
            "additional": {"type": "fragment", "value": 12, "extra": true}
        }))
        .unwrap();
        match &condition.additional.body {
            ConditionBody::Fragment(payload) => {
                assert_eq!(payload.get("value"), Some(&json!(12)));
                assert_eq!(payload.get("extra"), Some(&json!(true)));
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_find_nested_condition() {
        let mut leaf = Condition::new(ConditionAdditional::new(ConditionBody::Exists {
            field: Some("A".to_string()),
        }));
        leaf.id = Some(ConditionId::new(9));
        let mut inner = Condition::new(ConditionAdditional::new(ConditionBody::Boolean {
            operator: Some("and".to_string()),
            children: vec![leaf],
        }));
        inner.id = Some(ConditionId::new(4));
        let root = Condition::new(ConditionAdditional::new(ConditionBody::Boolean {
            operator: Some("or".to_string()),
            children: vec![inner],
        }));

        assert!(root.find(ConditionId::new(9)).is_some());
        assert!(root.find(ConditionId::new(4)).is_some());
        assert!(root.find(ConditionId::new(5)).is_none());
    }

    #[test]
    fn test_target_serialization() {
        assert_eq!(
            serde_json::to_value(ClassificationTarget::ContainerAndImmediateChildren).unwrap(),
            json!("CONTAINER_AND_IMMEDIATE_CHILDREN")
        );
    }
}
