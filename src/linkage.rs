// Copyright 2025 Cowboy AI, LLC.

//! Synthetic cross-references between remote resources
//!
//! The remote policy service has no field to relate a Policy to a Condition or
//! to tag a Condition as the root of a rule. Links are therefore written into
//! `name`/`notes` fields as fixed marker strings. Inside the crate links are
//! typed values ([`ClassificationLink`]); the marker strings only appear when
//! a resource crosses the remote boundary.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ClassificationError, ClassificationResult};
use crate::identifiers::{
    ClassificationId, ClassificationRuleId, ConditionId, PolicyId, WorkflowId,
};

/// Prefix of a Classification Condition name, followed by the Policy id
pub const CONDITION_NAME_PREFIX: &str = "CLASSIFICATION_POLICY_ID:";
/// Prefix of a Classification Policy name, followed by the Condition id
pub const POLICY_NAME_PREFIX: &str = "CLASSIFICATION_CONDITION_ID:";
/// Notes marker placed on every Classification Condition
pub const CLASSIFICATION_NOTES: &str = "API_CLASSIFICATION";
/// Prefix of the name and notes of a rule root Condition, followed by the rule id
pub const RULE_ROOT_PREFIX: &str = "API_CLASSIFICATION_RULE_ID:";
/// Name and notes of the fragment pointing at a Classification Condition
pub const RULE_CLASSIFICATION_POINTER: &str = "API_CLASSIFICATION_RULE_CLASSIFICATION";
/// Name and notes of the fragment pointing at a rule root Condition
pub const RULE_ROOT_POINTER: &str = "API_CLASSIFICATION_CLASSIFICATION_RULE_ROOT";
/// Name and notes of the boolean root Condition of a Rule Classification
pub const RULE_CLASSIFICATION_ROOT: &str = "API_CLASSIFICATION_RULE_CLASSIFICATION_ROOT";
/// Placeholder name given to a Condition before its Policy exists
pub const CREATE_PLACEHOLDER: &str = "CREATE_PLACEHOLDER";
/// Placeholder name given to a Collection about to be deleted
pub const DELETE_PLACEHOLDER: &str = "DELETE_PLACEHOLDER";

/// Append `id` to `prefix`
pub fn encode(prefix: &str, id: impl std::fmt::Display) -> String {
    format!("{prefix}{id}")
}

/// Extract the id following `prefix`
///
/// Returns `None` when the value is absent, does not start with the prefix, or
/// the remainder is empty or not a number.
pub fn decode(value: Option<&str>, prefix: &str) -> Option<i64> {
    let suffix = value?.strip_prefix(prefix)?;
    if suffix.is_empty() {
        return None;
    }
    match suffix.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            debug!(value = suffix, prefix, "Link suffix is not a numeric id");
            None
        }
    }
}

/// Mutual link between the Policy and the Condition backing a Classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassificationLink {
    /// Policy id, which is also the Classification id
    pub policy_id: PolicyId,
    /// Condition holding the Classification's condition tree
    pub condition_id: ConditionId,
}

impl ClassificationLink {
    /// Link a Policy and a Condition
    pub fn new(policy_id: PolicyId, condition_id: ConditionId) -> Self {
        Self {
            policy_id,
            condition_id,
        }
    }

    /// Name written on the Condition, pointing back at the Policy
    pub fn condition_name(&self) -> String {
        condition_name_for(self.policy_id)
    }

    /// Name written on the Policy, pointing at the Condition
    pub fn policy_name(&self) -> String {
        policy_name_for(self.condition_id)
    }
}

/// Condition name that points at `policy_id`
pub fn condition_name_for(policy_id: PolicyId) -> String {
    encode(CONDITION_NAME_PREFIX, policy_id)
}

/// Policy name that points at `condition_id`
pub fn policy_name_for(condition_id: ConditionId) -> String {
    encode(POLICY_NAME_PREFIX, condition_id)
}

/// Condition id encoded in a Classification Policy name
pub fn condition_id_from_policy_name(name: Option<&str>) -> Option<ConditionId> {
    decode(name, POLICY_NAME_PREFIX).map(ConditionId::new)
}

/// Policy id encoded in a Classification Condition name
pub fn policy_id_from_condition_name(name: Option<&str>) -> Option<PolicyId> {
    decode(name, CONDITION_NAME_PREFIX).map(PolicyId::new)
}

/// Name and notes value of the root Condition of a Classification Rule
pub fn rule_root_notes(rule_id: ClassificationRuleId) -> String {
    encode(RULE_ROOT_PREFIX, rule_id)
}

/// Name of the Collection backing a Rule Classification
pub fn rule_classification_name(
    workflow_id: WorkflowId,
    rule_id: ClassificationRuleId,
    classification_id: ClassificationId,
) -> String {
    format!(
        "API_CLASSIFICATION_WORKFLOW:{workflow_id}:CLASSIFICATION_RULE:{rule_id}:CLASSIFICATION:{classification_id}"
    )
}

/// Caller metadata of a Classification, stored in the Policy description
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyDescription {
    /// Classification name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Classification description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Classification type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl PolicyDescription {
    /// Encode as the Policy description string
    ///
    /// The object is JSON encoded and the result encoded again as a JSON
    /// string, which is the form existing remote data uses.
    pub fn encode(&self) -> ClassificationResult<String> {
        let inner = serde_json::to_string(self)?;
        Ok(serde_json::to_string(&inner)?)
    }

    /// Decode a Policy description string
    pub fn decode(raw: Option<&str>) -> ClassificationResult<Self> {
        let raw = raw.ok_or_else(|| {
            ClassificationError::server("Unable to extract properties from Policy Description")
        })?;
        let inner: String = serde_json::from_str(raw).map_err(|_| {
            ClassificationError::server("Unable to extract properties from Policy Description")
        })?;
        serde_json::from_str(&inner).map_err(|_| {
            ClassificationError::server("Unable to extract properties from Policy Description")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case(Some("CLASSIFICATION_POLICY_ID:42") => Some(42) ; "valid id")]
    #[test_case(Some("CLASSIFICATION_POLICY_ID:") => None ; "empty suffix")]
    #[test_case(Some("foo") => None ; "prefix absent")]
    #[test_case(Some("CLASSIFICATION_POLICY_ID:abc") => None ; "non numeric")]
    #[test_case(None => None ; "no value")]
    #[test_case(Some("CREATE_PLACEHOLDER") => None ; "placeholder name")]
    fn test_decode(value: Option<&str>) -> Option<i64> {
        decode(value, CONDITION_NAME_PREFIX)
    }

    #[test]
    fn test_classification_link_names() {
        let link = ClassificationLink::new(PolicyId::new(7), ConditionId::new(12));
        assert_eq!(link.condition_name(), "CLASSIFICATION_POLICY_ID:7");
        assert_eq!(link.policy_name(), "CLASSIFICATION_CONDITION_ID:12");
        assert_eq!(
            condition_id_from_policy_name(Some(&link.policy_name())),
            Some(ConditionId::new(12))
        );
        assert_eq!(
            policy_id_from_condition_name(Some(&link.condition_name())),
            Some(PolicyId::new(7))
        );
    }

    #[test]
    fn test_rule_markers() {
        assert_eq!(
            rule_root_notes(ClassificationRuleId::new(5)),
            "API_CLASSIFICATION_RULE_ID:5"
        );
        assert_eq!(
            rule_classification_name(
                WorkflowId::new(1),
                ClassificationRuleId::new(2),
                ClassificationId::new(3)
            ),
            "API_CLASSIFICATION_WORKFLOW:1:CLASSIFICATION_RULE:2:CLASSIFICATION:3"
        );
    }

    #[test]
    fn test_policy_description_is_double_encoded() {
        let description = PolicyDescription {
            name: Some("Invoices".to_string()),
            description: None,
            kind: Some("finance".to_string()),
        };
        let encoded = description.encode().unwrap();
        assert_eq!(encoded, r#""{\"name\":\"Invoices\",\"type\":\"finance\"}""#);
        assert_eq!(PolicyDescription::decode(Some(&encoded)).unwrap(), description);
    }

    #[test]
    fn test_policy_description_rejects_plain_text() {
        let err = PolicyDescription::decode(Some("a plain description")).unwrap_err();
        assert!(matches!(err, ClassificationError::ServerError(_)));
        assert!(PolicyDescription::decode(None).is_err());
    }

    proptest! {
        #[test]
        fn prop_encode_then_decode(id in any::<i64>()) {
            let encoded = encode(RULE_ROOT_PREFIX, id);
            prop_assert_eq!(decode(Some(&encoded), RULE_ROOT_PREFIX), Some(id));
        }
    }
}
