// Copyright 2025 Cowboy AI, LLC.

//! Translation of condition trees between the public and the remote schema
//!
//! The public schema lets callers omit the node level `type` and names term
//! list conditions `termlist`. The remote schema requires `"type":"condition"`
//! on every node and calls the same condition `lexicon`. Reading goes the other
//! way and reduces each known condition type to the fields the public schema
//! exposes.
//!
//! Both directions walk caller or remote supplied trees recursively, so every
//! walk is bounded by a depth and a node budget.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::ServiceConfig;
use crate::domain::condition::{
    ClassificationTarget, Comparison, Condition, ConditionAdditional, ConditionBody, Passthrough,
};
use crate::errors::{ClassificationError, ClassificationResult};
use crate::identifiers::{ConditionId, LexiconId};

const MISSING_ADDITIONAL: &str =
    "Condition and any children it has must have 'additional' property defined.";

/// Bidirectional, type aware condition tree translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionTranscoder {
    max_depth: usize,
    max_nodes: usize,
}

impl Default for ConditionTranscoder {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}

/// Tracks how much of the depth and node budget a walk has used
struct Budget {
    max_depth: usize,
    max_nodes: usize,
    nodes: usize,
}

impl Budget {
    fn enter(&mut self, depth: usize) -> ClassificationResult<()> {
        if depth > self.max_depth {
            return Err(ClassificationError::StructureTooDeep {
                measure: "levels",
                limit: self.max_depth,
            });
        }
        self.nodes += 1;
        if self.nodes > self.max_nodes {
            return Err(ClassificationError::StructureTooDeep {
                measure: "nodes",
                limit: self.max_nodes,
            });
        }
        Ok(())
    }
}

impl ConditionTranscoder {
    /// Create a transcoder with explicit limits
    pub fn new(max_depth: usize, max_nodes: usize) -> Self {
        Self {
            max_depth,
            max_nodes,
        }
    }

    /// Create a transcoder using the configured limits
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.max_condition_depth, config.max_condition_nodes)
    }

    fn budget(&self) -> Budget {
        Budget {
            max_depth: self.max_depth,
            max_nodes: self.max_nodes,
            nodes: 0,
        }
    }

    /// Rewrite a condition tree in place into the remote form
    ///
    /// Adds `"type":"condition"` where a node has no type, renames `termlist`
    /// to `lexicon` and descends into boolean children and the nested condition
    /// of `not` nodes.
    pub fn to_remote_form(&self, node: &mut Value) -> ClassificationResult<()> {
        let mut budget = self.budget();
        normalize(node, 1, &mut budget)
    }

    /// Remote form of a public condition
    pub fn to_remote(&self, condition: &Condition) -> ClassificationResult<Value> {
        let mut node = serde_json::to_value(condition)?;
        self.to_remote_form(&mut node)?;
        Ok(node)
    }

    /// Remote form of a condition payload on its own
    pub fn additional_to_remote(
        &self,
        additional: &ConditionAdditional,
    ) -> ClassificationResult<Map<String, Value>> {
        let mut node = json!({ "additional": additional });
        self.to_remote_form(&mut node)?;
        match node {
            Value::Object(mut object) => match object.remove("additional") {
                Some(Value::Object(additional)) => Ok(additional),
                _ => Err(ClassificationError::InvalidStructure(
                    MISSING_ADDITIONAL.to_string(),
                )),
            },
            _ => Err(ClassificationError::InvalidStructure(
                "Condition must be an object".to_string(),
            )),
        }
    }

    /// Build the public form of a remote condition
    pub fn from_remote_form(&self, remote: &Value) -> ClassificationResult<Condition> {
        let mut budget = self.budget();
        decode_node(remote, 1, &mut budget)
    }

    /// Build the public form of a remote condition given as its parts
    pub fn from_remote_parts(
        &self,
        id: Option<ConditionId>,
        name: Option<&str>,
        additional: &Value,
    ) -> ClassificationResult<Condition> {
        let mut budget = self.budget();
        budget.enter(1)?;
        decode_parts(id, name.map(str::to_string), additional, 1, &mut budget)
    }

    /// Term list ids referenced anywhere in a condition tree
    ///
    /// Accepts either schema. Duplicates are removed, first occurrence wins.
    pub fn term_list_ids(&self, node: &Value) -> ClassificationResult<Vec<LexiconId>> {
        let mut budget = self.budget();
        let mut ids = Vec::new();
        collect_term_lists(node, 1, &mut budget, &mut ids)?;
        Ok(ids)
    }
}

fn normalize(node: &mut Value, depth: usize, budget: &mut Budget) -> ClassificationResult<()> {
    budget.enter(depth)?;
    let object = node.as_object_mut().ok_or_else(|| {
        ClassificationError::InvalidStructure("Condition must be an object".to_string())
    })?;
    object
        .entry("type")
        .or_insert_with(|| Value::String("condition".to_string()));

    let additional = object
        .get_mut("additional")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| ClassificationError::InvalidStructure(MISSING_ADDITIONAL.to_string()))?;

    if additional.get("type").and_then(Value::as_str) == Some("termlist") {
        additional.insert("type".to_string(), Value::String("lexicon".to_string()));
    }
    let is_not = additional.get("type").and_then(Value::as_str) == Some("not");

    match additional.get_mut("children") {
        None | Some(Value::Null) => {}
        Some(Value::Array(children)) => {
            for child in children.iter_mut() {
                normalize(child, depth + 1, budget)?;
            }
        }
        Some(_) => {
            return Err(ClassificationError::InvalidStructure(
                "'children' property should be an array.".to_string(),
            ))
        }
    }

    if is_not {
        if let Some(inner) = additional.get_mut("condition") {
            normalize(inner, depth + 1, budget)?;
        }
    }
    Ok(())
}

fn decode_node(node: &Value, depth: usize, budget: &mut Budget) -> ClassificationResult<Condition> {
    budget.enter(depth)?;
    let id = node.get("id").and_then(as_id).map(ConditionId::new);
    let name = node.get("name").and_then(Value::as_str).map(str::to_string);
    let additional = node
        .get("additional")
        .ok_or_else(|| ClassificationError::InvalidStructure(MISSING_ADDITIONAL.to_string()))?;
    decode_parts(id, name, additional, depth, budget)
}

fn decode_parts(
    id: Option<ConditionId>,
    name: Option<String>,
    additional: &Value,
    depth: usize,
    budget: &mut Budget,
) -> ClassificationResult<Condition> {
    let additional = additional
        .as_object()
        .ok_or_else(|| ClassificationError::InvalidStructure(MISSING_ADDITIONAL.to_string()))?;
    let kind = additional
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ClassificationError::UnrecognizedType("<missing>".to_string()))?;

    let body = match kind {
        "boolean" => {
            let mut children = Vec::new();
            match additional.get("children") {
                None | Some(Value::Null) => {}
                Some(Value::Array(items)) => {
                    for item in items {
                        children.push(decode_node(item, depth + 1, budget)?);
                    }
                }
                Some(_) => {
                    return Err(ClassificationError::InvalidStructure(
                        "'children' property should be an array.".to_string(),
                    ))
                }
            }
            ConditionBody::Boolean {
                operator: string_field(additional, "operator"),
                children,
            }
        }
        "regex" => ConditionBody::Regex {
            field: string_field(additional, "field"),
            value: value_field(additional, "value"),
        },
        "date" => ConditionBody::Date(comparison(additional)),
        "number" => ConditionBody::Number(comparison(additional)),
        "string" => ConditionBody::String(comparison(additional)),
        "exists" => ConditionBody::Exists {
            field: string_field(additional, "field"),
        },
        "lexicon" | "termlist" => ConditionBody::Termlist {
            field: string_field(additional, "field"),
            value: additional.get("value").and_then(as_id).map(LexiconId::new),
        },
        // TODO: give fragment, not and text a reduced public form once the
        // public schema defines one; until then the remote payload is exposed as is
        "fragment" => ConditionBody::Fragment(passthrough(additional)),
        "not" => ConditionBody::Not(passthrough(additional)),
        "text" => ConditionBody::Text(passthrough(additional)),
        other => {
            debug!(condition_type = other, "Unrecognised condition type");
            return Err(ClassificationError::UnrecognizedType(other.to_string()));
        }
    };

    Ok(Condition {
        id,
        name,
        additional: ConditionAdditional {
            order: additional.get("order").and_then(Value::as_i64),
            notes: string_field(additional, "notes"),
            body,
        },
    })
}

fn collect_term_lists(
    node: &Value,
    depth: usize,
    budget: &mut Budget,
    ids: &mut Vec<LexiconId>,
) -> ClassificationResult<()> {
    budget.enter(depth)?;
    let Some(additional) = node.get("additional").and_then(Value::as_object) else {
        debug!("Condition without 'additional' payload while looking for term lists");
        return Ok(());
    };
    match additional.get("type").and_then(Value::as_str) {
        Some("termlist") | Some("lexicon") => {
            let id = additional
                .get("value")
                .and_then(as_id)
                .map(LexiconId::new)
                .ok_or_else(|| {
                    ClassificationError::invalid_argument(
                        "Invalid 'termlist' type definition on Condition 'additional'.",
                    )
                })?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Some("boolean") => match additional.get("children") {
            None | Some(Value::Null) => {}
            Some(Value::Array(children)) => {
                for child in children {
                    collect_term_lists(child, depth + 1, budget, ids)?;
                }
            }
            Some(_) => {
                return Err(ClassificationError::invalid_argument(
                    "Invalid 'boolean' type definition on Condition 'additional', 'children' property should be an array.",
                ))
            }
        },
        _ => {}
    }
    Ok(())
}

/// Classification target encoded on a remote condition payload
///
/// Returns `None` when the payload carries no target.
pub fn classification_target(
    additional: &Map<String, Value>,
) -> ClassificationResult<Option<ClassificationTarget>> {
    let Some(target) = additional.get("target").and_then(Value::as_str) else {
        return Ok(None);
    };
    let include_descendants = additional
        .get("include_descendants")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    ClassificationTarget::from_policy_properties(include_descendants, target)
        .map(Some)
        .ok_or_else(|| {
            ClassificationError::invalid_argument(format!(
                "Unrecognised classification target ({include_descendants}, {target})"
            ))
        })
}

/// Write the `(include_descendants, target)` pair for `target` onto a remote payload
pub fn apply_classification_target(
    additional: &mut Map<String, Value>,
    target: ClassificationTarget,
) {
    let (include_descendants, target) = target.to_policy_properties();
    additional.insert(
        "include_descendants".to_string(),
        Value::Bool(include_descendants),
    );
    additional.insert("target".to_string(), Value::String(target.to_string()));
}

fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

fn string_field(additional: &Map<String, Value>, key: &str) -> Option<String> {
    additional.get(key).and_then(Value::as_str).map(str::to_string)
}

fn value_field(additional: &Map<String, Value>, key: &str) -> Option<Value> {
    additional.get(key).filter(|value| !value.is_null()).cloned()
}

fn comparison(additional: &Map<String, Value>) -> Comparison {
    Comparison {
        field: string_field(additional, "field"),
        operator: string_field(additional, "operator"),
        value: value_field(additional, "value"),
    }
}

fn passthrough(additional: &Map<String, Value>) -> Passthrough {
    additional
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "type" | "order" | "notes"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    fn transcoder() -> ConditionTranscoder {
        ConditionTranscoder::new(16, 500)
    }

    #[test]
    fn test_to_remote_form_adds_types_and_renames_termlist() {
        let mut tree = json!({
            "additional": {
                "type": "boolean",
                "operator": "and",
                "children": [
                    {"additional": {"type": "termlist", "field": "CONTENT", "value": 3}},
                    {"additional": {"type": "not", "condition": {
                        "additional": {"type": "termlist", "field": "TITLE", "value": 4}
                    }}}
                ]
            }
        });

        transcoder().to_remote_form(&mut tree).unwrap();

        assert_eq!(
            tree,
            json!({
                "type": "condition",
                "additional": {
                    "type": "boolean",
                    "operator": "and",
                    "children": [
                        {"type": "condition", "additional": {"type": "lexicon", "field": "CONTENT", "value": 3}},
                        {"type": "condition", "additional": {"type": "not", "condition": {
                            "type": "condition",
                            "additional": {"type": "lexicon", "field": "TITLE", "value": 4}
                        }}}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_to_remote_form_requires_additional() {
        let mut tree = json!({
            "additional": {"type": "boolean", "children": [{"name": "no payload"}]}
        });
        let err = transcoder().to_remote_form(&mut tree).unwrap_err();
        assert!(matches!(err, ClassificationError::InvalidStructure(_)));
    }

    #[test]
    fn test_from_remote_form_reduces_known_types() {
        let remote = json!({
            "id": 10,
            "name": "root",
            "type": "condition",
            "additional": {
                "type": "boolean",
                "operator": "or",
                "order": 100,
                "notes": "API_CLASSIFICATION",
                "include_descendants": true,
                "target": "ALL",
                "children": [
                    {"id": 11, "type": "condition", "additional": {
                        "type": "string", "field": "TITLE", "operator": "is", "value": "cat",
                        "condition_type": "string"
                    }},
                    {"id": 12, "type": "condition", "additional": {
                        "type": "lexicon", "field": "CONTENT", "value": 8, "lexicon_id": 8
                    }},
                    {"id": 13, "type": "condition", "additional": {
                        "type": "boolean", "operator": "and", "children": null
                    }}
                ]
            }
        });

        let condition = transcoder().from_remote_form(&remote).unwrap();

        let expected: Condition = serde_json::from_value(json!({
            "id": 10,
            "name": "root",
            "additional": {
                "type": "boolean",
                "operator": "or",
                "order": 100,
                "notes": "API_CLASSIFICATION",
                "children": [
                    {"id": 11, "additional": {"type": "string", "field": "TITLE", "operator": "is", "value": "cat"}},
                    {"id": 12, "additional": {"type": "termlist", "field": "CONTENT", "value": 8}},
                    {"id": 13, "additional": {"type": "boolean", "operator": "and", "children": []}}
                ]
            }
        }))
        .unwrap();
        assert_eq!(condition, expected);
    }

    #[test]
    fn test_from_remote_form_rejects_unknown_type() {
        let remote = json!({"additional": {"type": "mystery"}});
        let err = transcoder().from_remote_form(&remote).unwrap_err();
        assert!(matches!(err, ClassificationError::UnrecognizedType(ref t) if t == "mystery"));
    }

    #[test]
    fn test_passthrough_types_keep_payload() {
        let remote = json!({
            "type": "condition",
            "additional": {"type": "fragment", "value": 44, "notes": "API_CLASSIFICATION_RULE_CLASSIFICATION"}
        });
        let condition = transcoder().from_remote_form(&remote).unwrap();
        assert_eq!(
            condition.additional.notes.as_deref(),
            Some("API_CLASSIFICATION_RULE_CLASSIFICATION")
        );
        match condition.additional.body {
            ConditionBody::Fragment(payload) => assert_eq!(payload.get("value"), Some(&json!(44))),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_depth_limit() {
        let mut tree = json!({"additional": {"type": "exists", "field": "A"}});
        for _ in 0..20 {
            tree = json!({"additional": {"type": "boolean", "operator": "and", "children": [tree]}});
        }
        let limited = ConditionTranscoder::new(8, 1000);

        let err = limited.to_remote_form(&mut tree.clone()).unwrap_err();
        assert!(matches!(
            err,
            ClassificationError::StructureTooDeep { measure: "levels", limit: 8 }
        ));
        let err = limited.from_remote_form(&tree).unwrap_err();
        assert!(matches!(err, ClassificationError::StructureTooDeep { .. }));
        let err = limited.term_list_ids(&tree).unwrap_err();
        assert!(matches!(err, ClassificationError::StructureTooDeep { .. }));
    }

    #[test]
    fn test_node_limit() {
        let children: Vec<Value> = (0..10)
            .map(|i| json!({"additional": {"type": "exists", "field": format!("F{i}")}}))
            .collect();
        let mut tree = json!({"additional": {"type": "boolean", "children": children}});
        let err = ConditionTranscoder::new(8, 5)
            .to_remote_form(&mut tree)
            .unwrap_err();
        assert!(matches!(
            err,
            ClassificationError::StructureTooDeep { measure: "nodes", limit: 5 }
        ));
    }

    #[test]
    fn test_term_list_ids_deduplicated() {
        let tree = json!({
            "additional": {
                "type": "boolean",
                "children": [
                    {"additional": {"type": "termlist", "value": 5}},
                    {"additional": {"type": "boolean", "children": [
                        {"additional": {"type": "lexicon", "value": 7}},
                        {"additional": {"type": "termlist", "value": 5}}
                    ]}},
                    {"additional": {"type": "exists", "field": "X"}}
                ]
            }
        });
        let ids = transcoder().term_list_ids(&tree).unwrap();
        assert_eq!(ids, vec![LexiconId::new(5), LexiconId::new(7)]);
    }

    #[test]
    fn test_term_list_without_value_is_invalid() {
        let tree = json!({"additional": {"type": "termlist", "field": "X"}});
        let err = transcoder().term_list_ids(&tree).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test_case(ClassificationTarget::All ; "all")]
    #[test_case(ClassificationTarget::Children ; "children")]
    #[test_case(ClassificationTarget::Container ; "container")]
    #[test_case(ClassificationTarget::ContainerAndImmediateChildren ; "container and immediate children")]
    #[test_case(ClassificationTarget::ImmediateChildren ; "immediate children")]
    fn test_target_round_trip(target: ClassificationTarget) {
        let mut additional = Map::new();
        apply_classification_target(&mut additional, target);
        assert_eq!(classification_target(&additional).unwrap(), Some(target));
    }

    #[test_case(true, "SIBLINGS" ; "unknown target with descendants")]
    #[test_case(false, "PARENT" ; "unknown target without descendants")]
    #[test_case(false, "" ; "empty target")]
    fn test_unknown_target_pair(include_descendants: bool, target: &str) {
        let mut additional = Map::new();
        additional.insert("include_descendants".to_string(), json!(include_descendants));
        additional.insert("target".to_string(), json!(target));
        let err = classification_target(&additional).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_target_is_case_insensitive() {
        let mut additional = Map::new();
        additional.insert("include_descendants".to_string(), json!(false));
        additional.insert("target".to_string(), json!("children"));
        assert_eq!(
            classification_target(&additional).unwrap(),
            Some(ClassificationTarget::ImmediateChildren)
        );
    }

    fn leaf_strategy() -> impl Strategy<Value = Value> {
        let field = "[A-Z]{1,6}";
        prop_oneof![
            (field, "[a-z.*]{0,5}").prop_map(|(f, v)| json!({"type": "regex", "field": f, "value": v})),
            (field, "(is|before|after)", "[a-z0-9]{0,4}").prop_map(|(f, o, v)| json!({"type": "string", "field": f, "operator": o, "value": v})),
            (field, "(lt|gt|eq)", any::<i32>()).prop_map(|(f, o, v)| json!({"type": "number", "field": f, "operator": o, "value": v})),
            (field, "(before|after)", "[0-9]{4}").prop_map(|(f, o, v)| json!({"type": "date", "field": f, "operator": o, "value": v})),
            field.prop_map(|f| json!({"type": "exists", "field": f})),
            (field, 1i64..500).prop_map(|(f, v)| json!({"type": "lexicon", "field": f, "value": v})),
            (1i64..500).prop_map(|v| json!({"type": "fragment", "value": v})),
            (field, "[a-z ]{0,8}").prop_map(|(f, v)| json!({"type": "text", "field": f, "value": v})),
        ]
        .prop_map(|additional| json!({"type": "condition", "additional": additional}))
    }

    fn tree_strategy() -> impl Strategy<Value = Value> {
        leaf_strategy().prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                (prop::collection::vec(inner.clone(), 0..4), "(and|or)", prop::option::of(0i64..10))
                    .prop_map(|(children, operator, order)| {
                        let mut additional = json!({"type": "boolean", "operator": operator, "children": children});
                        if let Some(order) = order {
                            additional["order"] = json!(order);
                        }
                        json!({"type": "condition", "additional": additional})
                    }),
                inner.prop_map(|condition| json!({
                    "type": "condition",
                    "additional": {"type": "not", "condition": condition}
                })),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_round_trip_is_stable(remote in tree_strategy()) {
            let transcoder = transcoder();
            let first = transcoder.from_remote_form(&remote).unwrap();
            let back_to_remote = transcoder.to_remote(&first).unwrap();
            let second = transcoder.from_remote_form(&back_to_remote).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
