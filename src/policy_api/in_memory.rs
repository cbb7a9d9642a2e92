// Copyright 2025 Cowboy AI, LLC.

//! In-memory emulation of the remote policy service
//!
//! Resources are held per project and type in insertion order. The emulation
//! covers the behaviour the orchestration relies on: id allocation, stored
//! condition children, `include_children`, filters, `ADD`/`REPLACE` child list
//! updates, cascading condition deletes and the refusal to delete a Policy
//! still referenced by a Collection. Failures can be injected per type and
//! verb.

use std::collections::HashMap;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use super::{IdSelector, PolicyApi, PolicyRequest, ResourceType, UpdateBehaviour, Verb};
use crate::errors::{ClassificationError, ClassificationResult, RemoteFailure};
use crate::identifiers::ProjectId;

type Store = IndexMap<i64, Value>;

/// A call received by the emulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedCall {
    /// Verb called
    pub verb: Verb,
    /// Resource type addressed
    pub kind: ResourceType,
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    kind: ResourceType,
    verb: Verb,
    failure: RemoteFailure,
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    stores: HashMap<(ProjectId, ResourceType), Store>,
    failures: Vec<InjectedFailure>,
    calls: Vec<RecordedCall>,
}

/// [`PolicyApi`] backed by in-memory stores
#[derive(Debug, Default)]
pub struct InMemoryPolicyApi {
    state: Mutex<State>,
}

impl InMemoryPolicyApi {
    /// Create an empty service
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every `verb` call for `kind` with `failure` until cleared
    pub async fn fail_on(&self, kind: ResourceType, verb: Verb, failure: RemoteFailure) {
        self.state.lock().await.failures.push(InjectedFailure {
            kind,
            verb,
            failure,
        });
    }

    /// Remove all injected failures
    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    /// Calls received so far, in order
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().await.calls.clone()
    }

    /// Number of stored resources of `kind`
    pub async fn count(&self, project_id: &ProjectId, kind: ResourceType) -> usize {
        let state = self.state.lock().await;
        state
            .stores
            .get(&(project_id.clone(), kind))
            .map_or(0, IndexMap::len)
    }

    /// A stored resource in the form a retrieve with children returns it
    pub async fn resource(&self, project_id: &ProjectId, kind: ResourceType, id: i64) -> Option<Value> {
        self.state.lock().await.render(project_id, kind, id, true)
    }
}

#[async_trait]
impl PolicyApi for InMemoryPolicyApi {
    async fn call(&self, verb: Verb, request: PolicyRequest) -> ClassificationResult<Value> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall {
            verb,
            kind: request.kind,
        });
        if let Some(injected) = state
            .failures
            .iter()
            .find(|failure| failure.kind == request.kind && failure.verb == verb)
        {
            debug!(kind = %request.kind, verb = verb.as_str(), "Injected Policy API failure");
            return Err(ClassificationError::Remote(injected.failure.clone()));
        }

        match verb {
            Verb::Create => Ok(state.create(&request)),
            Verb::Retrieve => state.retrieve(&request),
            Verb::Update => state.update(&request),
            Verb::Delete => state.delete(&request),
        }
    }
}

impl State {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn store(&mut self, project_id: &ProjectId, kind: ResourceType) -> &mut Store {
        self.stores.entry((project_id.clone(), kind)).or_default()
    }

    fn store_ref(&self, project_id: &ProjectId, kind: ResourceType) -> Option<&Store> {
        self.stores.get(&(project_id.clone(), kind))
    }

    fn exists(&self, project_id: &ProjectId, kind: ResourceType, id: i64) -> bool {
        self.store_ref(project_id, kind)
            .is_some_and(|store| store.contains_key(&id))
    }

    fn create(&mut self, request: &PolicyRequest) -> Value {
        let project_id = &request.project_id;
        let mut node = Map::new();
        if let Some(name) = &request.name {
            node.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(description) = &request.description {
            node.insert("description".to_string(), Value::String(description.clone()));
        }
        node.insert(
            "additional".to_string(),
            request.additional.clone().unwrap_or_else(|| json!({})),
        );

        let id = match request.kind {
            ResourceType::Condition => self.create_condition(project_id, node, None),
            ResourceType::Collection => {
                let id = self.allocate();
                let mut additional = take_object(node.remove("additional"));
                if let Some(Value::Object(condition)) = additional.remove("condition") {
                    let condition_id = self.create_condition(project_id, condition, None);
                    additional.insert("condition".to_string(), json!({ "id": condition_id }));
                }
                additional.entry("policy_ids").or_insert_with(|| json!([]));
                node.insert("additional".to_string(), Value::Object(additional));
                self.insert(project_id, ResourceType::Collection, id, node);
                id
            }
            ResourceType::Lexicon => {
                let id = self.allocate();
                let mut additional = take_object(node.remove("additional"));
                let expressions = additional.remove("lexicon_expressions");
                node.insert("additional".to_string(), Value::Object(additional));
                self.insert(project_id, ResourceType::Lexicon, id, node);
                if let Some(Value::Array(expressions)) = expressions {
                    for expression in expressions {
                        self.upsert_expression(project_id, id, expression);
                    }
                }
                id
            }
            kind => {
                let id = self.allocate();
                if let Some(Value::Object(additional)) = node.get_mut("additional") {
                    match kind {
                        ResourceType::CollectionSequence => {
                            additional
                                .entry("collection_sequence_entries")
                                .or_insert_with(|| json!([]));
                        }
                        ResourceType::SequenceWorkflow => {
                            additional
                                .entry("sequence_entries")
                                .or_insert_with(|| json!([]));
                        }
                        _ => {}
                    }
                }
                self.insert(project_id, kind, id, node);
                id
            }
        };
        self.render(project_id, request.kind, id, true)
            .unwrap_or(Value::Null)
    }

    fn insert(&mut self, project_id: &ProjectId, kind: ResourceType, id: i64, mut node: Map<String, Value>) {
        node.insert("id".to_string(), json!(id));
        node.insert("type".to_string(), Value::String(kind.as_str().to_string()));
        self.store(project_id, kind).insert(id, Value::Object(node));
    }

    fn create_condition(
        &mut self,
        project_id: &ProjectId,
        mut node: Map<String, Value>,
        parent: Option<i64>,
    ) -> i64 {
        let id = self.allocate();
        let mut additional = take_object(node.remove("additional"));
        let children = match additional.remove("children") {
            Some(Value::Array(children)) => children,
            _ => Vec::new(),
        };
        if let Some(parent) = parent {
            additional.insert("parent_condition_id".to_string(), json!(parent));
        }
        node.remove("id");
        node.insert("additional".to_string(), Value::Object(additional));
        self.insert(project_id, ResourceType::Condition, id, node);
        for child in children {
            if let Value::Object(child) = child {
                self.create_condition(project_id, child, Some(id));
            }
        }
        id
    }

    fn child_condition_ids(&self, project_id: &ProjectId, parent: i64) -> Vec<i64> {
        self.store_ref(project_id, ResourceType::Condition)
            .map(|store| {
                store
                    .iter()
                    .filter(|(_, node)| {
                        node.pointer("/additional/parent_condition_id")
                            .and_then(Value::as_i64)
                            == Some(parent)
                    })
                    .map(|(id, _)| *id)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn delete_condition_tree(&mut self, project_id: &ProjectId, id: i64) {
        for child in self.child_condition_ids(project_id, id) {
            self.delete_condition_tree(project_id, child);
        }
        self.store(project_id, ResourceType::Condition).shift_remove(&id);
    }

    fn render_condition(&self, project_id: &ProjectId, id: i64, include_children: bool) -> Option<Value> {
        let mut node = self
            .store_ref(project_id, ResourceType::Condition)?
            .get(&id)?
            .clone();
        let is_boolean = node.pointer("/additional/type").and_then(Value::as_str) == Some("boolean");
        if include_children && is_boolean {
            let children: Vec<Value> = self
                .child_condition_ids(project_id, id)
                .into_iter()
                .filter_map(|child| self.render_condition(project_id, child, true))
                .collect();
            if let Some(Value::Object(additional)) = node.get_mut("additional") {
                additional.insert("children".to_string(), Value::Array(children));
            }
        }
        Some(node)
    }

    fn render(&self, project_id: &ProjectId, kind: ResourceType, id: i64, include_children: bool) -> Option<Value> {
        match kind {
            ResourceType::Condition => self.render_condition(project_id, id, include_children),
            ResourceType::Collection => {
                let mut node = self.store_ref(project_id, kind)?.get(&id)?.clone();
                let condition_id = node
                    .pointer("/additional/condition/id")
                    .and_then(Value::as_i64);
                if let Some(condition_id) = condition_id {
                    if let Some(condition) = self.render_condition(project_id, condition_id, true) {
                        if let Some(Value::Object(additional)) = node.get_mut("additional") {
                            additional.insert("condition".to_string(), condition);
                        }
                    }
                }
                Some(node)
            }
            ResourceType::Lexicon => {
                let mut node = self.store_ref(project_id, kind)?.get(&id)?.clone();
                let expressions: Vec<Value> = self
                    .store_ref(project_id, ResourceType::LexiconExpression)
                    .map(|store| {
                        store
                            .values()
                            .filter(|expression| {
                                expression
                                    .pointer("/additional/lexicon_id")
                                    .and_then(Value::as_i64)
                                    == Some(id)
                            })
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                if let Some(Value::Object(additional)) = node.get_mut("additional") {
                    additional.insert("lexicon_expressions".to_string(), Value::Array(expressions));
                }
                Some(node)
            }
            _ => self.store_ref(project_id, kind)?.get(&id).cloned(),
        }
    }

    fn upsert_expression(&mut self, project_id: &ProjectId, lexicon_id: i64, expression: Value) {
        let mut node = take_object(Some(expression));
        let mut additional = take_object(node.remove("additional"));
        additional.insert("lexicon_id".to_string(), json!(lexicon_id));
        node.insert("additional".to_string(), Value::Object(additional));
        let existing = node
            .get("id")
            .and_then(Value::as_i64)
            .filter(|id| self.exists(project_id, ResourceType::LexiconExpression, *id));
        let id = match existing {
            Some(id) => id,
            None => self.allocate(),
        };
        self.insert(project_id, ResourceType::LexiconExpression, id, node);
    }

    fn delete_expressions_of(&mut self, project_id: &ProjectId, lexicon_id: i64) {
        self.store(project_id, ResourceType::LexiconExpression)
            .retain(|_, expression| {
                expression
                    .pointer("/additional/lexicon_id")
                    .and_then(Value::as_i64)
                    != Some(lexicon_id)
            });
    }

    fn retrieve(&self, request: &PolicyRequest) -> ClassificationResult<Value> {
        let project_id = &request.project_id;
        let kind = request.kind;
        let additional = request.additional.as_ref().and_then(Value::as_object);
        let include_children = additional
            .and_then(|additional| additional.get("include_children"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let filter = additional
            .and_then(|additional| additional.get("filter"))
            .and_then(Value::as_object);

        let matches: Vec<Value> = match &request.id {
            Some(selector) => {
                let ids = selector.ids();
                let mut found = Vec::with_capacity(ids.len());
                for id in &ids {
                    match self.render(project_id, kind, *id, include_children) {
                        Some(item) => found.push(item),
                        None => return Err(missing(kind, ids.len() > 1)),
                    }
                }
                found
            }
            None => self
                .store_ref(project_id, kind)
                .map(|store| {
                    store
                        .keys()
                        .filter_map(|id| self.render(project_id, kind, *id, include_children))
                        .filter(|item| filter.map_or(true, |filter| matches_filter(item, filter)))
                        .collect()
                })
                .unwrap_or_default(),
        };

        let total = matches.len();
        let skip = request.start.unwrap_or(1).saturating_sub(1);
        let take = request.max_page_results.unwrap_or(usize::MAX);
        let results: Vec<Value> = matches.into_iter().skip(skip).take(take).collect();
        Ok(json!({ "totalhits": total, "results": results }))
    }

    fn update(&mut self, request: &PolicyRequest) -> ClassificationResult<Value> {
        let project_id = &request.project_id;
        let kind = request.kind;
        let id = match &request.id {
            Some(IdSelector::One(id)) => *id,
            _ => {
                return Err(ClassificationError::Remote(RemoteFailure::new(
                    400,
                    "A single id is required for update",
                )))
            }
        };
        if !self.exists(project_id, kind, id) {
            return Err(missing(kind, false));
        }

        let mut incoming = take_object(request.additional.clone());
        match kind {
            ResourceType::Condition => {
                if let Some(Value::Array(children)) = incoming.remove("children") {
                    for child in self.child_condition_ids(project_id, id) {
                        self.delete_condition_tree(project_id, child);
                    }
                    for child in children {
                        if let Value::Object(child) = child {
                            self.create_condition(project_id, child, Some(id));
                        }
                    }
                }
            }
            ResourceType::Collection => {
                if let Some(Value::Object(condition)) = incoming.remove("condition") {
                    let previous = self
                        .render(project_id, kind, id, false)
                        .and_then(|node| node.pointer("/additional/condition/id").and_then(Value::as_i64));
                    if let Some(previous) = previous {
                        self.delete_condition_tree(project_id, previous);
                    }
                    let condition_id = self.create_condition(project_id, condition, None);
                    incoming.insert("condition".to_string(), json!({ "id": condition_id }));
                }
            }
            ResourceType::Lexicon => {
                if let Some(Value::Array(expressions)) = incoming.remove("lexicon_expressions") {
                    if request.update_behaviour != Some(UpdateBehaviour::Add) {
                        self.delete_expressions_of(project_id, id);
                    }
                    for expression in expressions {
                        self.upsert_expression(project_id, id, expression);
                    }
                }
            }
            ResourceType::CollectionSequence => {
                if request.update_behaviour == Some(UpdateBehaviour::Add) {
                    if let Some(Value::Array(added)) = incoming.remove("collection_sequence_entries") {
                        let mut entries = self
                            .store_ref(project_id, kind)
                            .and_then(|store| store.get(&id))
                            .and_then(|node| node.pointer("/additional/collection_sequence_entries"))
                            .and_then(Value::as_array)
                            .cloned()
                            .unwrap_or_default();
                        entries.extend(added);
                        incoming.insert("collection_sequence_entries".to_string(), Value::Array(entries));
                    }
                }
            }
            _ => {}
        }

        if let Some(Value::Object(node)) = self.store(project_id, kind).get_mut(&id) {
            if let Some(name) = &request.name {
                node.insert("name".to_string(), Value::String(name.clone()));
            }
            if let Some(description) = &request.description {
                node.insert("description".to_string(), Value::String(description.clone()));
            }
            let additional = node
                .entry("additional")
                .or_insert_with(|| json!({}));
            if let Value::Object(additional) = additional {
                // conditions and expressions are replaced whole, the parent link survives
                if matches!(kind, ResourceType::Condition | ResourceType::LexiconExpression) {
                    let parent = additional.remove("parent_condition_id");
                    let lexicon = additional.remove("lexicon_id");
                    additional.clear();
                    for (key, value) in [("parent_condition_id", parent), ("lexicon_id", lexicon)] {
                        if let Some(value) = value {
                            additional.insert(key.to_string(), value);
                        }
                    }
                }
                additional.extend(incoming);
            }
        }
        Ok(self.render(project_id, kind, id, true).unwrap_or(Value::Null))
    }

    fn delete(&mut self, request: &PolicyRequest) -> ClassificationResult<Value> {
        let project_id = &request.project_id;
        let kind = request.kind;
        let ids = request.id.as_ref().map(IdSelector::ids).unwrap_or_default();
        if let Some(id) = ids.iter().find(|id| !self.exists(project_id, kind, **id)) {
            debug!(kind = %kind, id, "Delete of unknown resource");
            return Err(missing(kind, ids.len() > 1));
        }

        if kind == ResourceType::Policy {
            for id in &ids {
                if let Some(collection) = self.collection_referencing(project_id, *id) {
                    return Ok(json!({
                        "reason": "Policy is in use",
                        "message": format!("Policy {id} is referenced by Collection {collection}")
                    }));
                }
            }
        }

        for id in ids {
            match kind {
                ResourceType::Condition => self.delete_condition_tree(project_id, id),
                ResourceType::Lexicon => {
                    self.delete_expressions_of(project_id, id);
                    self.store(project_id, kind).shift_remove(&id);
                }
                _ => {
                    self.store(project_id, kind).shift_remove(&id);
                }
            }
        }
        Ok(json!({ "result": "success" }))
    }

    fn collection_referencing(&self, project_id: &ProjectId, policy_id: i64) -> Option<i64> {
        self.store_ref(project_id, ResourceType::Collection)?
            .iter()
            .find(|(_, collection)| {
                collection
                    .pointer("/additional/policy_ids")
                    .and_then(Value::as_array)
                    .is_some_and(|ids| ids.iter().any(|id| id.as_i64() == Some(policy_id)))
            })
            .map(|(id, _)| *id)
    }
}

fn take_object(value: Option<Value>) -> Map<String, Value> {
    match value {
        Some(Value::Object(object)) => object,
        _ => Map::new(),
    }
}

fn matches_filter(item: &Value, filter: &Map<String, Value>) -> bool {
    filter.iter().all(|(key, expected)| {
        let actual = item
            .get(key)
            .or_else(|| item.get("additional").and_then(|additional| additional.get(key)));
        match actual {
            Some(actual) => actual == expected || as_text(actual) == as_text(expected),
            None => false,
        }
    })
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn missing(kind: ResourceType, many: bool) -> ClassificationError {
    let reason = match kind {
        ResourceType::Condition => "Could not return conditions for all ids",
        ResourceType::Lexicon if many => "Could not find a match for all Lexicon items requested.",
        ResourceType::Lexicon => "Could not find a match for the Lexicon requested.",
        ResourceType::LexiconExpression => {
            "Could not find a match for the LexiconExpression requested."
        }
        ResourceType::SequenceWorkflow => {
            "Could not find a match for the SequenceWorkflow requested."
        }
        ResourceType::CollectionSequence => {
            "Could not find a match for the CollectionSequence requested."
        }
        ResourceType::Collection => "Could not find a match for the Collection requested.",
        ResourceType::Policy => {
            return ClassificationError::Remote(
                RemoteFailure::new(500, "Internal server error")
                    .with_message("Could not retrieve Policy"),
            )
        }
    };
    ClassificationError::Remote(RemoteFailure::new(400, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project() -> ProjectId {
        ProjectId::new("tenant")
    }

    async fn create(api: &InMemoryPolicyApi, kind: ResourceType, additional: Value) -> Value {
        api.call(
            Verb::Create,
            PolicyRequest::new(&project(), kind).with_additional(additional),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_condition_children_are_stored_and_rendered() {
        let api = InMemoryPolicyApi::new();
        let created = create(
            &api,
            ResourceType::Condition,
            json!({"type": "boolean", "operator": "and", "children": [
                {"type": "condition", "additional": {"type": "exists", "field": "A"}},
                {"type": "condition", "additional": {"type": "boolean", "operator": "or", "children": []}}
            ]}),
        )
        .await;
        assert_eq!(api.count(&project(), ResourceType::Condition).await, 3);

        let id = created["id"].as_i64().unwrap();
        let without = api
            .call(
                Verb::Retrieve,
                PolicyRequest::new(&project(), ResourceType::Condition).with_id(id),
            )
            .await
            .unwrap();
        assert!(without["results"][0]["additional"].get("children").is_none());

        let with = api
            .call(
                Verb::Retrieve,
                PolicyRequest::new(&project(), ResourceType::Condition)
                    .with_id(id)
                    .with_additional(json!({"include_children": true})),
            )
            .await
            .unwrap();
        let children = with["results"][0]["additional"]["children"].as_array().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1]["additional"]["children"], json!([]));

        api.call(
            Verb::Delete,
            PolicyRequest::new(&project(), ResourceType::Condition).with_id(id),
        )
        .await
        .unwrap();
        assert_eq!(api.count(&project(), ResourceType::Condition).await, 0);
    }

    #[tokio::test]
    async fn test_filter_and_paging() {
        let api = InMemoryPolicyApi::new();
        for notes in ["a", "b", "a"] {
            create(&api, ResourceType::Condition, json!({"type": "exists", "notes": notes})).await;
        }
        let filtered = api
            .call(
                Verb::Retrieve,
                PolicyRequest::new(&project(), ResourceType::Condition)
                    .with_additional(json!({"filter": {"notes": "a"}})),
            )
            .await
            .unwrap();
        assert_eq!(filtered["totalhits"], json!(2));

        let paged = api
            .call(
                Verb::Retrieve,
                PolicyRequest::new(&project(), ResourceType::Condition).with_page(2, 1),
            )
            .await
            .unwrap();
        assert_eq!(paged["totalhits"], json!(3));
        assert_eq!(paged["results"].as_array().unwrap().len(), 1);
        assert_eq!(paged["results"][0]["additional"]["notes"], json!("b"));
    }

    #[tokio::test]
    async fn test_missing_ids_fail_with_remote_reason() {
        let api = InMemoryPolicyApi::new();
        let err = api
            .call(
                Verb::Retrieve,
                PolicyRequest::new(&project(), ResourceType::Lexicon).with_ids(vec![1i64, 2]),
            )
            .await
            .unwrap_err();
        assert!(err.is_remote_missing());
        assert!(err
            .to_string()
            .contains("Could not find a match for all Lexicon items requested."));
    }

    #[tokio::test]
    async fn test_lexicon_add_and_replace() {
        let api = InMemoryPolicyApi::new();
        let lexicon = create(
            &api,
            ResourceType::Lexicon,
            json!({"lexicon_expressions": [{"type": "lexicon_expression", "additional": {"type": "text", "expression": "cat"}}]}),
        )
        .await;
        let id = lexicon["id"].as_i64().unwrap();
        assert_eq!(lexicon["additional"]["lexicon_expressions"][0]["additional"]["lexicon_id"], json!(id));

        let update = |behaviour| {
            PolicyRequest::new(&project(), ResourceType::Lexicon)
                .with_id(id)
                .with_additional(json!({"lexicon_expressions": [
                    {"type": "lexicon_expression", "additional": {"type": "regex", "expression": "do+g"}}
                ]}))
                .with_update_behaviour(behaviour)
        };
        let added = api.call(Verb::Update, update(UpdateBehaviour::Add)).await.unwrap();
        assert_eq!(added["additional"]["lexicon_expressions"].as_array().unwrap().len(), 2);

        let replaced = api.call(Verb::Update, update(UpdateBehaviour::Replace)).await.unwrap();
        assert_eq!(replaced["additional"]["lexicon_expressions"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_policy_delete_refused_while_referenced() {
        let api = InMemoryPolicyApi::new();
        let policy = create(&api, ResourceType::Policy, json!({})).await;
        let policy_id = policy["id"].as_i64().unwrap();
        create(&api, ResourceType::Collection, json!({"policy_ids": [policy_id]})).await;

        let body = api
            .call(
                Verb::Delete,
                PolicyRequest::new(&project(), ResourceType::Policy).with_id(policy_id),
            )
            .await
            .unwrap();
        assert!(body.get("reason").is_some());
        assert_eq!(api.count(&project(), ResourceType::Policy).await, 1);
    }

    #[tokio::test]
    async fn test_injected_failures_and_call_log() {
        let api = InMemoryPolicyApi::new();
        api.fail_on(ResourceType::Policy, Verb::Create, RemoteFailure::new(503, "unavailable"))
            .await;

        let err = api
            .call(Verb::Create, PolicyRequest::new(&project(), ResourceType::Policy))
            .await
            .unwrap_err();
        assert!(matches!(err, ClassificationError::Remote(ref failure) if failure.status == 503));

        api.clear_failures().await;
        create(&api, ResourceType::Policy, json!({})).await;
        assert_eq!(
            api.calls().await,
            vec![
                RecordedCall { verb: Verb::Create, kind: ResourceType::Policy },
                RecordedCall { verb: Verb::Create, kind: ResourceType::Policy },
            ]
        );
    }
}
