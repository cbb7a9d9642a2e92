// Copyright 2025 Cowboy AI, LLC.

//! Rule Classifications: a collection on a Classification Rule's sequence
//!
//! The collection applies exactly one Policy, the Classification, and matches
//! with a boolean condition whose two fragments point at the Classification's
//! Condition and at the rule root Condition.

use std::collections::HashMap;

use serde_json::{json, Value};
use tracing::{debug, info};

use super::ClassificationService;
use crate::domain::{RuleClassification, RuleClassificationInput};
use crate::errors::{ClassificationError, ClassificationResult};
use crate::identifiers::{
    ClassificationId, ClassificationRuleId, CollectionId, ConditionId, ProjectId,
    RuleClassificationId, WorkflowId,
};
use crate::linkage::{
    rule_classification_name, RULE_CLASSIFICATION_POINTER, RULE_CLASSIFICATION_ROOT,
    RULE_ROOT_POINTER,
};
use crate::paging::{project, Page, PageRequest};
use crate::policy_api::resources::{
    CollectionAdditional, CollectionResource, CollectionSequenceEntry, CollectionSequenceResource,
    ConditionResource,
};
use crate::policy_api::UpdateBehaviour;
use crate::saga::{Compensation, Saga};

impl ClassificationService {
    /// Attach a Classification to a Classification Rule
    pub async fn create_rule_classification(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
        input: RuleClassificationInput,
    ) -> ClassificationResult<RuleClassification> {
        let (_, sequence) = self.workflow_and_rule(project_id, workflow_id, rule_id).await?;
        let root = self.rule_root(project_id, &sequence).await?;
        let classification_id = input.classification_id;
        let classification_condition = self.classification_condition_id(project_id, classification_id).await?;

        let additional = CollectionAdditional {
            policy_ids: vec![classification_id],
            condition: Some(json!({
                "type": "condition",
                "name": RULE_CLASSIFICATION_ROOT,
                "notes": RULE_CLASSIFICATION_ROOT,
                "additional": {
                    "type": "boolean",
                    "operator": "and",
                    "notes": RULE_CLASSIFICATION_ROOT,
                    "children": [
                        fragment(classification_condition, RULE_CLASSIFICATION_POINTER),
                        fragment(root.id, RULE_ROOT_POINTER),
                    ]
                }
            })),
            ..CollectionAdditional::default()
        };

        let mut saga = Saga::new("create_rule_classification");
        let collection = saga
            .step(
                "create_collection",
                self.client.create_collection(
                    project_id,
                    rule_classification_name(workflow_id, rule_id, classification_id),
                    None,
                    &additional,
                ),
                |collection| {
                    let client = self.client.clone();
                    let project_id = project_id.clone();
                    let id = collection.id;
                    let condition_id = collection.condition_id();
                    Some(Compensation::new(format!("delete Collection {id}"), async move {
                        client.clear_collection_policies(&project_id, id).await?;
                        client.delete_collection(&project_id, id).await?;
                        if let Some(condition_id) = condition_id {
                            client.delete_condition(&project_id, condition_id).await?;
                        }
                        Ok(())
                    }))
                },
            )
            .await?;

        saga.run(
            "add_sequence_entry",
            self.client.add_sequence_entry(
                project_id,
                &sequence,
                CollectionSequenceEntry::for_collection(collection.id),
            ),
        )
        .await?;
        saga.complete();

        info!(
            project_id = %project_id,
            rule_id = %rule_id,
            rule_classification_id = %collection.id,
            classification_id = %classification_id,
            "Created Rule Classification"
        );
        Ok(RuleClassification::from(&collection))
    }

    /// Retrieve a Rule Classification of a Classification Rule
    pub async fn get_rule_classification(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
        id: RuleClassificationId,
    ) -> ClassificationResult<RuleClassification> {
        let (_, sequence) = self.workflow_and_rule(project_id, workflow_id, rule_id).await?;
        ensure_on_rule(&sequence, id)?;
        let collection = self.client.get_collection(project_id, id).await?;
        Ok(RuleClassification::from(&collection))
    }

    /// Retrieve one page of the Rule Classifications of a Classification Rule
    pub async fn list_rule_classifications(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
        page: PageRequest,
    ) -> ClassificationResult<Page<RuleClassification>> {
        let (_, sequence) = self.workflow_and_rule(project_id, workflow_id, rule_id).await?;
        let ids = project(&sequence.additional.collection_ids(), page, |id| *id);
        if ids.is_empty() {
            return Ok(Page::empty(ids.total_hits));
        }
        let collections: HashMap<CollectionId, CollectionResource> = self
            .client
            .get_collections(project_id, &ids.items)
            .await?
            .into_iter()
            .map(|collection| (collection.id, collection))
            .collect();

        let mut items = Vec::with_capacity(ids.items.len());
        for id in &ids.items {
            let collection = collections.get(id).ok_or_else(|| {
                ClassificationError::not_found(format!("Unable to find Rule Classification with ID: {id}"))
            })?;
            items.push(RuleClassification::from(collection));
        }
        Ok(Page::new(items, ids.total_hits))
    }

    /// Point a Rule Classification at another Classification
    ///
    /// The collection name follows the Classification it now applies.
    pub async fn update_rule_classification(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
        id: RuleClassificationId,
        input: RuleClassificationInput,
    ) -> ClassificationResult<RuleClassification> {
        let (_, sequence) = self.workflow_and_rule(project_id, workflow_id, rule_id).await?;
        ensure_on_rule(&sequence, id)?;
        let classification_id = input.classification_id;
        let classification_condition = self.classification_condition_id(project_id, classification_id).await?;
        let collection = self.client.get_collection(project_id, id).await?;
        let pointer = classification_fragment(&collection)?;

        let updated = self
            .client
            .update_collection(
                project_id,
                id,
                Some(rule_classification_name(workflow_id, rule_id, classification_id)),
                None,
                json!({ "policy_ids": [classification_id] }),
            )
            .await?;

        debug!(
            project_id = %project_id,
            rule_classification_id = %id,
            condition_id = %pointer.id,
            "Re-pointing Classification fragment"
        );
        self.client
            .update_condition(
                project_id,
                pointer.id,
                Some(RULE_CLASSIFICATION_POINTER.to_string()),
                fragment_additional(classification_condition, RULE_CLASSIFICATION_POINTER),
            )
            .await?;

        info!(
            project_id = %project_id,
            rule_classification_id = %id,
            classification_id = %classification_id,
            "Updated Rule Classification"
        );
        Ok(RuleClassification::from(&updated))
    }

    /// Detach one Rule Classification from its Classification Rule
    pub async fn delete_rule_classification(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
        id: RuleClassificationId,
    ) -> ClassificationResult<()> {
        let (_, mut sequence) = self.workflow_and_rule(project_id, workflow_id, rule_id).await?;
        ensure_on_rule(&sequence, id)?;
        sequence.additional.remove_collection(id);
        self.remove_rule_classifications(project_id, &sequence, &[id]).await?;
        info!(project_id = %project_id, rule_id = %rule_id, rule_classification_id = %id, "Deleted Rule Classification");
        Ok(())
    }

    /// Detach every Rule Classification from a Classification Rule
    pub async fn delete_all_rule_classifications(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
    ) -> ClassificationResult<()> {
        let (_, mut sequence) = self.workflow_and_rule(project_id, workflow_id, rule_id).await?;
        let ids = sequence.additional.clear_entries();
        self.remove_rule_classifications(project_id, &sequence, &ids).await?;
        info!(project_id = %project_id, rule_id = %rule_id, removed = ids.len(), "Deleted all Rule Classifications");
        Ok(())
    }

    /// Persist `sequence`, already stripped of `ids`, then delete the collections
    ///
    /// A collection's policy ids are cleared before it is deleted so the
    /// Classification it applied is no longer referenced. The boolean
    /// condition each collection matched with goes last.
    pub(crate) async fn remove_rule_classifications(
        &self,
        project_id: &ProjectId,
        sequence: &CollectionSequenceResource,
        ids: &[RuleClassificationId],
    ) -> ClassificationResult<()> {
        self.client
            .update_sequence(project_id, sequence, Some(UpdateBehaviour::Replace))
            .await?;
        if ids.is_empty() {
            return Ok(());
        }

        let collections = self.client.get_collections(project_id, ids).await?;
        for collection in &collections {
            self.client
                .clear_collection_policies(project_id, collection.id)
                .await?;
        }
        self.client.delete_collections(project_id, ids).await?;

        let conditions: Vec<ConditionId> = collections
            .iter()
            .filter_map(CollectionResource::condition_id)
            .collect();
        self.client.delete_conditions(project_id, &conditions).await
    }

    async fn classification_condition_id(
        &self,
        project_id: &ProjectId,
        classification_id: ClassificationId,
    ) -> ClassificationResult<ConditionId> {
        let (_, condition_id) = self
            .classification_policy(project_id, classification_id, || {
                format!("Unable to find Classification with ID: {classification_id}")
            })
            .await?;
        Ok(condition_id)
    }
}

fn ensure_on_rule(sequence: &CollectionSequenceResource, id: RuleClassificationId) -> ClassificationResult<()> {
    if sequence.additional.contains_collection(id) {
        Ok(())
    } else {
        Err(ClassificationError::not_found(format!(
            "Rule Classification ID: {id} not found on Classification Rule: {}",
            sequence.id
        )))
    }
}

fn fragment_additional(condition_id: ConditionId, notes: &str) -> Value {
    json!({ "type": "fragment", "value": condition_id, "notes": notes })
}

fn fragment(condition_id: ConditionId, marker: &str) -> Value {
    json!({
        "type": "condition",
        "name": marker,
        "notes": marker,
        "additional": fragment_additional(condition_id, marker)
    })
}

/// Whether a stored condition carries `marker` as its name or notes
fn has_marker(condition: &Value, marker: &str) -> bool {
    ["/name", "/notes", "/additional/notes"]
        .iter()
        .any(|path| condition.pointer(path).and_then(Value::as_str) == Some(marker))
}

/// Fragment of a collection's condition pointing at the Classification
fn classification_fragment(collection: &CollectionResource) -> ClassificationResult<ConditionResource> {
    let pointer = collection
        .additional
        .condition
        .as_ref()
        .and_then(|condition| condition.pointer("/additional/children"))
        .and_then(Value::as_array)
        .and_then(|children| {
            children
                .iter()
                .find(|child| has_marker(child, RULE_CLASSIFICATION_POINTER))
        });
    match pointer {
        Some(child) => Ok(serde_json::from_value(child.clone())?),
        None => Err(ClassificationError::server(format!(
            "Rule Classification ID: {} has no Classification fragment on its condition",
            collection.id
        ))),
    }
}
