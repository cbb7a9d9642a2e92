// Copyright 2025 Cowboy AI, LLC.

//! Classification Rules: a collection sequence ordered on a Workflow

use std::collections::HashMap;

use serde_json::json;
use tracing::{debug, info};

use super::ClassificationService;
use crate::domain::{ClassificationRule, ClassificationRuleInput};
use crate::errors::{ClassificationError, ClassificationResult};
use crate::identifiers::{ClassificationRuleId, CollectionSequenceId, ProjectId, WorkflowId};
use crate::linkage::rule_root_notes;
use crate::paging::{project, Page, PageRequest};
use crate::policy_api::resources::{
    CollectionSequenceAdditional, CollectionSequenceResource, WorkflowResource,
};
use crate::policy_api::UpdateBehaviour;
use crate::saga::{Compensation, Saga};

impl ClassificationService {
    /// Create a Classification Rule on a Workflow
    ///
    /// Without a priority the rule is appended after the last one. With a
    /// priority every rule at or after it moves down by one.
    pub async fn create_classification_rule(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        input: ClassificationRuleInput,
    ) -> ClassificationResult<ClassificationRule> {
        let mut workflow = self.client.get_workflow(project_id, workflow_id).await?;

        let mut saga = Saga::new("create_classification_rule");
        let sequence = saga
            .step(
                "create_sequence",
                self.client.create_sequence(
                    project_id,
                    input.name,
                    input.description,
                    &CollectionSequenceAdditional::default(),
                ),
                |sequence| {
                    let client = self.client.clone();
                    let project_id = project_id.clone();
                    let id = sequence.id;
                    Some(Compensation::new(format!("delete Collection Sequence {id}"), async move {
                        client.delete_sequence(&project_id, id).await
                    }))
                },
            )
            .await?;

        let priority = workflow
            .additional
            .insert_entry(sequence.id, workflow_id, input.priority);
        saga.step(
            "add_workflow_entry",
            self.client.update_workflow(project_id, &workflow),
            |_| {
                let client = self.client.clone();
                let project_id = project_id.clone();
                let sequence_id = sequence.id;
                Some(Compensation::new(
                    format!("remove Collection Sequence {sequence_id} from Workflow {workflow_id}"),
                    async move {
                        let mut workflow = client.get_workflow(&project_id, workflow_id).await?;
                        if workflow.additional.remove_entry(sequence_id).is_some() {
                            client.update_workflow(&project_id, &workflow).await?;
                        }
                        Ok(())
                    },
                ))
            },
        )
        .await?;

        saga.run(
            "create_root_condition",
            self.client.create_condition(
                project_id,
                Some(rule_root_notes(sequence.id)),
                json!({
                    "type": "boolean",
                    "operator": "and",
                    "notes": rule_root_notes(sequence.id),
                    "children": []
                }),
            ),
        )
        .await?;
        saga.complete();

        info!(
            project_id = %project_id,
            workflow_id = %workflow_id,
            rule_id = %sequence.id,
            priority,
            "Created Classification Rule"
        );
        Ok(ClassificationRule::from_sequence(&sequence, priority))
    }

    /// Retrieve a Classification Rule of a Workflow
    pub async fn get_classification_rule(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
    ) -> ClassificationResult<ClassificationRule> {
        let (workflow, sequence) = self.workflow_and_rule(project_id, workflow_id, rule_id).await?;
        let priority = rule_priority(&workflow, rule_id)?;
        Ok(ClassificationRule::from_sequence(&sequence, priority))
    }

    /// Retrieve one page of the Classification Rules of a Workflow, by priority
    pub async fn list_classification_rules(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        page: PageRequest,
    ) -> ClassificationResult<Page<ClassificationRule>> {
        let workflow = self.client.get_workflow(project_id, workflow_id).await?;
        let entries = workflow.additional.entries_by_order();
        let selected = project(&entries, page, |entry| (entry.collection_sequence_id, entry.order));
        if selected.is_empty() {
            return Ok(Page::empty(selected.total_hits));
        }

        let ids: Vec<CollectionSequenceId> = selected.items.iter().map(|(id, _)| *id).collect();
        let sequences: HashMap<CollectionSequenceId, CollectionSequenceResource> = self
            .client
            .get_sequences(project_id, &ids)
            .await?
            .into_iter()
            .map(|sequence| (sequence.id, sequence))
            .collect();

        let mut items = Vec::with_capacity(selected.items.len());
        for (id, order) in &selected.items {
            let sequence = sequences.get(id).ok_or_else(|| {
                ClassificationError::not_found(format!("Unable to find Classification Rule with ID: {id}"))
            })?;
            items.push(ClassificationRule::from_sequence(sequence, *order));
        }
        Ok(Page::new(items, selected.total_hits))
    }

    /// Update the name, description and priority of a Classification Rule
    ///
    /// The priority overwrites the rule's order in place; other rules keep
    /// theirs.
    pub async fn update_classification_rule(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
        input: ClassificationRuleInput,
    ) -> ClassificationResult<ClassificationRule> {
        let (mut workflow, mut sequence) = self.workflow_and_rule(project_id, workflow_id, rule_id).await?;

        sequence.name = Some(input.name);
        sequence.description = input.description;
        sequence.additional.collection_sequence_entries.clear();
        let updated = self
            .client
            .update_sequence(project_id, &sequence, Some(UpdateBehaviour::Add))
            .await?;

        if let Some(priority) = input.priority {
            workflow.additional.set_order(rule_id, priority);
        }
        let priority = rule_priority(&workflow, rule_id)?;
        self.client.update_workflow(project_id, &workflow).await?;

        info!(project_id = %project_id, rule_id = %rule_id, priority, "Updated Classification Rule");
        Ok(ClassificationRule::from_sequence(&updated, priority))
    }

    /// Delete a Classification Rule with everything hanging off it
    pub async fn delete_classification_rule(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
    ) -> ClassificationResult<()> {
        let (mut workflow, mut sequence) = self.workflow_and_rule(project_id, workflow_id, rule_id).await?;

        let collection_ids = sequence.additional.clear_entries();
        self.remove_rule_classifications(project_id, &sequence, &collection_ids)
            .await?;

        workflow.additional.remove_entry(rule_id);
        self.client.update_workflow(project_id, &workflow).await?;

        match self
            .client
            .find_condition_by_notes(project_id, &rule_root_notes(rule_id))
            .await?
        {
            Some(root) => self.client.delete_condition(project_id, root.id).await?,
            None => debug!(project_id = %project_id, rule_id = %rule_id, "Classification Rule had no root Condition"),
        }
        self.client.delete_sequence(project_id, rule_id).await?;

        info!(project_id = %project_id, workflow_id = %workflow_id, rule_id = %rule_id, "Deleted Classification Rule");
        Ok(())
    }
}

fn rule_priority(workflow: &WorkflowResource, rule_id: ClassificationRuleId) -> ClassificationResult<i64> {
    workflow.additional.entry(rule_id).map(|entry| entry.order).ok_or_else(|| {
        ClassificationError::not_found(format!("Unable to find Classification Rule with ID: {rule_id}"))
    })
}
