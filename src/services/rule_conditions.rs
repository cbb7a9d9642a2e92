// Copyright 2025 Cowboy AI, LLC.

//! Rule Conditions: children of a Classification Rule's root Condition

use serde_json::{json, Value};
use tracing::info;

use super::validation::TermListOwner;
use super::ClassificationService;
use crate::domain::{Condition, RuleCondition, RuleConditionInput};
use crate::errors::{ClassificationError, ClassificationResult};
use crate::identifiers::{ClassificationRuleId, ConditionId, ProjectId, RuleConditionId, WorkflowId};
use crate::paging::{project, Page, PageRequest};
use crate::policy_api::resources::ConditionResource;

impl ClassificationService {
    /// Add a condition to a Classification Rule
    pub async fn create_rule_condition(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
        input: RuleConditionInput,
    ) -> ClassificationResult<RuleCondition> {
        let (_, sequence) = self.workflow_and_rule(project_id, workflow_id, rule_id).await?;
        let node = self.rule_condition_node(&input)?;
        self.validate_term_lists(project_id, &node, TermListOwner::RuleCondition)
            .await?;
        let root = self.rule_root(project_id, &sequence).await?;

        let mut additional = remote_additional(node)?;
        if let Value::Object(object) = &mut additional {
            object.insert("parent_condition_id".to_string(), json!(root.id));
        }
        let created = self
            .client
            .create_condition(project_id, input.name, additional)
            .await?;
        info!(
            project_id = %project_id,
            rule_id = %rule_id,
            condition_id = %created.id,
            "Created Rule Condition"
        );
        self.transcoder.from_remote_form(&created.to_value())
    }

    /// Retrieve a condition anywhere below a Classification Rule's root
    pub async fn get_rule_condition(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
        id: RuleConditionId,
    ) -> ClassificationResult<RuleCondition> {
        let tree = self.rule_condition_tree(project_id, workflow_id, rule_id).await?;
        find_below_root(&tree, id).cloned()
    }

    /// Retrieve one page of the direct children of a Classification Rule's root
    pub async fn list_rule_conditions(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
        page: PageRequest,
    ) -> ClassificationResult<Page<RuleCondition>> {
        let (_, sequence) = self.workflow_and_rule(project_id, workflow_id, rule_id).await?;
        let root = self.rule_root(project_id, &sequence).await?;
        let root = self.client.get_condition(project_id, root.id, true).await?;

        let decoded = project(root.children(), page, |child| self.transcoder.from_remote_form(child));
        let total = decoded.total_hits;
        let items = decoded.items.into_iter().collect::<ClassificationResult<Vec<_>>>()?;
        Ok(Page::new(items, total))
    }

    /// Replace a condition below a Classification Rule's root
    ///
    /// The condition stays attached to the parent it had.
    pub async fn update_rule_condition(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
        id: RuleConditionId,
        input: RuleConditionInput,
    ) -> ClassificationResult<RuleCondition> {
        let node = self.rule_condition_node(&input)?;
        self.validate_term_lists(project_id, &node, TermListOwner::RuleCondition)
            .await?;
        let tree = self.rule_condition_tree(project_id, workflow_id, rule_id).await?;
        find_below_root(&tree, id)?;

        let existing: ConditionResource = self.client.get_condition(project_id, id, false).await?;
        let mut additional = remote_additional(node)?;
        if let (Some(parent), Value::Object(object)) = (existing.parent_condition_id(), &mut additional) {
            object.insert("parent_condition_id".to_string(), json!(parent));
        }
        let updated = self
            .client
            .update_condition(project_id, id, input.name, additional)
            .await?;
        info!(project_id = %project_id, rule_id = %rule_id, condition_id = %id, "Updated Rule Condition");
        self.transcoder.from_remote_form(&updated.to_value())
    }

    /// Delete a condition below a Classification Rule's root
    pub async fn delete_rule_condition(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
        id: RuleConditionId,
    ) -> ClassificationResult<()> {
        let tree = self.rule_condition_tree(project_id, workflow_id, rule_id).await?;
        find_below_root(&tree, id)?;
        self.client.delete_condition(project_id, id).await?;
        info!(project_id = %project_id, rule_id = %rule_id, condition_id = %id, "Deleted Rule Condition");
        Ok(())
    }

    /// Public form of a rule's root Condition with all its descendants
    async fn rule_condition_tree(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
    ) -> ClassificationResult<Condition> {
        let (_, sequence) = self.workflow_and_rule(project_id, workflow_id, rule_id).await?;
        let root = self.rule_root(project_id, &sequence).await?;
        let root = self.client.get_condition(project_id, root.id, true).await?;
        self.transcoder.from_remote_form(&root.to_value())
    }

    fn rule_condition_node(&self, input: &RuleConditionInput) -> ClassificationResult<Value> {
        let mut node = json!({ "additional": input.additional });
        if let Some(name) = &input.name {
            node["name"] = Value::String(name.clone());
        }
        self.transcoder.to_remote_form(&mut node)?;
        Ok(node)
    }
}

fn remote_additional(node: Value) -> ClassificationResult<Value> {
    match node {
        Value::Object(mut object) => object.remove("additional").ok_or_else(|| {
            ClassificationError::InvalidStructure(
                "Condition and any children it has must have 'additional' property defined.".to_string(),
            )
        }),
        _ => Err(ClassificationError::InvalidStructure(
            "Condition must be an object".to_string(),
        )),
    }
}

fn find_below_root(root: &Condition, id: ConditionId) -> ClassificationResult<&Condition> {
    root.find(id)
        .filter(|_| root.id != Some(id))
        .ok_or_else(|| ClassificationError::not_found(format!("Unable to find matching Condition with ID: {id}")))
}
