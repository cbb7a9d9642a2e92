// Copyright 2025 Cowboy AI, LLC.

//! Pre-mutation validation shared by the entity services

use futures::future::join_all;
use serde_json::Value;
use tracing::debug;

use super::ClassificationService;
use crate::errors::{ClassificationError, ClassificationResult, ResultExt};
use crate::identifiers::{ClassificationRuleId, ConditionId, LexiconId, PolicyId, ProjectId, WorkflowId};
use crate::linkage::{condition_id_from_policy_name, rule_root_notes};
use crate::policy_api::resources::{
    ConditionResource, CollectionSequenceResource, PolicyResource, WorkflowResource,
};

/// Entity whose payload referenced the term lists being validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TermListOwner {
    Classification,
    RuleCondition,
}

impl TermListOwner {
    fn label(self) -> &'static str {
        match self {
            TermListOwner::Classification => "Classification",
            TermListOwner::RuleCondition => "Rule Condition",
        }
    }
}

impl ClassificationService {
    /// Check every term list referenced by a remote form condition exists
    ///
    /// Lookups run concurrently and all of them complete before the outcomes
    /// are inspected in reference order. A missing term list is a fault in
    /// the caller's payload and reported as `InvalidArgument`.
    pub(crate) async fn validate_term_lists(
        &self,
        project_id: &ProjectId,
        condition: &Value,
        owner: TermListOwner,
    ) -> ClassificationResult<()> {
        let ids: Vec<LexiconId> = self.transcoder.term_list_ids(condition)?;
        if ids.is_empty() {
            return Ok(());
        }
        debug!(project_id = %project_id, term_lists = ids.len(), "Validating referenced Term Lists");
        let outcomes = join_all(ids.iter().map(|id| self.client.get_lexicon(project_id, *id))).await;
        for outcome in outcomes {
            match outcome {
                Ok(_) => {}
                Err(err) if err.is_not_found() => {
                    return Err(ClassificationError::invalid_argument(format!(
                        "Unable to find all Term List IDs specified in {}.",
                        owner.label()
                    )))
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Policy backing a Classification together with its linked Condition id
    pub(crate) async fn classification_policy(
        &self,
        project_id: &ProjectId,
        id: PolicyId,
        not_found: impl FnOnce() -> String,
    ) -> ClassificationResult<(PolicyResource, ConditionId)> {
        let policy = self.client.get_policy(project_id, id).await.not_found_as(not_found)?;
        let condition_id = condition_id_from_policy_name(policy.name.as_deref()).ok_or_else(|| {
            ClassificationError::server(format!(
                "Unable to find Condition linked to Classification with ID: {id}"
            ))
        })?;
        Ok((policy, condition_id))
    }

    /// Workflow and the Classification Rule on it
    ///
    /// Both are fetched concurrently. The Workflow outcome is inspected first,
    /// then the rule, then that the Workflow references the rule.
    pub(crate) async fn workflow_and_rule(
        &self,
        project_id: &ProjectId,
        workflow_id: WorkflowId,
        rule_id: ClassificationRuleId,
    ) -> ClassificationResult<(WorkflowResource, CollectionSequenceResource)> {
        let (workflow, sequence) = tokio::join!(
            self.client.get_workflow(project_id, workflow_id),
            self.client.get_sequence(project_id, rule_id, true),
        );
        let workflow = workflow?;
        let sequence = sequence
            .not_found_as(|| format!("Unable to find Classification Rule with ID: {rule_id}"))?;
        if workflow.additional.entry(rule_id).is_none() {
            return Err(ClassificationError::not_found(format!(
                "Classification Rule ID: {rule_id} not found on Workflow with ID: {workflow_id}"
            )));
        }
        Ok((workflow, sequence))
    }

    /// Root Condition of a Classification Rule
    ///
    /// Taken from the condition fragments of a detailed retrieve when present,
    /// otherwise looked up by its notes.
    pub(crate) async fn rule_root(
        &self,
        project_id: &ProjectId,
        sequence: &CollectionSequenceResource,
    ) -> ClassificationResult<ConditionResource> {
        let notes = rule_root_notes(sequence.id);
        let from_fragments = sequence
            .additional
            .condition_fragments
            .iter()
            .filter(|fragment| fragment.pointer("/additional/notes").and_then(Value::as_str) == Some(notes.as_str()))
            .find_map(|fragment| serde_json::from_value::<ConditionResource>(fragment.clone()).ok());
        if let Some(root) = from_fragments {
            return Ok(root);
        }
        self.client
            .find_condition_by_notes(project_id, &notes)
            .await?
            .ok_or_else(|| {
                ClassificationError::not_found(format!(
                    "Unable to find root Condition for Classification Rule with ID: {}",
                    sequence.id
                ))
            })
    }
}
