// Copyright 2025 Cowboy AI, LLC.

//! Classifications: one Policy linked to one Condition tree

use std::collections::HashMap;

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::validation::TermListOwner;
use super::ClassificationService;
use crate::domain::{Classification, ClassificationInput};
use crate::errors::{ClassificationError, ClassificationResult};
use crate::identifiers::{ClassificationId, ConditionId, ProjectId};
use crate::linkage::{
    condition_id_from_policy_name, condition_name_for, policy_id_from_condition_name,
    policy_name_for, ClassificationLink, PolicyDescription, CLASSIFICATION_NOTES,
    CREATE_PLACEHOLDER,
};
use crate::paging::{Page, PageRequest};
use crate::policy_api::resources::{default_policy_definition, ConditionResource, PolicyResource};
use crate::saga::{Compensation, Saga};
use crate::transcoder::{apply_classification_target, classification_target};

impl ClassificationService {
    /// Create a Classification
    ///
    /// The Condition is created under a placeholder name, the Policy is
    /// created pointing at it, and the Condition is then renamed to point back
    /// at the Policy. A failure after the first step deletes what was created.
    pub async fn create_classification(
        &self,
        project_id: &ProjectId,
        input: ClassificationInput,
    ) -> ClassificationResult<Classification> {
        let additional = self.classification_condition(&input)?;
        self.validate_term_lists(project_id, &json!({ "additional": additional }), TermListOwner::Classification)
            .await?;
        let description = input.policy_description().encode()?;

        let mut saga = Saga::new("create_classification");
        let condition = saga
            .step(
                "create_condition",
                self.client
                    .create_condition(project_id, Some(CREATE_PLACEHOLDER.to_string()), additional.clone()),
                |condition| {
                    let client = self.client.clone();
                    let project_id = project_id.clone();
                    let id = condition.id;
                    Some(Compensation::new(format!("delete Condition {id}"), async move {
                        client.delete_condition(&project_id, id).await
                    }))
                },
            )
            .await?;

        let policy = saga
            .step(
                "create_policy",
                self.client.create_policy(
                    project_id,
                    policy_name_for(condition.id),
                    description,
                    default_policy_definition(),
                ),
                |policy| {
                    let client = self.client.clone();
                    let project_id = project_id.clone();
                    let id = policy.id;
                    Some(Compensation::new(format!("delete Policy {id}"), async move {
                        client.delete_policy(&project_id, id).await
                    }))
                },
            )
            .await?;

        let link = ClassificationLink::new(policy.id, condition.id);
        saga.run(
            "link_condition",
            self.client
                .update_condition(project_id, link.condition_id, Some(link.condition_name()), additional),
        )
        .await?;
        saga.complete();

        info!(
            project_id = %project_id,
            classification_id = %link.policy_id,
            condition_id = %link.condition_id,
            "Created Classification"
        );
        self.get_classification(project_id, link.policy_id).await
    }

    /// Retrieve a Classification
    pub async fn get_classification(
        &self,
        project_id: &ProjectId,
        id: ClassificationId,
    ) -> ClassificationResult<Classification> {
        let (policy, condition_id) = self
            .classification_policy(project_id, id, || {
                format!("Unable to retrieve Classification with ID: {id}")
            })
            .await?;
        let condition = self.client.get_condition(project_id, condition_id, true).await?;
        self.assemble_classification(&policy, &condition)
    }

    /// Retrieve one page of Classifications
    ///
    /// Policies are paged remotely. The linked Conditions of the whole page are
    /// fetched in a single request and matched back by the Policy id encoded in
    /// their names.
    pub async fn list_classifications(
        &self,
        project_id: &ProjectId,
        page: PageRequest,
    ) -> ClassificationResult<Page<Classification>> {
        let policies = self.client.list_policies(project_id, page).await?;
        let mut condition_ids: Vec<ConditionId> = Vec::with_capacity(policies.results.len());
        for policy in &policies.results {
            let condition_id = condition_id_from_policy_name(policy.name.as_deref())
                .ok_or_else(|| {
                    ClassificationError::server(format!(
                        "Unable to find Condition linked to Classification with ID: {}",
                        policy.id
                    ))
                })?;
            condition_ids.push(condition_id);
        }

        let conditions = self
            .client
            .get_conditions(project_id, &condition_ids, true)
            .await?;
        let by_policy: HashMap<ClassificationId, ConditionResource> = conditions
            .into_iter()
            .filter_map(|condition| {
                policy_id_from_condition_name(condition.name.as_deref()).map(|id| (id, condition))
            })
            .collect();

        let mut items = Vec::with_capacity(policies.results.len());
        for policy in &policies.results {
            let condition = by_policy.get(&policy.id).ok_or_else(|| {
                ClassificationError::server(format!(
                    "Condition linked to Classification with ID: {} does not link back",
                    policy.id
                ))
            })?;
            items.push(self.assemble_classification(policy, condition)?);
        }
        Ok(Page::new(items, policies.totalhits))
    }

    /// Replace a Classification's metadata and condition tree
    ///
    /// The Policy and the Condition are updated concurrently.
    pub async fn update_classification(
        &self,
        project_id: &ProjectId,
        id: ClassificationId,
        input: ClassificationInput,
    ) -> ClassificationResult<Classification> {
        let (policy, condition_id) = self
            .classification_policy(project_id, id, || {
                format!("Unable to retrieve Classification with ID: {id}")
            })
            .await?;
        let additional = self.classification_condition(&input)?;
        self.validate_term_lists(project_id, &json!({ "additional": additional }), TermListOwner::Classification)
            .await?;
        let description = input.policy_description().encode()?;

        tokio::try_join!(
            self.client.update_policy(
                project_id,
                id,
                Some(policy_name_for(condition_id)),
                Some(description),
                policy.additional.clone(),
            ),
            self.client.update_condition(
                project_id,
                condition_id,
                Some(condition_name_for(id)),
                additional,
            ),
        )?;
        info!(project_id = %project_id, classification_id = %id, "Updated Classification");
        self.get_classification(project_id, id).await
    }

    /// Delete a Classification
    ///
    /// The Policy goes first so a Classification still in use by a Rule
    /// Classification is refused before anything is removed.
    pub async fn delete_classification(&self, project_id: &ProjectId, id: ClassificationId) -> ClassificationResult<()> {
        let (_, condition_id) = self
            .classification_policy(project_id, id, || {
                format!("Unable to retrieve Classification with ID: {id}")
            })
            .await?;
        self.client.delete_policy(project_id, id).await?;
        if let Err(err) = self.client.delete_condition(project_id, condition_id).await {
            warn!(
                project_id = %project_id,
                classification_id = %id,
                condition_id = %condition_id,
                error = %err,
                "Classification Policy deleted but its Condition was left behind"
            );
            return Err(err);
        }
        info!(project_id = %project_id, classification_id = %id, "Deleted Classification");
        Ok(())
    }

    /// Remote form payload of the Condition backing a Classification
    fn classification_condition(&self, input: &ClassificationInput) -> ClassificationResult<Value> {
        let mut node = json!({ "additional": input.additional });
        self.transcoder.to_remote_form(&mut node)?;
        let mut additional: Map<String, Value> = match node {
            Value::Object(mut object) => match object.remove("additional") {
                Some(Value::Object(additional)) => additional,
                _ => {
                    return Err(ClassificationError::InvalidStructure(
                        "Classification 'additional' must be an object".to_string(),
                    ))
                }
            },
            _ => {
                return Err(ClassificationError::InvalidStructure(
                    "Classification 'additional' must be an object".to_string(),
                ))
            }
        };
        additional.insert("notes".to_string(), Value::String(CLASSIFICATION_NOTES.to_string()));
        if let Some(target) = input.classification_target {
            apply_classification_target(&mut additional, target);
        }
        Ok(Value::Object(additional))
    }

    fn assemble_classification(
        &self,
        policy: &PolicyResource,
        condition: &ConditionResource,
    ) -> ClassificationResult<Classification> {
        let metadata = PolicyDescription::decode(policy.description.as_deref())?;
        let target = match condition.additional.as_object() {
            Some(additional) => classification_target(additional)?,
            None => None,
        };
        let mut decoded = self.transcoder.from_remote_parts(
            Some(condition.id),
            condition.name.as_deref(),
            &condition.additional,
        )?;
        decoded.additional.notes = None;
        Ok(Classification {
            id: policy.id,
            name: metadata.name,
            description: metadata.description,
            kind: metadata.kind,
            classification_target: target,
            additional: decoded.additional,
        })
    }
}
