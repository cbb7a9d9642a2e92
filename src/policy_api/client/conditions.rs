// Copyright 2025 Cowboy AI, LLC.

use serde_json::{json, Value};
use tracing::debug;

use super::PolicyClient;
use crate::errors::ClassificationResult;
use crate::identifiers::{ConditionId, ProjectId};
use crate::policy_api::resources::ConditionResource;
use crate::policy_api::{PolicyRequest, ResourceType, Verb};

impl PolicyClient {
    /// Create a condition, children included
    pub async fn create_condition(
        &self,
        project_id: &ProjectId,
        name: Option<String>,
        additional: Value,
    ) -> ClassificationResult<ConditionResource> {
        let request = PolicyRequest::new(project_id, ResourceType::Condition)
            .with_name(name)
            .with_additional(additional);
        let created: ConditionResource = self.send(Verb::Create, request).await?;
        debug!(project_id = %project_id, condition_id = %created.id, "Created Condition");
        Ok(created)
    }

    /// Retrieve a condition, optionally with its children
    pub async fn get_condition(
        &self,
        project_id: &ProjectId,
        id: ConditionId,
        include_children: bool,
    ) -> ClassificationResult<ConditionResource> {
        let request = PolicyRequest::new(project_id, ResourceType::Condition)
            .with_id(id)
            .with_additional(json!({ "include_children": include_children }));
        self.retrieve_one(request, format!("Unable to find Condition with ID: {id}"))
            .await
    }

    /// Retrieve several conditions in one call
    pub async fn get_conditions(
        &self,
        project_id: &ProjectId,
        ids: &[ConditionId],
        include_children: bool,
    ) -> ClassificationResult<Vec<ConditionResource>> {
        let request = PolicyRequest::new(project_id, ResourceType::Condition)
            .with_ids(ids.iter().copied())
            .with_additional(json!({ "include_children": include_children }));
        self.retrieve_all(
            request,
            ids.len(),
            format!("Unable to find all Conditions with IDs: {}", join_ids(ids)),
        )
        .await
    }

    /// First condition whose notes equal `notes`
    pub async fn find_condition_by_notes(
        &self,
        project_id: &ProjectId,
        notes: &str,
    ) -> ClassificationResult<Option<ConditionResource>> {
        let request = PolicyRequest::new(project_id, ResourceType::Condition)
            .with_additional(json!({ "filter": { "notes": notes } }))
            .with_page(1, 1);
        self.retrieve_first(request).await
    }

    /// Replace the name and payload of a condition
    pub async fn update_condition(
        &self,
        project_id: &ProjectId,
        id: ConditionId,
        name: Option<String>,
        additional: Value,
    ) -> ClassificationResult<ConditionResource> {
        let request = PolicyRequest::new(project_id, ResourceType::Condition)
            .with_id(id)
            .with_name(name)
            .with_additional(additional);
        self.send(Verb::Update, request).await
    }

    /// Delete a condition and its children
    pub async fn delete_condition(&self, project_id: &ProjectId, id: ConditionId) -> ClassificationResult<()> {
        self.delete(PolicyRequest::new(project_id, ResourceType::Condition).with_id(id))
            .await
    }

    /// Delete several conditions in one call
    pub async fn delete_conditions(&self, project_id: &ProjectId, ids: &[ConditionId]) -> ClassificationResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.delete(PolicyRequest::new(project_id, ResourceType::Condition).with_ids(ids.iter().copied()))
            .await
    }
}

pub(super) fn join_ids<T: std::fmt::Display>(ids: &[T]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
