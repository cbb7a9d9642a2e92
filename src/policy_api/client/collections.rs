// Copyright 2025 Cowboy AI, LLC.

use serde_json::{json, Value};
use tracing::debug;

use super::conditions::join_ids;
use super::PolicyClient;
use crate::errors::ClassificationResult;
use crate::identifiers::{CollectionId, ProjectId};
use crate::policy_api::resources::{CollectionAdditional, CollectionResource};
use crate::policy_api::{PolicyRequest, ResourceType, Verb};

impl PolicyClient {
    /// Create a collection together with its condition
    pub async fn create_collection(
        &self,
        project_id: &ProjectId,
        name: String,
        description: Option<String>,
        additional: &CollectionAdditional,
    ) -> ClassificationResult<CollectionResource> {
        let request = PolicyRequest::new(project_id, ResourceType::Collection)
            .with_name(Some(name))
            .with_description(description)
            .with_additional(serde_json::to_value(additional)?);
        let created: CollectionResource = self.send(Verb::Create, request).await?;
        debug!(project_id = %project_id, collection_id = %created.id, "Created Collection");
        Ok(created)
    }

    /// Retrieve a collection with its condition
    pub async fn get_collection(
        &self,
        project_id: &ProjectId,
        id: CollectionId,
    ) -> ClassificationResult<CollectionResource> {
        let request = PolicyRequest::new(project_id, ResourceType::Collection)
            .with_id(id)
            .with_additional(json!({ "include_condition": true }));
        self.retrieve_one(request, format!("Unable to find Collection with ID: {id}"))
            .await
    }

    /// Retrieve several collections with their conditions
    pub async fn get_collections(
        &self,
        project_id: &ProjectId,
        ids: &[CollectionId],
    ) -> ClassificationResult<Vec<CollectionResource>> {
        let request = PolicyRequest::new(project_id, ResourceType::Collection)
            .with_ids(ids.iter().copied())
            .with_additional(json!({ "include_condition": true }));
        self.retrieve_all(
            request,
            ids.len(),
            format!("Unable to find all Collections with IDs: {}", join_ids(ids)),
        )
        .await
    }

    /// Update the fields given in `additional` on a collection
    pub async fn update_collection(
        &self,
        project_id: &ProjectId,
        id: CollectionId,
        name: Option<String>,
        description: Option<String>,
        additional: Value,
    ) -> ClassificationResult<CollectionResource> {
        let request = PolicyRequest::new(project_id, ResourceType::Collection)
            .with_id(id)
            .with_name(name)
            .with_description(description)
            .with_additional(additional);
        self.send(Verb::Update, request).await
    }

    /// Detach a collection from its policies and mark it for deletion
    pub async fn clear_collection_policies(
        &self,
        project_id: &ProjectId,
        id: CollectionId,
    ) -> ClassificationResult<CollectionResource> {
        self.update_collection(
            project_id,
            id,
            Some(crate::linkage::DELETE_PLACEHOLDER.to_string()),
            None,
            json!({ "policy_ids": [] }),
        )
        .await
    }

    /// Delete a collection
    pub async fn delete_collection(&self, project_id: &ProjectId, id: CollectionId) -> ClassificationResult<()> {
        self.delete(PolicyRequest::new(project_id, ResourceType::Collection).with_id(id))
            .await
    }

    /// Delete several collections in one call
    pub async fn delete_collections(&self, project_id: &ProjectId, ids: &[CollectionId]) -> ClassificationResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.delete(PolicyRequest::new(project_id, ResourceType::Collection).with_ids(ids.iter().copied()))
            .await
    }
}
