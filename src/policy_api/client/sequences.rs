// Copyright 2025 Cowboy AI, LLC.

use serde_json::json;
use tracing::debug;

use super::conditions::join_ids;
use super::PolicyClient;
use crate::errors::ClassificationResult;
use crate::identifiers::{CollectionSequenceId, ProjectId};
use crate::policy_api::resources::{
    CollectionSequenceAdditional, CollectionSequenceEntry, CollectionSequenceResource,
};
use crate::policy_api::{PolicyRequest, ResourceType, UpdateBehaviour, Verb};

impl PolicyClient {
    /// Create a collection sequence
    pub async fn create_sequence(
        &self,
        project_id: &ProjectId,
        name: String,
        description: Option<String>,
        additional: &CollectionSequenceAdditional,
    ) -> ClassificationResult<CollectionSequenceResource> {
        let request = PolicyRequest::new(project_id, ResourceType::CollectionSequence)
            .with_name(Some(name))
            .with_description(description)
            .with_additional(serde_json::to_value(additional)?);
        let created: CollectionSequenceResource = self.send(Verb::Create, request).await?;
        debug!(project_id = %project_id, sequence_id = %created.id, "Created Collection Sequence");
        Ok(created)
    }

    /// Retrieve a collection sequence
    ///
    /// A detailed retrieve also asks for the conditions its collections use.
    pub async fn get_sequence(
        &self,
        project_id: &ProjectId,
        id: CollectionSequenceId,
        detailed: bool,
    ) -> ClassificationResult<CollectionSequenceResource> {
        let mut request = PolicyRequest::new(project_id, ResourceType::CollectionSequence).with_id(id);
        if detailed {
            request = request.with_additional(json!({ "include_children": true }));
        }
        self.retrieve_one(request, format!("Unable to find Collection Sequence with ID: {id}"))
            .await
    }

    /// Retrieve several collection sequences in one call
    pub async fn get_sequences(
        &self,
        project_id: &ProjectId,
        ids: &[CollectionSequenceId],
    ) -> ClassificationResult<Vec<CollectionSequenceResource>> {
        let request = PolicyRequest::new(project_id, ResourceType::CollectionSequence).with_ids(ids.iter().copied());
        self.retrieve_all(
            request,
            ids.len(),
            format!("Unable to find all Collection Sequences with IDs: {}", join_ids(ids)),
        )
        .await
    }

    /// Write a collection sequence back
    ///
    /// `behaviour` selects whether the entries sent are added to or replace
    /// the stored entries.
    pub async fn update_sequence(
        &self,
        project_id: &ProjectId,
        sequence: &CollectionSequenceResource,
        behaviour: Option<UpdateBehaviour>,
    ) -> ClassificationResult<CollectionSequenceResource> {
        let mut additional = sequence.additional.clone();
        additional.condition_fragments.clear();
        let mut request = PolicyRequest::new(project_id, ResourceType::CollectionSequence)
            .with_id(sequence.id)
            .with_name(sequence.name.clone())
            .with_description(sequence.description.clone())
            .with_additional(serde_json::to_value(&additional)?);
        if let Some(behaviour) = behaviour {
            request = request.with_update_behaviour(behaviour);
        }
        self.send(Verb::Update, request).await
    }

    /// Append `entry` to the entries of a sequence
    pub async fn add_sequence_entry(
        &self,
        project_id: &ProjectId,
        sequence: &CollectionSequenceResource,
        entry: CollectionSequenceEntry,
    ) -> ClassificationResult<CollectionSequenceResource> {
        let mut update = sequence.clone();
        update.additional.collection_sequence_entries = vec![entry];
        self.update_sequence(project_id, &update, Some(UpdateBehaviour::Add))
            .await
    }

    /// Delete a collection sequence
    pub async fn delete_sequence(&self, project_id: &ProjectId, id: CollectionSequenceId) -> ClassificationResult<()> {
        self.delete(PolicyRequest::new(project_id, ResourceType::CollectionSequence).with_id(id))
            .await
    }
}
