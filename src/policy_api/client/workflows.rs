// Copyright 2025 Cowboy AI, LLC.

use tracing::debug;

use super::PolicyClient;
use crate::errors::ClassificationResult;
use crate::identifiers::{ProjectId, WorkflowId};
use crate::paging::PageRequest;
use crate::policy_api::resources::{WorkflowAdditional, WorkflowResource};
use crate::policy_api::{ListResponse, PolicyRequest, ResourceType, Verb};

impl PolicyClient {
    /// Create a sequence workflow
    pub async fn create_workflow(
        &self,
        project_id: &ProjectId,
        name: String,
        description: Option<String>,
        additional: &WorkflowAdditional,
    ) -> ClassificationResult<WorkflowResource> {
        let request = PolicyRequest::new(project_id, ResourceType::SequenceWorkflow)
            .with_name(Some(name))
            .with_description(description)
            .with_additional(serde_json::to_value(additional)?);
        let created: WorkflowResource = self.send(Verb::Create, request).await?;
        debug!(project_id = %project_id, workflow_id = %created.id, "Created Workflow");
        Ok(created)
    }

    /// Retrieve a sequence workflow with its entries
    pub async fn get_workflow(&self, project_id: &ProjectId, id: WorkflowId) -> ClassificationResult<WorkflowResource> {
        let request = PolicyRequest::new(project_id, ResourceType::SequenceWorkflow).with_id(id);
        self.retrieve_one(request, format!("Unable to find Workflow with ID: {id}"))
            .await
    }

    /// Retrieve one page of sequence workflows
    pub async fn list_workflows(
        &self,
        project_id: &ProjectId,
        page: PageRequest,
    ) -> ClassificationResult<ListResponse<WorkflowResource>> {
        let request = PolicyRequest::new(project_id, ResourceType::SequenceWorkflow)
            .with_page(page.remote_start(), page.page_size);
        self.retrieve(request).await
    }

    /// Write a whole sequence workflow back, entries included
    pub async fn update_workflow(
        &self,
        project_id: &ProjectId,
        workflow: &WorkflowResource,
    ) -> ClassificationResult<WorkflowResource> {
        let request = PolicyRequest::new(project_id, ResourceType::SequenceWorkflow)
            .with_id(workflow.id)
            .with_name(workflow.name.clone())
            .with_description(workflow.description.clone())
            .with_additional(serde_json::to_value(&workflow.additional)?);
        self.send(Verb::Update, request).await
    }

    /// Delete a sequence workflow
    pub async fn delete_workflow(&self, project_id: &ProjectId, id: WorkflowId) -> ClassificationResult<()> {
        self.delete(PolicyRequest::new(project_id, ResourceType::SequenceWorkflow).with_id(id))
            .await
    }
}
