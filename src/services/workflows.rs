// Copyright 2025 Cowboy AI, LLC.

//! Workflows, one sequence workflow each

use tracing::info;

use super::ClassificationService;
use crate::domain::{Workflow, WorkflowInput};
use crate::errors::{ClassificationError, ClassificationResult};
use crate::identifiers::{ProjectId, WorkflowId};
use crate::paging::{Page, PageRequest};
use crate::policy_api::resources::WorkflowAdditional;

impl ClassificationService {
    /// Create a Workflow without Classification Rules
    pub async fn create_workflow(&self, project_id: &ProjectId, input: WorkflowInput) -> ClassificationResult<Workflow> {
        let additional = WorkflowAdditional {
            notes: input.notes,
            ..WorkflowAdditional::default()
        };
        let workflow = self
            .client
            .create_workflow(project_id, input.name, input.description, &additional)
            .await?;
        info!(project_id = %project_id, workflow_id = %workflow.id, "Created Workflow");
        Ok(Workflow::from(&workflow))
    }

    /// Retrieve a Workflow
    pub async fn get_workflow(&self, project_id: &ProjectId, id: WorkflowId) -> ClassificationResult<Workflow> {
        let workflow = self.client.get_workflow(project_id, id).await?;
        Ok(Workflow::from(&workflow))
    }

    /// Retrieve one page of Workflows
    pub async fn list_workflows(&self, project_id: &ProjectId, page: PageRequest) -> ClassificationResult<Page<Workflow>> {
        let workflows = self.client.list_workflows(project_id, page).await?;
        Ok(Page::new(
            workflows.results.iter().map(Workflow::from).collect(),
            workflows.totalhits,
        ))
    }

    /// Update a Workflow's name, description and notes
    ///
    /// Its Classification Rules are kept.
    pub async fn update_workflow(
        &self,
        project_id: &ProjectId,
        id: WorkflowId,
        input: WorkflowInput,
    ) -> ClassificationResult<Workflow> {
        let mut workflow = self.client.get_workflow(project_id, id).await?;
        workflow.name = Some(input.name);
        workflow.description = input.description;
        workflow.additional.notes = input.notes;
        let updated = self.client.update_workflow(project_id, &workflow).await?;
        info!(project_id = %project_id, workflow_id = %id, "Updated Workflow");
        Ok(Workflow::from(&updated))
    }

    /// Delete a Workflow that has no Classification Rules left
    pub async fn delete_workflow(&self, project_id: &ProjectId, id: WorkflowId) -> ClassificationResult<()> {
        let workflow = self.client.get_workflow(project_id, id).await?;
        if !workflow.additional.sequence_entries.is_empty() {
            return Err(ClassificationError::invalid_argument(
                "Unable to Delete. There are Classification Rules on the Workflow.",
            ));
        }
        self.client.delete_workflow(project_id, id).await?;
        info!(project_id = %project_id, workflow_id = %id, "Deleted Workflow");
        Ok(())
    }
}
