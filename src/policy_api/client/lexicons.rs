// Copyright 2025 Cowboy AI, LLC.

use serde_json::json;
use tracing::debug;

use super::conditions::join_ids;
use super::PolicyClient;
use crate::errors::ClassificationResult;
use crate::identifiers::{LexiconExpressionId, LexiconId, ProjectId};
use crate::paging::PageRequest;
use crate::policy_api::resources::{
    LexiconExpressionAdditional, LexiconExpressionResource, LexiconResource,
};
use crate::policy_api::{ListResponse, PolicyRequest, ResourceType, UpdateBehaviour, Verb};

impl PolicyClient {
    /// Create a lexicon with its initial expressions
    pub async fn create_lexicon(
        &self,
        project_id: &ProjectId,
        name: String,
        description: Option<String>,
        expressions: Vec<LexiconExpressionResource>,
    ) -> ClassificationResult<LexiconResource> {
        let mut request = PolicyRequest::new(project_id, ResourceType::Lexicon)
            .with_name(Some(name))
            .with_description(description);
        if !expressions.is_empty() {
            request = request.with_additional(json!({ "lexicon_expressions": expressions }));
        }
        let created: LexiconResource = self.send(Verb::Create, request).await?;
        debug!(project_id = %project_id, lexicon_id = %created.id, "Created Lexicon");
        Ok(created)
    }

    /// Retrieve a lexicon with its expressions
    pub async fn get_lexicon(&self, project_id: &ProjectId, id: LexiconId) -> ClassificationResult<LexiconResource> {
        let request = PolicyRequest::new(project_id, ResourceType::Lexicon).with_id(id);
        self.retrieve_one(request, format!("Unable to find Term List with ID: {id}"))
            .await
    }

    /// Retrieve several lexicons in one call
    pub async fn get_lexicons(
        &self,
        project_id: &ProjectId,
        ids: &[LexiconId],
    ) -> ClassificationResult<Vec<LexiconResource>> {
        let request = PolicyRequest::new(project_id, ResourceType::Lexicon).with_ids(ids.iter().copied());
        self.retrieve_all(
            request,
            ids.len(),
            format!("Unable to find all Term Lists with IDs: {}", join_ids(ids)),
        )
        .await
    }

    /// Retrieve one page of lexicons
    pub async fn list_lexicons(
        &self,
        project_id: &ProjectId,
        page: PageRequest,
    ) -> ClassificationResult<ListResponse<LexiconResource>> {
        let request = PolicyRequest::new(project_id, ResourceType::Lexicon).with_page(page.remote_start(), page.page_size);
        self.retrieve(request).await
    }

    /// Update a lexicon
    ///
    /// When `expressions` is given they are added to, or with
    /// [`UpdateBehaviour::Replace`] replace, the stored expressions.
    pub async fn update_lexicon(
        &self,
        project_id: &ProjectId,
        lexicon: &LexiconResource,
        expressions: Option<(Vec<LexiconExpressionResource>, UpdateBehaviour)>,
    ) -> ClassificationResult<LexiconResource> {
        let mut request = PolicyRequest::new(project_id, ResourceType::Lexicon)
            .with_id(lexicon.id)
            .with_name(lexicon.name.clone())
            .with_description(lexicon.description.clone());
        if let Some((expressions, behaviour)) = expressions {
            request = request
                .with_additional(json!({ "lexicon_expressions": expressions }))
                .with_update_behaviour(behaviour);
        }
        self.send(Verb::Update, request).await
    }

    /// Delete a lexicon
    pub async fn delete_lexicon(&self, project_id: &ProjectId, id: LexiconId) -> ClassificationResult<()> {
        self.delete(PolicyRequest::new(project_id, ResourceType::Lexicon).with_id(id))
            .await
    }

    /// Retrieve a lexicon expression
    pub async fn get_expression(
        &self,
        project_id: &ProjectId,
        id: LexiconExpressionId,
    ) -> ClassificationResult<LexiconExpressionResource> {
        let request = PolicyRequest::new(project_id, ResourceType::LexiconExpression).with_id(id);
        self.retrieve_one(request, format!("Unable to find Term with ID: {id}"))
            .await
    }

    /// Replace the payload of a lexicon expression
    pub async fn update_expression(
        &self,
        project_id: &ProjectId,
        id: LexiconExpressionId,
        additional: &LexiconExpressionAdditional,
    ) -> ClassificationResult<LexiconExpressionResource> {
        let request = PolicyRequest::new(project_id, ResourceType::LexiconExpression)
            .with_id(id)
            .with_additional(serde_json::to_value(additional)?);
        self.send(Verb::Update, request).await
    }

    /// Delete a lexicon expression
    pub async fn delete_expression(&self, project_id: &ProjectId, id: LexiconExpressionId) -> ClassificationResult<()> {
        self.delete(PolicyRequest::new(project_id, ResourceType::LexiconExpression).with_id(id))
            .await
    }

    /// Delete several lexicon expressions in one call
    pub async fn delete_expressions(
        &self,
        project_id: &ProjectId,
        ids: &[LexiconExpressionId],
    ) -> ClassificationResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.delete(PolicyRequest::new(project_id, ResourceType::LexiconExpression).with_ids(ids.iter().copied()))
            .await
    }
}
