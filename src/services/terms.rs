// Copyright 2025 Cowboy AI, LLC.

//! Terms, the expressions of a Term List

use tracing::info;

use super::ClassificationService;
use crate::domain::Term;
use crate::errors::{ClassificationError, ClassificationResult, ResultExt};
use crate::identifiers::{ProjectId, TermId, TermListId};
use crate::paging::{project, Page, PageRequest};
use crate::policy_api::resources::{LexiconExpressionAdditional, LexiconExpressionResource};
use crate::policy_api::UpdateBehaviour;

/// Expression stored briefly while every Term of a list is removed
const DELETE_PLACEHOLDER_EXPRESSION: &str = "$DELETE_PLACEHOLDER$";

impl ClassificationService {
    /// Retrieve a Term of a Term List
    pub async fn get_term(&self, project_id: &ProjectId, term_list_id: TermListId, id: TermId) -> ClassificationResult<Term> {
        let expression = self.term_expression(project_id, term_list_id, id).await?;
        Term::from_expression(&expression)
    }

    /// Retrieve one page of the Terms of a Term List
    pub async fn list_terms(
        &self,
        project_id: &ProjectId,
        term_list_id: TermListId,
        page: PageRequest,
    ) -> ClassificationResult<Page<Term>> {
        let lexicon = self.client.get_lexicon(project_id, term_list_id).await?;
        let decoded = project(&lexicon.additional.lexicon_expressions, page, Term::from_expression);
        let total = decoded.total_hits;
        let items = decoded.items.into_iter().collect::<ClassificationResult<Vec<_>>>()?;
        Ok(Page::new(items, total))
    }

    /// Replace the expression and type of one Term
    pub async fn update_term(
        &self,
        project_id: &ProjectId,
        term_list_id: TermListId,
        id: TermId,
        term: Term,
    ) -> ClassificationResult<Term> {
        self.term_expression(project_id, term_list_id, id).await?;
        let updated = self
            .client
            .update_expression(
                project_id,
                id,
                &LexiconExpressionAdditional {
                    expression: term.expression,
                    lexicon_id: Some(term_list_id),
                    kind: term.kind.as_str().to_string(),
                },
            )
            .await?;
        info!(project_id = %project_id, term_list_id = %term_list_id, term_id = %id, "Updated Term");
        Term::from_expression(&updated)
    }

    /// Store several Terms on a Term List at once
    ///
    /// Terms with an id overwrite the stored Term, the others are added. With
    /// `overwrite` every Term not given is removed.
    pub async fn update_terms(
        &self,
        project_id: &ProjectId,
        term_list_id: TermListId,
        terms: Vec<Term>,
        overwrite: bool,
    ) -> ClassificationResult<()> {
        let lexicon = self.client.get_lexicon(project_id, term_list_id).await?;
        let expressions: Vec<LexiconExpressionResource> =
            terms.iter().map(|term| term.to_expression(term_list_id)).collect();
        let behaviour = if overwrite {
            UpdateBehaviour::Replace
        } else {
            UpdateBehaviour::Add
        };
        self.client
            .update_lexicon(project_id, &lexicon, Some((expressions, behaviour)))
            .await?;
        info!(
            project_id = %project_id,
            term_list_id = %term_list_id,
            terms = terms.len(),
            overwrite,
            "Updated Terms"
        );
        Ok(())
    }

    /// Delete one Term of a Term List
    pub async fn delete_term(&self, project_id: &ProjectId, term_list_id: TermListId, id: TermId) -> ClassificationResult<()> {
        self.term_expression(project_id, term_list_id, id).await?;
        self.client.delete_expression(project_id, id).await?;
        info!(project_id = %project_id, term_list_id = %term_list_id, term_id = %id, "Deleted Term");
        Ok(())
    }

    /// Delete the given Terms of a Term List, or all of them when `ids` is empty
    ///
    /// Every id must belong to the Term List; otherwise nothing is deleted.
    pub async fn delete_terms(
        &self,
        project_id: &ProjectId,
        term_list_id: TermListId,
        ids: &[TermId],
    ) -> ClassificationResult<()> {
        if ids.is_empty() {
            return self.delete_all_terms(project_id, term_list_id).await;
        }
        let lexicon = self.client.get_lexicon(project_id, term_list_id).await?;
        let missing = lexicon.missing_expressions(ids);
        if !missing.is_empty() {
            let missing = missing.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
            return Err(ClassificationError::not_found(format!(
                "IDs specified not found on Term List. IDs: [{missing}]"
            )));
        }
        self.client.delete_expressions(project_id, ids).await?;
        info!(project_id = %project_id, term_list_id = %term_list_id, terms = ids.len(), "Deleted Terms");
        Ok(())
    }

    /// Delete every Term of a Term List
    ///
    /// The Terms are replaced by a single placeholder which is then deleted.
    pub async fn delete_all_terms(&self, project_id: &ProjectId, term_list_id: TermListId) -> ClassificationResult<()> {
        let lexicon = self.client.get_lexicon(project_id, term_list_id).await?;
        let placeholder = LexiconExpressionResource::new(None, term_list_id, DELETE_PLACEHOLDER_EXPRESSION, "text");
        let updated = self
            .client
            .update_lexicon(project_id, &lexicon, Some((vec![placeholder], UpdateBehaviour::Replace)))
            .await?;
        let placeholder_id = updated
            .additional
            .lexicon_expressions
            .first()
            .and_then(|expression| expression.id)
            .ok_or_else(|| {
                ClassificationError::server(format!(
                    "Unable to remove Terms from Term List with ID: {term_list_id}"
                ))
            })?;
        self.client.delete_expression(project_id, placeholder_id).await?;
        info!(project_id = %project_id, term_list_id = %term_list_id, "Deleted all Terms");
        Ok(())
    }

    /// Expression backing a Term, checked to belong to the Term List
    async fn term_expression(
        &self,
        project_id: &ProjectId,
        term_list_id: TermListId,
        id: TermId,
    ) -> ClassificationResult<LexiconExpressionResource> {
        self.client.get_lexicon(project_id, term_list_id).await?;
        let expression = self
            .client
            .get_expression(project_id, id)
            .await
            .not_found_as(|| format!("Unable to find Term with ID: {id}"))?;
        if expression.additional.lexicon_id != Some(term_list_id) {
            return Err(ClassificationError::not_found(format!(
                "Unable to find Term with ID: {id} on Term List: {term_list_id}"
            )));
        }
        Ok(expression)
    }
}
