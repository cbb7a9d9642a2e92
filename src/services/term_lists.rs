// Copyright 2025 Cowboy AI, LLC.

//! Term Lists, one Lexicon each

use tracing::info;

use super::ClassificationService;
use crate::domain::{TermList, TermListInput};
use crate::errors::{ClassificationResult, ResultExt};
use crate::identifiers::{ProjectId, TermListId};
use crate::paging::{Page, PageRequest};

impl ClassificationService {
    /// Create an empty Term List
    pub async fn create_term_list(&self, project_id: &ProjectId, input: TermListInput) -> ClassificationResult<TermList> {
        let lexicon = self
            .client
            .create_lexicon(project_id, input.name, input.description, Vec::new())
            .await?;
        info!(project_id = %project_id, term_list_id = %lexicon.id, "Created Term List");
        Ok(TermList::from(&lexicon))
    }

    /// Retrieve a Term List
    pub async fn get_term_list(&self, project_id: &ProjectId, id: TermListId) -> ClassificationResult<TermList> {
        let lexicon = self.client.get_lexicon(project_id, id).await?;
        Ok(TermList::from(&lexicon))
    }

    /// Retrieve one page of Term Lists
    pub async fn list_term_lists(&self, project_id: &ProjectId, page: PageRequest) -> ClassificationResult<Page<TermList>> {
        let lexicons = self.client.list_lexicons(project_id, page).await?;
        Ok(Page::new(
            lexicons.results.iter().map(TermList::from).collect(),
            lexicons.totalhits,
        ))
    }

    /// Rename a Term List, its Terms are left as they are
    pub async fn update_term_list(
        &self,
        project_id: &ProjectId,
        id: TermListId,
        input: TermListInput,
    ) -> ClassificationResult<TermList> {
        let mut lexicon = self.client.get_lexicon(project_id, id).await?;
        lexicon.name = Some(input.name);
        lexicon.description = input.description;
        let updated = self.client.update_lexicon(project_id, &lexicon, None).await?;
        info!(project_id = %project_id, term_list_id = %id, "Updated Term List");
        Ok(TermList::from(&updated))
    }

    /// Delete a Term List with its Terms
    pub async fn delete_term_list(&self, project_id: &ProjectId, id: TermListId) -> ClassificationResult<()> {
        self.client
            .delete_lexicon(project_id, id)
            .await
            .not_found_as(|| format!("Unable to find Term List with ID: {id}"))?;
        info!(project_id = %project_id, term_list_id = %id, "Deleted Term List");
        Ok(())
    }
}
