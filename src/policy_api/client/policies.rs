// Copyright 2025 Cowboy AI, LLC.

use serde_json::Value;
use tracing::debug;

use super::conditions::join_ids;
use super::PolicyClient;
use crate::errors::ClassificationResult;
use crate::identifiers::{PolicyId, ProjectId};
use crate::paging::PageRequest;
use crate::policy_api::resources::PolicyResource;
use crate::policy_api::{ListResponse, PolicyRequest, ResourceType, Verb};

impl PolicyClient {
    /// Create a policy and cache it
    pub async fn create_policy(
        &self,
        project_id: &ProjectId,
        name: String,
        description: String,
        additional: Value,
    ) -> ClassificationResult<PolicyResource> {
        let request = PolicyRequest::new(project_id, ResourceType::Policy)
            .with_name(Some(name))
            .with_description(Some(description))
            .with_additional(additional);
        let created: PolicyResource = self.send(Verb::Create, request).await?;
        self.policy_cache
            .put(project_id, created.id, created.clone())
            .await;
        debug!(project_id = %project_id, policy_id = %created.id, "Created Policy");
        Ok(created)
    }

    /// Retrieve a policy, serving it from the cache when possible
    pub async fn get_policy(&self, project_id: &ProjectId, id: PolicyId) -> ClassificationResult<PolicyResource> {
        if let Some(cached) = self.policy_cache.get(project_id, id).await {
            debug!(project_id = %project_id, policy_id = %id, "Policy served from cache");
            return Ok(cached);
        }
        let request = PolicyRequest::new(project_id, ResourceType::Policy).with_id(id);
        let policy: PolicyResource = self
            .retrieve_one(request, format!("Unable to find Policy with ID: {id}"))
            .await?;
        self.policy_cache.put(project_id, id, policy.clone()).await;
        Ok(policy)
    }

    /// Retrieve several policies
    ///
    /// Cached policies are returned first, the rest is fetched in one call and
    /// cached. The result order follows that split, not the order of `ids`.
    pub async fn get_policies(
        &self,
        project_id: &ProjectId,
        ids: &[PolicyId],
    ) -> ClassificationResult<ListResponse<PolicyResource>> {
        let mut cached = Vec::new();
        let mut missing = Vec::new();
        for id in ids {
            match self.policy_cache.get(project_id, *id).await {
                Some(policy) => cached.push(policy),
                None => missing.push(*id),
            }
        }

        let request = PolicyRequest::new(project_id, ResourceType::Policy).with_ids(missing.iter().copied());
        let fetched: Vec<PolicyResource> = self
            .retrieve_all(
                request,
                missing.len(),
                format!("Unable to find all Policies with IDs: {}", join_ids(&missing)),
            )
            .await?;
        for policy in &fetched {
            self.policy_cache
                .put(project_id, policy.id, policy.clone())
                .await;
        }

        let mut results = cached;
        results.extend(fetched);
        let total = results.len();
        Ok(ListResponse::new(results, total))
    }

    /// Retrieve one page of policies from the remote service and cache them
    pub async fn list_policies(
        &self,
        project_id: &ProjectId,
        page: PageRequest,
    ) -> ClassificationResult<ListResponse<PolicyResource>> {
        let request = PolicyRequest::new(project_id, ResourceType::Policy).with_page(page.remote_start(), page.page_size);
        let response: ListResponse<PolicyResource> = self.retrieve(request).await?;
        for policy in &response.results {
            self.policy_cache
                .put(project_id, policy.id, policy.clone())
                .await;
        }
        Ok(response)
    }

    /// Update a policy and overwrite its cache entry
    pub async fn update_policy(
        &self,
        project_id: &ProjectId,
        id: PolicyId,
        name: Option<String>,
        description: Option<String>,
        additional: Value,
    ) -> ClassificationResult<PolicyResource> {
        let request = PolicyRequest::new(project_id, ResourceType::Policy)
            .with_id(id)
            .with_name(name)
            .with_description(description)
            .with_additional(additional);
        let updated: PolicyResource = self.send(Verb::Update, request).await?;
        self.policy_cache
            .put(project_id, updated.id, updated.clone())
            .await;
        Ok(updated)
    }

    /// Delete a policy and drop it from the cache
    pub async fn delete_policy(&self, project_id: &ProjectId, id: PolicyId) -> ClassificationResult<()> {
        self.policy_cache.invalidate(project_id, id).await;
        self.delete(PolicyRequest::new(project_id, ResourceType::Policy).with_id(id))
            .await
    }

    /// Delete several policies and drop them from the cache
    pub async fn delete_policies(&self, project_id: &ProjectId, ids: &[PolicyId]) -> ClassificationResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.policy_cache
            .invalidate_many(project_id, ids.iter().copied())
            .await;
        self.delete(PolicyRequest::new(project_id, ResourceType::Policy).with_ids(ids.iter().copied()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::cache::PolicyCache;
    use crate::identifiers::{PolicyId, ProjectId};
    use crate::paging::PageRequest;
    use crate::policy_api::{MockPolicyApi, PolicyClient, ResourceType, Verb};

    fn policy(id: i64) -> serde_json::Value {
        json!({"id": id, "name": format!("CLASSIFICATION_CONDITION_ID:{}", id + 100), "additional": {}})
    }

    #[tokio::test]
    async fn test_get_policy_is_cached() {
        let mut api = MockPolicyApi::new();
        api.expect_call()
            .times(1)
            .returning(|_, _| Ok(json!({"totalhits": 1, "results": [policy(4)]})));
        let client = PolicyClient::new(Arc::new(api), Arc::new(PolicyCache::new(10, None)));
        let project = ProjectId::new("p");

        let first = client.get_policy(&project, PolicyId::new(4)).await.unwrap();
        let second = client.get_policy(&project, PolicyId::new(4)).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_batch_read_fetches_only_uncached() {
        let mut api = MockPolicyApi::new();
        api.expect_call()
            .withf(|verb, request| {
                *verb == Verb::Retrieve
                    && request.kind == ResourceType::Policy
                    && request.id.as_ref().map(|ids| ids.ids()) == Some(vec![2, 3])
            })
            .times(1)
            .returning(|_, _| Ok(json!({"totalhits": 2, "results": [policy(2), policy(3)]})));
        let cache = Arc::new(PolicyCache::new(10, None));
        let project = ProjectId::new("p");
        cache
            .put(&project, 1, serde_json::from_value(policy(1)).unwrap())
            .await;
        let client = PolicyClient::new(Arc::new(api), cache);

        let response = client
            .get_policies(&project, &[PolicyId::new(1), PolicyId::new(2), PolicyId::new(3)])
            .await
            .unwrap();
        assert_eq!(response.totalhits, 3);
        let ids: Vec<i64> = response.results.iter().map(|policy| policy.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_listed_policies_are_cached() {
        let mut api = MockPolicyApi::new();
        api.expect_call()
            .withf(|verb, request| *verb == Verb::Retrieve && request.id.is_none())
            .times(1)
            .returning(|_, _| Ok(json!({"totalhits": 5, "results": [policy(7), policy(8)]})));
        let client = PolicyClient::new(Arc::new(api), Arc::new(PolicyCache::new(10, None)));
        let project = ProjectId::new("p");

        let page = client
            .list_policies(&project, PageRequest::validated(Some(1), Some(2), 100))
            .await
            .unwrap();
        assert_eq!(page.totalhits, 5);

        // served without another remote call
        let cached = client.get_policy(&project, PolicyId::new(8)).await.unwrap();
        assert_eq!(cached, page.results[1]);
    }

    #[tokio::test]
    async fn test_delete_invalidates_cache() {
        let mut api = MockPolicyApi::new();
        api.expect_call()
            .withf(|verb, _| *verb == Verb::Delete)
            .times(1)
            .returning(|_, _| Ok(json!({"result": "success"})));
        let cache = Arc::new(PolicyCache::new(10, None));
        let project = ProjectId::new("p");
        cache
            .put(&project, 4, serde_json::from_value(policy(4)).unwrap())
            .await;
        let client = PolicyClient::new(Arc::new(api), cache.clone());

        client.delete_policy(&project, PolicyId::new(4)).await.unwrap();
        assert!(cache.get(&project, 4).await.is_none());
    }
}
