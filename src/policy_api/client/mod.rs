// Copyright 2025 Cowboy AI, LLC.

//! Typed operations per remote resource family
//!
//! [`PolicyClient`] wraps a [`PolicyApi`] transport. Each submodule adds the
//! operations of one resource family. Retrieves of a single resource, or of an
//! id list, report absent resources as [`ClassificationError::NotFound`] with a
//! family specific message; callers can re-word it with
//! [`ResultExt::not_found_as`](crate::errors::ResultExt::not_found_as).

mod collections;
mod conditions;
mod lexicons;
mod policies;
mod sequences;
mod workflows;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ListResponse, PolicyApi, PolicyRequest, Verb};
use crate::cache::PolicyCache;
use crate::errors::{ClassificationError, ClassificationResult, ResultExt};

/// Typed client for the remote policy service
#[derive(Clone)]
pub struct PolicyClient {
    api: Arc<dyn PolicyApi>,
    policy_cache: Arc<PolicyCache>,
}

impl std::fmt::Debug for PolicyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyClient").finish_non_exhaustive()
    }
}

impl PolicyClient {
    /// Create a client over `api`, caching Policies in `policy_cache`
    pub fn new(api: Arc<dyn PolicyApi>, policy_cache: Arc<PolicyCache>) -> Self {
        Self { api, policy_cache }
    }

    /// The Policy cache in use
    pub fn policy_cache(&self) -> &Arc<PolicyCache> {
        &self.policy_cache
    }

    async fn send<T: DeserializeOwned>(&self, verb: Verb, request: PolicyRequest) -> ClassificationResult<T> {
        let value = self.api.call(verb, request).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn retrieve<T: DeserializeOwned>(&self, request: PolicyRequest) -> ClassificationResult<ListResponse<T>> {
        self.send(Verb::Retrieve, request).await
    }

    /// Retrieve exactly one resource, absent ones reported with `not_found`
    async fn retrieve_one<T: DeserializeOwned>(
        &self,
        request: PolicyRequest,
        not_found: String,
    ) -> ClassificationResult<T> {
        let response: ListResponse<T> = match self.retrieve(request).await {
            Ok(response) => response,
            Err(err) => return Err(err).not_found_as(|| not_found),
        };
        response
            .results
            .into_iter()
            .next()
            .ok_or(ClassificationError::NotFound(not_found))
    }

    /// Retrieve every resource of an id list
    async fn retrieve_all<T: DeserializeOwned>(
        &self,
        request: PolicyRequest,
        expected: usize,
        not_found: String,
    ) -> ClassificationResult<Vec<T>> {
        if expected == 0 {
            return Ok(Vec::new());
        }
        let response: ListResponse<T> = match self.retrieve(request).await {
            Ok(response) => response,
            Err(err) => return Err(err).not_found_as(|| not_found),
        };
        if response.results.len() < expected {
            debug!(
                expected,
                returned = response.results.len(),
                "Policy API returned fewer resources than requested"
            );
            return Err(ClassificationError::NotFound(not_found));
        }
        Ok(response.results)
    }

    /// Retrieve the first resource matching a filter, if any
    async fn retrieve_first<T: DeserializeOwned>(&self, request: PolicyRequest) -> ClassificationResult<Option<T>> {
        let response: ListResponse<T> = self.retrieve(request).await?;
        Ok(response.results.into_iter().next())
    }

    async fn delete(&self, request: PolicyRequest) -> ClassificationResult<()> {
        let kind = request.kind;
        let body = self.api.call(Verb::Delete, request).await?;
        inspect_delete_body(&body).inspect_err(|err| {
            warn!(kind = %kind, error = %err, "Policy API refused delete");
        })
    }
}

/// Check the body of a successful delete response for a refusal
///
/// The remote service reports some refused deletes with a success status and
/// an error payload.
pub fn inspect_delete_body(body: &Value) -> ClassificationResult<()> {
    let Some(object) = body.as_object() else {
        return Ok(());
    };
    let text = |key: &str| {
        object
            .get(key)
            .filter(|value| !value.is_null())
            .map(|value| match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
    };
    let refused = text("reason").is_some()
        || text("error").is_some()
        || object.get("success") == Some(&Value::Bool(false));
    if !refused {
        return Ok(());
    }
    let message = text("message")
        .or_else(|| text("reason"))
        .or_else(|| text("error"))
        .unwrap_or_else(|| "Delete refused by Policy API".to_string());
    Err(ClassificationError::Conflict(message))
}
