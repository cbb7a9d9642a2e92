// Copyright 2025 Cowboy AI, LLC.

//! Composite entity orchestration
//!
//! [`ClassificationService`] exposes the public domain model. Every operation
//! is a plan of remote reads and mutations against the policy service:
//! validation reads first, then ordered mutations. Mutations touching more
//! than one remote resource run as a [`Saga`](crate::saga::Saga) so already
//! applied steps are compensated when a later one fails.
//!
//! The operations are grouped per entity in the submodules.

mod classification_rules;
mod classifications;
mod rule_classifications;
mod rule_conditions;
mod term_lists;
mod terms;
mod validation;
mod workflows;

use std::sync::Arc;

use crate::cache::PolicyCache;
use crate::config::ServiceConfig;
use crate::errors::ClassificationResult;
use crate::paging::PageRequest;
use crate::policy_api::{HttpPolicyApi, PolicyApi, PolicyClient};
use crate::transcoder::ConditionTranscoder;

/// Entry point for every operation on the public domain model
#[derive(Debug, Clone)]
pub struct ClassificationService {
    client: PolicyClient,
    transcoder: ConditionTranscoder,
    config: ServiceConfig,
}

impl ClassificationService {
    /// Create a service over an explicit transport and Policy cache
    pub fn new(api: Arc<dyn PolicyApi>, policy_cache: Arc<PolicyCache>, config: ServiceConfig) -> Self {
        Self {
            client: PolicyClient::new(api, policy_cache),
            transcoder: ConditionTranscoder::from_config(&config),
            config,
        }
    }

    /// Create a service talking HTTP to the configured policy service
    pub fn from_config(config: ServiceConfig) -> ClassificationResult<Self> {
        let api = HttpPolicyApi::from_config(&config)?;
        let cache = PolicyCache::from_config(&config);
        Ok(Self::new(Arc::new(api), Arc::new(cache), config))
    }

    /// Typed client for the remote resources
    pub fn client(&self) -> &PolicyClient {
        &self.client
    }

    /// Transcoder applied to condition payloads
    pub fn transcoder(&self) -> &ConditionTranscoder {
        &self.transcoder
    }

    /// Configuration in use
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Validated page request using the configured default page size
    pub fn page_request(&self, page_num: Option<i64>, page_size: Option<i64>) -> PageRequest {
        PageRequest::validated(page_num, page_size, self.config.default_page_size)
    }
}
