// Copyright 2025 Cowboy AI, LLC.

//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::sync::Arc;

use classification_service::{
    ClassificationInput, ClassificationRule, ClassificationRuleInput, ClassificationService,
    ClassificationTarget, InMemoryPolicyApi, PolicyCache, ProjectId, ServiceConfig, Workflow,
    WorkflowInput,
};
use serde_json::{json, Value};

pub fn project() -> ProjectId {
    ProjectId::new("tenant-a")
}

pub fn service() -> (ClassificationService, Arc<InMemoryPolicyApi>) {
    service_with(ServiceConfig::default())
}

pub fn service_with(config: ServiceConfig) -> (ClassificationService, Arc<InMemoryPolicyApi>) {
    let api = Arc::new(InMemoryPolicyApi::new());
    let cache = Arc::new(PolicyCache::from_config(&config));
    let service = ClassificationService::new(api.clone(), cache, config);
    (service, api)
}

pub fn title_exists() -> Value {
    json!({
        "type": "boolean",
        "operator": "and",
        "children": [
            {"additional": {"type": "exists", "field": "TITLE"}},
            {"additional": {"type": "string", "field": "CONTENT", "operator": "contains", "value": "invoice"}}
        ]
    })
}

pub fn classification_input(name: &str, additional: Value) -> ClassificationInput {
    ClassificationInput {
        name: name.to_string(),
        description: Some(format!("{name} documents")),
        kind: "finance".to_string(),
        classification_target: Some(ClassificationTarget::ContainerAndImmediateChildren),
        additional,
    }
}

pub async fn workflow(service: &ClassificationService, name: &str) -> Workflow {
    service
        .create_workflow(
            &project(),
            WorkflowInput {
                name: name.to_string(),
                description: None,
                notes: None,
            },
        )
        .await
        .unwrap()
}

pub async fn rule(
    service: &ClassificationService,
    workflow: &Workflow,
    name: &str,
    priority: Option<i64>,
) -> ClassificationRule {
    service
        .create_classification_rule(
            &project(),
            workflow.id,
            ClassificationRuleInput {
                name: name.to_string(),
                description: None,
                priority,
            },
        )
        .await
        .unwrap()
}
