// Copyright 2025 Cowboy AI, LLC.

//! Workflow lifecycle

mod common;

use classification_service::{ClassificationError, WorkflowInput};
use common::{project, rule, service, workflow};
use pretty_assertions::assert_eq;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_workflow_crud() {
    let (service, _) = service();
    let created = service
        .create_workflow(
            &project(),
            WorkflowInput {
                name: "Inbound".to_string(),
                description: Some("Mail from outside".to_string()),
                notes: Some("reviewed weekly".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.name.as_deref(), Some("Inbound"));
    assert_eq!(created.notes.as_deref(), Some("reviewed weekly"));

    let fetched = service.get_workflow(&project(), created.id).await.unwrap();
    assert_eq!(fetched, created);

    workflow(&service, "Outbound").await;
    let listed = service
        .list_workflows(&project(), service.page_request(Some(1), Some(1)))
        .await
        .unwrap();
    assert_eq!(listed.total_hits, 2);
    assert_eq!(listed.items, vec![created.clone()]);

    assert_ok!(service.delete_workflow(&project(), created.id).await);
    let err = assert_err!(service.get_workflow(&project(), created.id).await);
    assert!(err.is_not_found());
    assert_eq!(
        err.to_string(),
        format!("Unable to find Workflow with ID: {}", created.id)
    );
}

#[tokio::test]
async fn test_update_keeps_classification_rules() {
    let (service, _) = service();
    let inbound = workflow(&service, "Inbound").await;
    let finance = rule(&service, &inbound, "Finance", None).await;

    let updated = service
        .update_workflow(
            &project(),
            inbound.id,
            WorkflowInput {
                name: "Inbound mail".to_string(),
                description: Some("Everything received".to_string()),
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name.as_deref(), Some("Inbound mail"));
    assert_eq!(updated.description.as_deref(), Some("Everything received"));

    let fetched = assert_ok!(
        service
            .get_classification_rule(&project(), inbound.id, finance.id)
            .await
    );
    assert_eq!(fetched.priority, finance.priority);
}

#[tokio::test]
async fn test_delete_refused_while_rules_remain() {
    let (service, _) = service();
    let inbound = workflow(&service, "Inbound").await;
    let finance = rule(&service, &inbound, "Finance", None).await;

    let err = assert_err!(service.delete_workflow(&project(), inbound.id).await);
    assert!(matches!(err, ClassificationError::InvalidArgument(_)));
    assert_eq!(
        err.to_string(),
        "Unable to Delete. There are Classification Rules on the Workflow."
    );

    service
        .delete_classification_rule(&project(), inbound.id, finance.id)
        .await
        .unwrap();
    assert_ok!(service.delete_workflow(&project(), inbound.id).await);
}
