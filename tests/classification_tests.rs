// Copyright 2025 Cowboy AI, LLC.

//! Classification lifecycle against the in-memory policy service

mod common;

use classification_service::linkage::{condition_id_from_policy_name, policy_id_from_condition_name};
use classification_service::policy_api::ResourceType;
use classification_service::{
    ClassificationError, ClassificationTarget, ConditionBody, RuleClassificationInput,
    ServiceConfig, TermListInput,
};
use common::{classification_input, project, service, service_with, title_exists};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_create_and_get_classification() {
    let (service, api) = service();
    let created = service
        .create_classification(&project(), classification_input("Invoices", title_exists()))
        .await
        .unwrap();

    assert_eq!(created.name.as_deref(), Some("Invoices"));
    assert_eq!(created.description.as_deref(), Some("Invoices documents"));
    assert_eq!(created.kind.as_deref(), Some("finance"));
    assert_eq!(
        created.classification_target,
        Some(ClassificationTarget::ContainerAndImmediateChildren)
    );
    assert_eq!(created.additional.notes, None);
    match &created.additional.body {
        ConditionBody::Boolean { operator, children } => {
            assert_eq!(operator.as_deref(), Some("and"));
            assert_eq!(children.len(), 2);
            assert_eq!(
                children[0].additional.body,
                ConditionBody::Exists {
                    field: Some("TITLE".to_string())
                }
            );
        }
        other => panic!("unexpected root {other:?}"),
    }

    // Policy and Condition point at each other
    let policy = api
        .resource(&project(), ResourceType::Policy, created.id.get())
        .await
        .unwrap();
    let condition_id = condition_id_from_policy_name(policy["name"].as_str()).unwrap();
    let condition = api
        .resource(&project(), ResourceType::Condition, condition_id.get())
        .await
        .unwrap();
    assert_eq!(
        policy_id_from_condition_name(condition["name"].as_str()),
        Some(created.id)
    );
    assert_eq!(condition["additional"]["notes"], json!("API_CLASSIFICATION"));
    assert_eq!(condition["additional"]["include_descendants"], json!(false));
    assert_eq!(condition["additional"]["target"], json!("ALL"));

    let fetched = service.get_classification(&project(), created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_list_classifications_pages_remotely() {
    let (service, _) = service();
    for name in ["Invoices", "Receipts", "Contracts"] {
        service
            .create_classification(&project(), classification_input(name, title_exists()))
            .await
            .unwrap();
    }

    let all = service
        .list_classifications(&project(), service.page_request(None, None))
        .await
        .unwrap();
    assert_eq!(all.total_hits, 3);
    let names: Vec<_> = all.items.iter().filter_map(|item| item.name.clone()).collect();
    assert_eq!(names, vec!["Invoices", "Receipts", "Contracts"]);

    let second = service
        .list_classifications(&project(), service.page_request(Some(2), Some(2)))
        .await
        .unwrap();
    assert_eq!(second.total_hits, 3);
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].name.as_deref(), Some("Contracts"));
}

#[tokio::test]
async fn test_update_classification_replaces_tree_and_metadata() {
    let (service, _) = service();
    let created = service
        .create_classification(&project(), classification_input("Invoices", title_exists()))
        .await
        .unwrap();

    let mut input = classification_input("Bills", json!({"type": "exists", "field": "AMOUNT"}));
    input.classification_target = Some(ClassificationTarget::All);
    input.description = None;
    let updated = service
        .update_classification(&project(), created.id, input)
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name.as_deref(), Some("Bills"));
    assert_eq!(updated.description, None);
    assert_eq!(updated.classification_target, Some(ClassificationTarget::All));
    assert_eq!(
        updated.additional.body,
        ConditionBody::Exists {
            field: Some("AMOUNT".to_string())
        }
    );
}

#[tokio::test]
async fn test_delete_classification_removes_both_resources() {
    let (service, api) = service();
    let created = service
        .create_classification(&project(), classification_input("Invoices", title_exists()))
        .await
        .unwrap();

    service.delete_classification(&project(), created.id).await.unwrap();
    assert_eq!(api.count(&project(), ResourceType::Policy).await, 0);
    assert_eq!(api.count(&project(), ResourceType::Condition).await, 0);

    let err = service
        .get_classification(&project(), created.id)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("Unable to retrieve Classification with ID: {}", created.id)
    );
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_classification_in_use_is_refused() {
    let (service, api) = service();
    let classification = service
        .create_classification(&project(), classification_input("Invoices", title_exists()))
        .await
        .unwrap();
    let workflow = common::workflow(&service, "Inbound").await;
    let rule = common::rule(&service, &workflow, "Finance", None).await;
    service
        .create_rule_classification(
            &project(),
            workflow.id,
            rule.id,
            RuleClassificationInput {
                classification_id: classification.id,
            },
        )
        .await
        .unwrap();

    let err = service
        .delete_classification(&project(), classification.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ClassificationError::Conflict(_)));

    // nothing was removed
    assert!(api
        .resource(&project(), ResourceType::Policy, classification.id.get())
        .await
        .is_some());
    assert!(service
        .get_classification(&project(), classification.id)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_missing_term_list_is_invalid_argument() {
    let (service, api) = service();
    let input = classification_input(
        "Invoices",
        json!({"type": "termlist", "field": "CONTENT", "value": 9999}),
    );

    let err = service
        .create_classification(&project(), input)
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(
        err.to_string(),
        "Unable to find all Term List IDs specified in Classification."
    );
    assert_eq!(api.count(&project(), ResourceType::Condition).await, 0);
    assert_eq!(api.count(&project(), ResourceType::Policy).await, 0);
}

#[tokio::test]
async fn test_term_list_reference_round_trips() {
    let (service, _) = service();
    let term_list = service
        .create_term_list(
            &project(),
            TermListInput {
                name: "Vendors".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();

    let created = service
        .create_classification(
            &project(),
            classification_input(
                "Vendor mail",
                json!({
                    "type": "boolean",
                    "operator": "or",
                    "children": [
                        {"additional": {"type": "termlist", "field": "FROM", "value": term_list.id}}
                    ]
                }),
            ),
        )
        .await
        .unwrap();

    match created.additional.body {
        ConditionBody::Boolean { children, .. } => assert_eq!(
            children[0].additional.body,
            ConditionBody::Termlist {
                field: Some("FROM".to_string()),
                value: Some(term_list.id)
            }
        ),
        other => panic!("unexpected root {other:?}"),
    }
}

#[tokio::test]
async fn test_tree_deeper_than_limit_is_rejected_before_any_call() {
    let (service, api) = service_with(ServiceConfig::default().with_max_condition_depth(3));
    let mut tree = json!({"type": "exists", "field": "TITLE"});
    for _ in 0..4 {
        tree = json!({"type": "boolean", "operator": "and", "children": [{"additional": tree}]});
    }

    let err = service
        .create_classification(&project(), classification_input("Deep", tree))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClassificationError::StructureTooDeep {
            measure: "levels",
            limit: 3
        }
    ));
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn test_children_must_be_an_array() {
    let (service, _) = service();
    let err = service
        .create_classification(
            &project(),
            classification_input("Broken", json!({"type": "boolean", "children": {"a": 1}})),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClassificationError::InvalidStructure(_)));
}
