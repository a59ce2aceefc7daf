//! End-to-end tests for the relationship consistency manager and the
//! authorize flow, running against the in-memory relation store.

use authz_service::{AuthzService, ServiceError};
use policy_engine::{Attribute, Condition, Operation, Policy, Verdict};
use relation_store::{InMemoryRelationStore, StoreError};
use std::sync::Arc;
use uuid::Uuid;

fn service() -> AuthzService {
    AuthzService::new(Arc::new(InMemoryRelationStore::new()))
}

fn attrs(pairs: &[(&str, &str)]) -> Vec<Attribute> {
    pairs
        .iter()
        .map(|(key, value)| Attribute::new(key, value))
        .collect()
}

#[tokio::test]
async fn test_duplicate_contract_rejected() {
    let service = service();
    let manager = service.manager();

    let subject = manager.add_subject("u1").await.unwrap();
    let group = manager
        .create_group(policy_engine::Group::with_attributes(attrs(&[("tier", "gold")])))
        .await
        .unwrap();

    let subject_id = subject.id.unwrap();
    let group_id = group.id.unwrap();

    manager.add_contract(subject_id, group_id).await.unwrap();
    let err = manager.add_contract(subject_id, group_id).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Store(StoreError::AlreadyExists(_))
    ));
}

#[tokio::test]
async fn test_zombie_group_cleanup_waits_for_last_reference() {
    let service = service();
    let manager = service.manager();

    let a = manager.add_subject("user-a").await.unwrap();
    let b = manager.add_subject("user-b").await.unwrap();
    let group = manager
        .create_group(policy_engine::Group::with_attributes(attrs(&[("shared", "yes")])))
        .await
        .unwrap();
    let group_id = group.id.unwrap();

    manager.add_contract(a.id.unwrap(), group_id).await.unwrap();
    manager.add_contract(b.id.unwrap(), group_id).await.unwrap();

    // deleting A leaves the group referenced by B
    manager.delete_subject(a.id.unwrap()).await.unwrap();
    assert!(manager.get_group(group_id).await.is_ok());

    // deleting B orphans the group, which is removed
    manager.delete_subject(b.id.unwrap()).await.unwrap();
    let err = manager.get_group(group_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_missing_subject_rolls_back() {
    let service = service();
    let err = service
        .manager()
        .delete_subject(Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_add_subject_with_attributes_is_atomic() {
    let service = service();
    let manager = service.manager();

    let (subject, group, contract) = manager
        .add_subject_with_attributes("u1", attrs(&[("role", "admin")]))
        .await
        .unwrap();

    assert_eq!(contract.subject_id, subject.id.unwrap());
    assert_eq!(contract.group_id, group.id.unwrap());

    let groups = manager.groups_by_subject(subject.id.unwrap()).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].attributes, attrs(&[("role", "admin")]));
}

#[tokio::test]
async fn test_create_group_for_subjects_binds_resolved_subjects() {
    let service = service();
    let manager = service.manager();

    let a = manager.add_subject("user-a").await.unwrap();
    let b = manager.add_subject("user-b").await.unwrap();

    // one id that resolves to nothing is skipped, not fatal
    let ids = vec![a.id.unwrap(), b.id.unwrap(), Uuid::new_v4()];
    let (group, contracts) = manager
        .create_group_for_subjects(ids, attrs(&[("team", "core")]))
        .await
        .unwrap();

    assert_eq!(contracts.len(), 2);
    for contract in &contracts {
        assert_eq!(contract.group_id, group.id.unwrap());
    }
}

#[tokio::test]
async fn test_create_group_for_no_subjects_is_a_validation_error() {
    let service = service();
    let err = service
        .manager()
        .create_group_for_subjects(vec![], attrs(&[("team", "core")]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Store(StoreError::Validation(_))
    ));
}

#[tokio::test]
async fn test_delete_group_removes_its_contracts() {
    let service = service();
    let manager = service.manager();

    let (subject, group, _contract) = manager
        .add_subject_with_attributes("u1", attrs(&[("tier", "gold")]))
        .await
        .unwrap();

    manager.delete_group(group.id.unwrap()).await.unwrap();

    let groups = manager.groups_by_subject(subject.id.unwrap()).await.unwrap();
    assert!(groups.is_empty());
}

#[tokio::test]
async fn test_duplicate_group_gets_fresh_identifier() {
    let service = service();
    let manager = service.manager();

    let group = manager
        .create_group(policy_engine::Group::with_attributes(attrs(&[("tier", "gold")])))
        .await
        .unwrap();
    let copy = manager.duplicate_group(group.id.unwrap()).await.unwrap();

    assert_ne!(copy.id, group.id);
    assert_eq!(copy.attributes, group.attributes);
}

#[tokio::test]
async fn test_find_subjects_by_user() {
    let service = service();
    let manager = service.manager();

    manager.add_subject("shared-user").await.unwrap();
    manager.add_subject("shared-user").await.unwrap();
    manager.add_subject("other-user").await.unwrap();

    let found = manager.find_subjects_by_user("shared-user").await.unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn test_authorize_end_to_end() {
    let service = service();
    let manager = service.manager();

    let (subject, group, _contract) = manager
        .add_subject_with_attributes("u1", attrs(&[("tier", "gold")]))
        .await
        .unwrap();
    let subject_id = subject.id.unwrap();
    let group_id = group.id.unwrap();

    let policy = manager
        .create_policy(Policy::with_condition(Condition::has_attribute(["tier"])))
        .await
        .unwrap();
    let policy_id = policy.id.unwrap();

    let verdict = service.authorize(subject_id, policy_id, None).await.unwrap();
    assert_eq!(verdict, Verdict::Permitted);

    // cascade: deleting the subject orphans and removes its group
    manager.delete_subject(subject_id).await.unwrap();
    let err = manager.get_group(group_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::NotFound(_))));

    // the subject now resolves no attributes at all
    let verdict = service.authorize(subject_id, policy_id, None).await.unwrap();
    assert_eq!(verdict, Verdict::Denied);
}

#[tokio::test]
async fn test_authorize_merges_attributes_across_groups() {
    let service = service();
    let manager = service.manager();

    let (subject, _g, _c) = manager
        .add_subject_with_attributes("u1", attrs(&[("tier", "silver")]))
        .await
        .unwrap();
    let subject_id = subject.id.unwrap();

    // a later binding with a conflicting key overrides the earlier value
    let (_, contracts) = manager
        .create_group_for_subjects(vec![subject_id], attrs(&[("tier", "gold")]))
        .await
        .unwrap();
    assert_eq!(contracts.len(), 1);

    let policy = manager
        .create_policy(Policy::with_condition(Condition::evaluate_attribute(
            "tier",
            Operation::Eq,
            "gold",
        )))
        .await
        .unwrap();

    let verdict = service
        .authorize(subject_id, policy.id.unwrap(), None)
        .await
        .unwrap();
    assert_eq!(verdict, Verdict::Permitted);
}

#[tokio::test]
async fn test_authorize_with_missing_policy_surfaces_not_found() {
    let service = service();
    let subject = service.manager().add_subject("u1").await.unwrap();

    let err = service
        .authorize(subject.id.unwrap(), Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Store(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_authorize_with_conditionless_policy_is_malformed() {
    let service = service();
    let manager = service.manager();

    let subject = manager.add_subject("u1").await.unwrap();
    let policy = manager
        .create_policy(Policy {
            id: None,
            condition: None,
        })
        .await
        .unwrap();

    let err = service
        .authorize(subject.id.unwrap(), policy.id.unwrap(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Policy(_)));
}
