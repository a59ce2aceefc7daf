use crate::{
    error::{Result, StoreError},
    models::{Contract, Group, Policy, Subject},
    transaction::{RelationStore, StoreTransaction},
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct State {
    subjects: HashMap<Uuid, Subject>,
    groups: HashMap<Uuid, Group>,
    policies: HashMap<Uuid, Policy>,
    contracts: Vec<Contract>,
}

/// In-memory relation store for tests and local development
///
/// Transactions are snapshots: `begin` clones the shared state, operations
/// mutate the clone, and `commit` swaps it back in. Semantics match the
/// PostgreSQL backend, including `NotFound` on zero-effect mutations and
/// `AlreadyExists` for a duplicate (subject, group) contract binding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRelationStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryRelationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RelationStore for InMemoryRelationStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let working = self.state.lock().clone();
        Ok(Box::new(InMemoryTransaction {
            base: self.state.clone(),
            working,
        }))
    }
}

struct InMemoryTransaction {
    base: Arc<Mutex<State>>,
    working: State,
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn get_subject(&mut self, id: Uuid) -> Result<Subject> {
        self.working
            .subjects
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("subject not found for id {}", id)))
    }

    async fn bulk_get_subjects(&mut self, ids: &[Uuid]) -> Result<Vec<Subject>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.working.subjects.get(id).cloned())
            .collect())
    }

    async fn find_subjects_by_user(&mut self, user_id: &str) -> Result<Vec<Subject>> {
        Ok(self
            .working
            .subjects
            .values()
            .filter(|subject| subject.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn put_subject(&mut self, subject: Subject) -> Result<Subject> {
        let id = subject.id.unwrap_or_else(Uuid::new_v4);
        let subject = Subject {
            id: Some(id),
            user_id: subject.user_id,
        };
        self.working.subjects.insert(id, subject.clone());
        Ok(subject)
    }

    async fn delete_subject(&mut self, id: Uuid) -> Result<()> {
        self.working
            .subjects
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("subject not found for id {}", id)))
    }

    async fn get_group(&mut self, id: Uuid) -> Result<Group> {
        self.working
            .groups
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("no record in groups for {}", id)))
    }

    async fn bulk_get_groups(&mut self, ids: &[Uuid]) -> Result<Vec<Group>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.working.groups.get(id).cloned())
            .collect())
    }

    async fn put_group(&mut self, group: Group) -> Result<Group> {
        let id = group.id.unwrap_or_else(Uuid::new_v4);
        let group = Group {
            id: Some(id),
            attributes: group.attributes,
        };
        self.working.groups.insert(id, group.clone());
        Ok(group)
    }

    async fn delete_group(&mut self, id: Uuid) -> Result<()> {
        self.working
            .groups
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("{} not found in groups", id)))
    }

    async fn get_policy(&mut self, id: Uuid) -> Result<Policy> {
        self.working
            .policies
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("no record in policies for {}", id)))
    }

    async fn put_policy(&mut self, policy: Policy) -> Result<Policy> {
        let id = policy.id.unwrap_or_else(Uuid::new_v4);
        let policy = Policy {
            id: Some(id),
            condition: policy.condition,
        };
        self.working.policies.insert(id, policy.clone());
        Ok(policy)
    }

    async fn delete_policy(&mut self, id: Uuid) -> Result<()> {
        self.working
            .policies
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("{} not found in policies", id)))
    }

    async fn insert_contract(&mut self, subject_id: Uuid, group_id: Uuid) -> Result<Contract> {
        // same uniqueness rule the contracts table enforces
        let duplicate = self
            .working
            .contracts
            .iter()
            .any(|contract| contract.subject_id == subject_id && contract.group_id == group_id);
        if duplicate {
            return Err(StoreError::AlreadyExists(format!(
                "contract for {}:{} already exists",
                subject_id, group_id
            )));
        }
        let contract = Contract {
            id: Uuid::new_v4(),
            subject_id,
            group_id,
        };
        self.working.contracts.push(contract.clone());
        Ok(contract)
    }

    async fn delete_contract(&mut self, id: Uuid) -> Result<()> {
        let before = self.working.contracts.len();
        self.working.contracts.retain(|contract| contract.id != id);
        if self.working.contracts.len() == before {
            return Err(StoreError::NotFound(format!(
                "no contract found for id {}",
                id
            )));
        }
        Ok(())
    }

    async fn delete_contracts_by_group(&mut self, group_id: Uuid) -> Result<()> {
        let before = self.working.contracts.len();
        self.working
            .contracts
            .retain(|contract| contract.group_id != group_id);
        if self.working.contracts.len() == before {
            return Err(StoreError::NotFound(format!(
                "no contracts found for group {}",
                group_id
            )));
        }
        Ok(())
    }

    async fn list_contracts_by_subject(&mut self, subject_id: Uuid) -> Result<Vec<Contract>> {
        Ok(self
            .working
            .contracts
            .iter()
            .filter(|contract| contract.subject_id == subject_id)
            .cloned()
            .collect())
    }

    async fn list_contracts_by_group(&mut self, group_id: Uuid) -> Result<Vec<Contract>> {
        Ok(self
            .working
            .contracts
            .iter()
            .filter(|contract| contract.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        *self.base.lock() = self.working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        // dropping the working snapshot discards every change
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attribute;

    #[tokio::test]
    async fn test_put_then_get_is_idempotent() {
        let store = InMemoryRelationStore::new();
        let group = store
            .put_group(Group::with_attributes(vec![Attribute::new("tier", "gold")]))
            .await
            .unwrap();
        let id = group.id.unwrap();

        for _ in 0..3 {
            let fetched = store.get_group(id).await.unwrap();
            assert_eq!(fetched, group);
        }
    }

    #[tokio::test]
    async fn test_put_with_same_id_replaces() {
        let store = InMemoryRelationStore::new();
        let group = store
            .put_group(Group::with_attributes(vec![Attribute::new("tier", "gold")]))
            .await
            .unwrap();
        let id = group.id.unwrap();

        let replaced = store
            .put_group(Group::new(id, vec![Attribute::new("tier", "silver")]))
            .await
            .unwrap();
        assert_eq!(replaced.id, Some(id));

        let fetched = store.get_group(id).await.unwrap();
        assert_eq!(fetched.attributes, vec![Attribute::new("tier", "silver")]);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = InMemoryRelationStore::new();
        let err = store.delete_subject(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_contract_rejected() {
        let store = InMemoryRelationStore::new();
        let subject_id = Uuid::new_v4();
        let group_id = Uuid::new_v4();

        store.insert_contract(subject_id, group_id).await.unwrap();
        let err = store
            .insert_contract(subject_id, group_id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_bulk_get_skips_unknown_ids() {
        let store = InMemoryRelationStore::new();
        let subject = store.put_subject(Subject::new("u1")).await.unwrap();

        let found = store
            .bulk_get_subjects(&[subject.id.unwrap(), Uuid::new_v4()])
            .await
            .unwrap();
        assert_eq!(found, vec![subject]);

        // empty input resolves to empty output
        let found = store.bulk_get_subjects(&[]).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_rollback_discards_changes() {
        let store = InMemoryRelationStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.put_subject(Subject::new("u1")).await.unwrap();
        tx.rollback().await.unwrap();

        let found = store.find_subjects_by_user("u1").await.unwrap();
        assert!(found.is_empty());
    }
}
