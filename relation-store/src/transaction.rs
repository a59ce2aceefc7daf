use crate::error::Result;
use crate::models::{Contract, Group, Policy, Subject};
use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::warn;
use uuid::Uuid;

/// One open storage transaction
///
/// All typed operations run inside the caller's transaction boundary; nothing
/// is visible to other transactions until [`StoreTransaction::commit`]. A
/// dropped, uncommitted transaction is rolled back by the backend's own
/// lifecycle.
#[async_trait]
pub trait StoreTransaction: Send {
    // Subject
    async fn get_subject(&mut self, id: Uuid) -> Result<Subject>;
    /// Resolve the subjects that exist among `ids`; an empty id list yields
    /// an empty result without touching storage, and unknown ids are skipped
    async fn bulk_get_subjects(&mut self, ids: &[Uuid]) -> Result<Vec<Subject>>;
    async fn find_subjects_by_user(&mut self, user_id: &str) -> Result<Vec<Subject>>;
    /// Upsert; assigns a fresh identifier when the subject has none
    async fn put_subject(&mut self, subject: Subject) -> Result<Subject>;
    async fn delete_subject(&mut self, id: Uuid) -> Result<()>;

    // Group
    async fn get_group(&mut self, id: Uuid) -> Result<Group>;
    async fn bulk_get_groups(&mut self, ids: &[Uuid]) -> Result<Vec<Group>>;
    async fn put_group(&mut self, group: Group) -> Result<Group>;
    async fn delete_group(&mut self, id: Uuid) -> Result<()>;

    // Policy
    async fn get_policy(&mut self, id: Uuid) -> Result<Policy>;
    async fn put_policy(&mut self, policy: Policy) -> Result<Policy>;
    async fn delete_policy(&mut self, id: Uuid) -> Result<()>;

    // Contract
    /// Insert a fresh contract binding; a live binding for the same
    /// (subject, group) pair fails with `AlreadyExists`
    async fn insert_contract(&mut self, subject_id: Uuid, group_id: Uuid) -> Result<Contract>;
    async fn delete_contract(&mut self, id: Uuid) -> Result<()>;
    /// Delete every contract referencing a group; `NotFound` when none exist
    async fn delete_contracts_by_group(&mut self, group_id: Uuid) -> Result<()>;
    async fn list_contracts_by_subject(&mut self, subject_id: Uuid) -> Result<Vec<Contract>>;
    async fn list_contracts_by_group(&mut self, group_id: Uuid) -> Result<Vec<Contract>>;

    async fn commit(self: Box<Self>) -> Result<()>;
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Storage seam for the relationship graph
///
/// `begin` hands out a transaction handle; the provided methods are the
/// autonomous forms of each operation, each wrapping its single statement in
/// its own transaction.
#[async_trait]
pub trait RelationStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>>;

    async fn get_subject(&self, id: Uuid) -> Result<Subject> {
        let mut tx = self.begin().await?;
        let subject = tx.get_subject(id).await?;
        tx.commit().await?;
        Ok(subject)
    }

    async fn bulk_get_subjects(&self, ids: &[Uuid]) -> Result<Vec<Subject>> {
        let mut tx = self.begin().await?;
        let subjects = tx.bulk_get_subjects(ids).await?;
        tx.commit().await?;
        Ok(subjects)
    }

    async fn find_subjects_by_user(&self, user_id: &str) -> Result<Vec<Subject>> {
        let mut tx = self.begin().await?;
        let subjects = tx.find_subjects_by_user(user_id).await?;
        tx.commit().await?;
        Ok(subjects)
    }

    async fn put_subject(&self, subject: Subject) -> Result<Subject> {
        let mut tx = self.begin().await?;
        let subject = tx.put_subject(subject).await?;
        tx.commit().await?;
        Ok(subject)
    }

    async fn delete_subject(&self, id: Uuid) -> Result<()> {
        let mut tx = self.begin().await?;
        tx.delete_subject(id).await?;
        tx.commit().await
    }

    async fn get_group(&self, id: Uuid) -> Result<Group> {
        let mut tx = self.begin().await?;
        let group = tx.get_group(id).await?;
        tx.commit().await?;
        Ok(group)
    }

    async fn bulk_get_groups(&self, ids: &[Uuid]) -> Result<Vec<Group>> {
        let mut tx = self.begin().await?;
        let groups = tx.bulk_get_groups(ids).await?;
        tx.commit().await?;
        Ok(groups)
    }

    async fn put_group(&self, group: Group) -> Result<Group> {
        let mut tx = self.begin().await?;
        let group = tx.put_group(group).await?;
        tx.commit().await?;
        Ok(group)
    }

    async fn delete_group(&self, id: Uuid) -> Result<()> {
        let mut tx = self.begin().await?;
        tx.delete_group(id).await?;
        tx.commit().await
    }

    async fn get_policy(&self, id: Uuid) -> Result<Policy> {
        let mut tx = self.begin().await?;
        let policy = tx.get_policy(id).await?;
        tx.commit().await?;
        Ok(policy)
    }

    async fn put_policy(&self, policy: Policy) -> Result<Policy> {
        let mut tx = self.begin().await?;
        let policy = tx.put_policy(policy).await?;
        tx.commit().await?;
        Ok(policy)
    }

    async fn delete_policy(&self, id: Uuid) -> Result<()> {
        let mut tx = self.begin().await?;
        tx.delete_policy(id).await?;
        tx.commit().await
    }

    async fn insert_contract(&self, subject_id: Uuid, group_id: Uuid) -> Result<Contract> {
        let mut tx = self.begin().await?;
        let contract = tx.insert_contract(subject_id, group_id).await?;
        tx.commit().await?;
        Ok(contract)
    }

    async fn delete_contract(&self, id: Uuid) -> Result<()> {
        let mut tx = self.begin().await?;
        tx.delete_contract(id).await?;
        tx.commit().await
    }

    async fn list_contracts_by_subject(&self, subject_id: Uuid) -> Result<Vec<Contract>> {
        let mut tx = self.begin().await?;
        let contracts = tx.list_contracts_by_subject(subject_id).await?;
        tx.commit().await?;
        Ok(contracts)
    }

    async fn list_contracts_by_group(&self, group_id: Uuid) -> Result<Vec<Contract>> {
        let mut tx = self.begin().await?;
        let contracts = tx.list_contracts_by_group(group_id).await?;
        tx.commit().await?;
        Ok(contracts)
    }
}

/// Run `f` inside a new transaction: commit on success, roll back on any
/// error returned by `f`, and propagate that error to the caller
///
/// This is the sole transaction-scoping primitive composite operations use.
pub async fn with_transaction<T, F>(store: &dyn RelationStore, f: F) -> Result<T>
where
    T: Send,
    F: for<'t> FnOnce(&'t mut dyn StoreTransaction) -> BoxFuture<'t, Result<T>> + Send,
{
    let mut tx = store.begin().await?;
    match f(tx.as_mut()).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
