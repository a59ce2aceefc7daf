use crate::error::Result;
use policy_engine::{Attribute, Group, Policy};
use relation_store::{
    with_transaction, Contract, RelationStore, StoreError, Subject,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Orchestrates multi-entity transactions over the relationship graph
///
/// Composite operations run under a single transaction via
/// `with_transaction`. Primary-entity mutations are all-or-nothing; only the
/// cleanup phase of [`RelationshipManager::delete_subject`] is best-effort.
#[derive(Clone)]
pub struct RelationshipManager {
    store: Arc<dyn RelationStore>,
}

impl RelationshipManager {
    pub fn new(store: Arc<dyn RelationStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn RelationStore {
        self.store.as_ref()
    }

    // =========================================================================
    // Contracts
    // =========================================================================

    /// Bind a subject to a group
    ///
    /// A live binding for the same pair fails with `AlreadyExists`; the
    /// storage layer's uniqueness constraint makes the rejection atomic under
    /// concurrent identical requests.
    pub async fn add_contract(&self, subject_id: Uuid, group_id: Uuid) -> Result<Contract> {
        let contract = self.store.insert_contract(subject_id, group_id).await?;
        info!(%contract, "created contract");
        Ok(contract)
    }

    pub async fn delete_contract(&self, contract_id: Uuid) -> Result<()> {
        self.store.delete_contract(contract_id).await?;
        Ok(())
    }

    // =========================================================================
    // Subjects
    // =========================================================================

    pub async fn add_subject(&self, user_id: &str) -> Result<Subject> {
        let subject = self.store.put_subject(Subject::new(user_id)).await?;
        Ok(subject)
    }

    pub async fn get_subject(&self, subject_id: Uuid) -> Result<Subject> {
        Ok(self.store.get_subject(subject_id).await?)
    }

    pub async fn find_subjects_by_user(&self, user_id: &str) -> Result<Vec<Subject>> {
        Ok(self.store.find_subjects_by_user(user_id).await?)
    }

    /// Delete a subject and cascade over its bindings
    ///
    /// One transaction: list the subject's contracts, delete the subject
    /// (failure aborts everything), then clean up each contract and any group
    /// it leaves without a referencing contract. Cleanup failures are logged
    /// and skipped; the transaction commits whenever the subject delete
    /// itself succeeded.
    pub async fn delete_subject(&self, subject_id: Uuid) -> Result<()> {
        with_transaction(self.store.as_ref(), move |tx| {
            Box::pin(async move {
                let contracts = tx.list_contracts_by_subject(subject_id).await?;
                tx.delete_subject(subject_id).await?;

                for contract in contracts {
                    if let Err(err) = tx.delete_contract(contract.id).await {
                        warn!(%contract, error = %err, "failed to delete contract");
                    }
                    let remaining = match tx.list_contracts_by_group(contract.group_id).await {
                        Ok(remaining) => remaining,
                        Err(err) => {
                            warn!(
                                group_id = %contract.group_id,
                                error = %err,
                                "failed to list contracts by group"
                            );
                            continue;
                        }
                    };
                    if remaining.is_empty() {
                        info!(group_id = %contract.group_id, "deleting zombie group");
                        if let Err(err) = tx.delete_group(contract.group_id).await {
                            warn!(
                                group_id = %contract.group_id,
                                error = %err,
                                "failed to delete zombie group"
                            );
                        }
                    }
                }
                Ok(())
            })
        })
        .await?;
        Ok(())
    }

    /// Create a subject, a group holding `attributes` and the contract
    /// binding them, atomically
    pub async fn add_subject_with_attributes(
        &self,
        user_id: &str,
        attributes: Vec<Attribute>,
    ) -> Result<(Subject, Group, Contract)> {
        let user_id = user_id.to_string();
        let created = with_transaction(self.store.as_ref(), move |tx| {
            Box::pin(async move {
                let subject = tx.put_subject(Subject::new(&user_id)).await?;
                let group = tx.put_group(Group::with_attributes(attributes)).await?;
                let contract = tx
                    .insert_contract(require_id(subject.id)?, require_id(group.id)?)
                    .await?;
                Ok((subject, group, contract))
            })
        })
        .await?;
        Ok(created)
    }

    /// Create one group with `attributes` and bind every resolved subject to
    /// it, atomically
    ///
    /// Subject ids that do not resolve are skipped; any other failure rolls
    /// the whole operation back.
    pub async fn create_group_for_subjects(
        &self,
        subject_ids: Vec<Uuid>,
        attributes: Vec<Attribute>,
    ) -> Result<(Group, Vec<Contract>)> {
        if subject_ids.is_empty() {
            return Err(StoreError::Validation("no subject ids supplied".to_string()).into());
        }
        let created = with_transaction(self.store.as_ref(), move |tx| {
            Box::pin(async move {
                let subjects = tx.bulk_get_subjects(&subject_ids).await?;
                let group = tx.put_group(Group::with_attributes(attributes)).await?;
                let group_id = require_id(group.id)?;

                let mut contracts = Vec::with_capacity(subjects.len());
                for subject in &subjects {
                    let contract = tx
                        .insert_contract(require_id(subject.id)?, group_id)
                        .await?;
                    contracts.push(contract);
                }
                Ok((group, contracts))
            })
        })
        .await?;
        Ok(created)
    }

    // =========================================================================
    // Groups
    // =========================================================================

    pub async fn create_group(&self, group: Group) -> Result<Group> {
        Ok(self.store.put_group(group).await?)
    }

    pub async fn update_group(&self, group: Group) -> Result<Group> {
        Ok(self.store.put_group(group).await?)
    }

    pub async fn get_group(&self, group_id: Uuid) -> Result<Group> {
        Ok(self.store.get_group(group_id).await?)
    }

    /// Copy an existing group's attributes into a freshly identified group
    pub async fn duplicate_group(&self, group_id: Uuid) -> Result<Group> {
        let existing = self.store.get_group(group_id).await?;
        let copy = self
            .store
            .put_group(Group::with_attributes(existing.attributes))
            .await?;
        Ok(copy)
    }

    /// Delete a group and every contract referencing it, in one transaction
    pub async fn delete_group(&self, group_id: Uuid) -> Result<()> {
        with_transaction(self.store.as_ref(), move |tx| {
            Box::pin(async move {
                // confirm the group exists before touching contracts
                tx.get_group(group_id).await?;
                match tx.delete_contracts_by_group(group_id).await {
                    Ok(()) | Err(StoreError::NotFound(_)) => {}
                    Err(err) => return Err(err),
                }
                tx.delete_group(group_id).await
            })
        })
        .await?;
        Ok(())
    }

    /// All groups bound to a subject, resolved through its contracts
    pub async fn groups_by_subject(&self, subject_id: Uuid) -> Result<Vec<Group>> {
        let groups = with_transaction(self.store.as_ref(), move |tx| {
            Box::pin(async move {
                let contracts = tx.list_contracts_by_subject(subject_id).await?;
                let group_ids: Vec<Uuid> = contracts
                    .iter()
                    .map(|contract| contract.group_id)
                    .collect();
                tx.bulk_get_groups(&group_ids).await
            })
        })
        .await?;
        Ok(groups)
    }

    // =========================================================================
    // Policies
    // =========================================================================

    pub async fn create_policy(&self, policy: Policy) -> Result<Policy> {
        Ok(self.store.put_policy(policy).await?)
    }

    pub async fn update_policy(&self, policy: Policy) -> Result<Policy> {
        Ok(self.store.put_policy(policy).await?)
    }

    pub async fn get_policy(&self, policy_id: Uuid) -> Result<Policy> {
        Ok(self.store.get_policy(policy_id).await?)
    }

    pub async fn delete_policy(&self, policy_id: Uuid) -> Result<()> {
        self.store.delete_policy(policy_id).await?;
        Ok(())
    }
}

/// A store always assigns identifiers on put; a missing one is a storage
/// contract violation, not a caller error
fn require_id(id: Option<Uuid>) -> relation_store::Result<Uuid> {
    id.ok_or_else(|| StoreError::Validation("entity has no identifier after put".to_string()))
}
