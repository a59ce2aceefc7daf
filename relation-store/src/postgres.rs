use crate::{
    entity::PgEntityStore,
    error::{check_rows_affected, map_insert_error, Result, StoreError},
    models::{Contract, Group, Policy, Subject},
    transaction::{RelationStore, StoreTransaction},
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

/// PostgreSQL-backed relation store
///
/// Subjects and contracts live in typed columns; groups and policies are
/// JSON payloads routed through [`PgEntityStore`].
#[derive(Debug, Clone)]
pub struct PgRelationStore {
    pool: PgPool,
    groups: PgEntityStore,
    policies: PgEntityStore,
}

impl PgRelationStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            groups: PgEntityStore::new(pool.clone(), "groups"),
            policies: PgEntityStore::new(pool.clone(), "policies"),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RelationStore for PgRelationStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStoreTransaction {
            tx,
            groups: self.groups.clone(),
            policies: self.policies.clone(),
        }))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubjectRow {
    id: Uuid,
    user_id: String,
}

impl From<SubjectRow> for Subject {
    fn from(row: SubjectRow) -> Self {
        Subject {
            id: Some(row.id),
            user_id: row.user_id,
        }
    }
}

fn encode_group(group: &Group) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(group)?)
}

fn decode_group(payload: &[u8]) -> Result<Group> {
    Ok(serde_json::from_slice(payload)?)
}

fn encode_policy(policy: &Policy) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(policy)?)
}

fn decode_policy(payload: &[u8]) -> Result<Policy> {
    Ok(serde_json::from_slice(payload)?)
}

/// One open PostgreSQL transaction over the relation tables
pub struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
    groups: PgEntityStore,
    policies: PgEntityStore,
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn get_subject(&mut self, id: Uuid) -> Result<Subject> {
        let row = sqlx::query_as::<_, SubjectRow>(
            "SELECT id, user_id FROM subjects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(Subject::from)
            .ok_or_else(|| StoreError::NotFound(format!("subject not found for id {}", id)))
    }

    async fn bulk_get_subjects(&mut self, ids: &[Uuid]) -> Result<Vec<Subject>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, SubjectRow>(
            "SELECT id, user_id FROM subjects WHERE id = ANY($1)",
        )
        .bind(ids.to_vec())
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows.into_iter().map(Subject::from).collect())
    }

    async fn find_subjects_by_user(&mut self, user_id: &str) -> Result<Vec<Subject>> {
        let rows = sqlx::query_as::<_, SubjectRow>(
            "SELECT id, user_id FROM subjects WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows.into_iter().map(Subject::from).collect())
    }

    async fn put_subject(&mut self, subject: Subject) -> Result<Subject> {
        let id = subject.id.unwrap_or_else(Uuid::new_v4);
        let result = sqlx::query(
            "INSERT INTO subjects (id, user_id) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET user_id = $2",
        )
        .bind(id)
        .bind(&subject.user_id)
        .execute(&mut *self.tx)
        .await?;
        check_rows_affected(
            result.rows_affected(),
            &format!("subject {}:{} is not inserted", id, subject.user_id),
        )?;
        Ok(Subject {
            id: Some(id),
            user_id: subject.user_id,
        })
    }

    async fn delete_subject(&mut self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        check_rows_affected(
            result.rows_affected(),
            &format!("subject not found for id {}", id),
        )
    }

    async fn get_group(&mut self, id: Uuid) -> Result<Group> {
        let entity = self.groups.tx_get(&mut self.tx, id).await?;
        decode_group(&entity.payload)
    }

    async fn bulk_get_groups(&mut self, ids: &[Uuid]) -> Result<Vec<Group>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, crate::entity::StoredEntity>(
            "SELECT id, payload FROM groups WHERE id = ANY($1)",
        )
        .bind(ids.to_vec())
        .fetch_all(&mut *self.tx)
        .await?;
        rows.iter().map(|row| decode_group(&row.payload)).collect()
    }

    async fn put_group(&mut self, group: Group) -> Result<Group> {
        let group = Group {
            id: Some(group.id.unwrap_or_else(Uuid::new_v4)),
            attributes: group.attributes,
        };
        let payload = encode_group(&group)?;
        self.groups.tx_put(&mut self.tx, group.id, payload).await?;
        Ok(group)
    }

    async fn delete_group(&mut self, id: Uuid) -> Result<()> {
        self.groups.tx_delete(&mut self.tx, id).await
    }

    async fn get_policy(&mut self, id: Uuid) -> Result<Policy> {
        let entity = self.policies.tx_get(&mut self.tx, id).await?;
        decode_policy(&entity.payload)
    }

    async fn put_policy(&mut self, policy: Policy) -> Result<Policy> {
        let policy = Policy {
            id: Some(policy.id.unwrap_or_else(Uuid::new_v4)),
            condition: policy.condition,
        };
        let payload = encode_policy(&policy)?;
        self.policies.tx_put(&mut self.tx, policy.id, payload).await?;
        Ok(policy)
    }

    async fn delete_policy(&mut self, id: Uuid) -> Result<()> {
        self.policies.tx_delete(&mut self.tx, id).await
    }

    async fn insert_contract(&mut self, subject_id: Uuid, group_id: Uuid) -> Result<Contract> {
        let contract = Contract {
            id: Uuid::new_v4(),
            subject_id,
            group_id,
        };
        // the UNIQUE (subject_id, group_id) constraint rejects a duplicate
        // binding atomically; no separate existence scan
        let result = sqlx::query(
            "INSERT INTO contracts (id, subject_id, group_id) VALUES ($1, $2, $3)",
        )
        .bind(contract.id)
        .bind(subject_id)
        .bind(group_id)
        .execute(&mut *self.tx)
        .await
        .map_err(|err| {
            map_insert_error(
                err,
                &format!("contract for {}:{} already exists", subject_id, group_id),
            )
        })?;
        check_rows_affected(
            result.rows_affected(),
            &format!("no record inserted for {}:{}", subject_id, group_id),
        )?;
        debug!(%contract, "inserted contract");
        Ok(contract)
    }

    async fn delete_contract(&mut self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        check_rows_affected(
            result.rows_affected(),
            &format!("no contract found for id {}", id),
        )
    }

    async fn delete_contracts_by_group(&mut self, group_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM contracts WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *self.tx)
            .await?;
        check_rows_affected(
            result.rows_affected(),
            &format!("no contracts found for group {}", group_id),
        )
    }

    async fn list_contracts_by_subject(&mut self, subject_id: Uuid) -> Result<Vec<Contract>> {
        let contracts = sqlx::query_as::<_, Contract>(
            "SELECT id, subject_id, group_id FROM contracts WHERE subject_id = $1",
        )
        .bind(subject_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(contracts)
    }

    async fn list_contracts_by_group(&mut self, group_id: Uuid) -> Result<Vec<Contract>> {
        let contracts = sqlx::query_as::<_, Contract>(
            "SELECT id, subject_id, group_id FROM contracts WHERE group_id = $1",
        )
        .bind(group_id)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(contracts)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
