use crate::error::{check_rows_affected, Result, StoreError};
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

/// An opaque-payload row: any serializable entity keyed by identifier
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StoredEntity {
    pub id: Uuid,
    pub payload: Vec<u8>,
}

/// Generic opaque-payload persistence over one table
///
/// Each operation exists in an autonomous form (its own transaction around a
/// single statement) and a `tx_` form that participates in the caller's
/// transaction. The `tx_` forms are the building blocks composite operations
/// are assembled from.
#[derive(Debug, Clone)]
pub struct PgEntityStore {
    pool: PgPool,
    table: &'static str,
}

impl PgEntityStore {
    pub fn new(pool: PgPool, table: &'static str) -> Self {
        Self { pool, table }
    }

    pub async fn get(&self, id: Uuid) -> Result<StoredEntity> {
        let mut tx = self.pool.begin().await?;
        let entity = self.tx_get(&mut tx, id).await?;
        tx.commit().await?;
        Ok(entity)
    }

    pub async fn put(&self, id: Option<Uuid>, payload: Vec<u8>) -> Result<StoredEntity> {
        let mut tx = self.pool.begin().await?;
        let entity = self.tx_put(&mut tx, id, payload).await?;
        tx.commit().await?;
        Ok(entity)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        self.tx_delete(&mut tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn tx_get(&self, conn: &mut PgConnection, id: Uuid) -> Result<StoredEntity> {
        let sql = format!("SELECT id, payload FROM {} WHERE id = $1", self.table);
        let entity = sqlx::query_as::<_, StoredEntity>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;
        entity.ok_or_else(|| StoreError::NotFound(format!("no record in {} for {}", self.table, id)))
    }

    /// Upsert by identifier, generating a fresh one when none is supplied
    pub async fn tx_put(
        &self,
        conn: &mut PgConnection,
        id: Option<Uuid>,
        payload: Vec<u8>,
    ) -> Result<StoredEntity> {
        let id = id.unwrap_or_else(Uuid::new_v4);
        let sql = format!(
            "INSERT INTO {} (id, payload) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET payload = $2",
            self.table
        );
        let result = sqlx::query(&sql).bind(id).bind(&payload).execute(conn).await?;
        check_rows_affected(
            result.rows_affected(),
            &format!("no row affected in {} for {}", self.table, id),
        )?;
        debug!(table = self.table, %id, "stored entity");
        Ok(StoredEntity { id, payload })
    }

    pub async fn tx_delete(&self, conn: &mut PgConnection, id: Uuid) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        let result = sqlx::query(&sql).bind(id).execute(conn).await?;
        check_rows_affected(
            result.rows_affected(),
            &format!("{} not found in {}", id, self.table),
        )
    }
}
