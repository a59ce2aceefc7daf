use crate::error::Result;
use sqlx::{Executor, PgPool};
use tracing::info;

const V1: &str = r#"
CREATE TABLE IF NOT EXISTS subjects (
    id uuid,
    user_id varchar(255),
    PRIMARY KEY ( id )
);

CREATE TABLE IF NOT EXISTS groups (
    id uuid,
    payload bytea,
    PRIMARY KEY ( id )
);

CREATE TABLE IF NOT EXISTS policies (
    id uuid,
    payload bytea,
    PRIMARY KEY ( id )
);

CREATE TABLE IF NOT EXISTS contracts (
    id uuid,
    subject_id uuid,
    group_id uuid,
    PRIMARY KEY ( id ),
    UNIQUE ( subject_id, group_id )
);
"#;

const MIGRATIONS: &[&str] = &[V1];

/// Apply the schema migrations in order; every statement is idempotent
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    for migration in MIGRATIONS {
        pool.execute(*migration).await?;
    }
    info!("schema migrations applied");
    Ok(())
}
