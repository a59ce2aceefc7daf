use anyhow::{Context, Result};
use authz_server::{config::AppConfig, create_app};
use authz_service::AuthzService;
use relation_store::PgRelationStore;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting authz-server");

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await
        .context("failed to connect to database")?;
    info!("database connection pool created");

    relation_store::migration::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let service = AuthzService::new(Arc::new(PgRelationStore::new(pool)));
    let app = create_app(service);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .await
        .context("server terminated")?;
    Ok(())
}
