/// Database access layer
///
/// This module provides:
/// - Connection pool bootstrap and the embedded migrator
/// - The `PostRepository` seam used by the services, with its PostgreSQL implementation
pub mod post_repo;

pub use post_repo::{PgPostRepository, PostRepository};

use crate::config::DatabaseConfig;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create the PostgreSQL pool and optionally apply migrations.
pub async fn init_pool(cfg: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .connect(&cfg.url)
        .await?;

    tracing::info!(
        max_connections = cfg.max_connections,
        "PostgreSQL pool created"
    );

    if cfg.run_migrations {
        MIGRATOR.run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}
