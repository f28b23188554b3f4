//! # Storage and Persistence
//!
//! Database connectivity and the persistence layer for the Lockbox secret
//! store: pool construction, runtime migrations, and the secret repository.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use crate::config::DatabaseConfig;

pub use migrations::{get_migration_version, run_migrations as run_db_migrations};
pub use pool::{create_pool, get_pool_stats, DbPool, PoolStats};
pub use repositories::{SecretRepository, SqlxSecretRepository};

use crate::errors::{Error, Result};

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    migrations::run_migrations(pool).await
}

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| Error::Database {
        source: e,
        context: "Database connectivity check failed".to_string(),
    })?;

    Ok(())
}
