//! Test database utilities for integration tests.
//!
//! Provides file-based SQLite databases under `data/test/` for test isolation
//! and easier debugging of test failures.

#![allow(clippy::duplicate_mod)]

use lockbox::storage::{self, DbPool};
use sqlx::sqlite::SqlitePoolOptions;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Counter for generating unique database names within a test run
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Get the test database directory path
fn test_db_dir() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(manifest_dir).join("data").join("test")
}

/// Generate a unique database filename for a test
fn unique_db_name(prefix: &str) -> String {
    let counter = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let uuid_short = &Uuid::new_v4().to_string()[..8];
    format!("{}_{}_{}_{}.db", prefix, std::process::id(), counter, uuid_short)
}

/// A test database that automatically cleans up on drop.
pub struct TestDatabase {
    pub pool: DbPool,
    pub path: PathBuf,
    cleanup_on_drop: bool,
}

impl TestDatabase {
    /// Create a new test database with automatic cleanup and migrations applied.
    ///
    /// The database file is created under `data/test/` with a unique name.
    /// It will be automatically deleted when this struct is dropped.
    pub async fn new(prefix: &str) -> Self {
        Self::with_options(prefix, true).await
    }

    /// Create a new test database with configurable cleanup behavior.
    ///
    /// Set `cleanup_on_drop` to `false` to preserve the database file after
    /// the test completes (useful for debugging test failures).
    pub async fn with_options(prefix: &str, cleanup_on_drop: bool) -> Self {
        let db_dir = test_db_dir();

        // Ensure the test directory exists
        std::fs::create_dir_all(&db_dir).expect("create test database directory");

        let db_name = unique_db_name(prefix);
        let path = db_dir.join(&db_name);
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .expect("create test database pool");

        storage::run_migrations(&pool).await.expect("run migrations for test database");

        Self { pool, path, cleanup_on_drop }
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Get the database file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        if self.cleanup_on_drop {
            // Best effort cleanup - don't panic in drop
            if let Err(e) = std::fs::remove_file(&self.path) {
                eprintln!("Warning: Failed to cleanup test database {:?}: {}", self.path, e);
            }
            // Also try to remove WAL and SHM files if they exist
            let wal_path = self.path.with_extension("db-wal");
            let shm_path = self.path.with_extension("db-shm");
            let _ = std::fs::remove_file(wal_path);
            let _ = std::fs::remove_file(shm_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_creates_file() {
        let db = TestDatabase::new("test_creates_file").await;
        assert!(db.path().exists(), "Database file should exist");

        // Verify we can query the database
        let result: (i64,) =
            sqlx::query_as("SELECT 1").fetch_one(db.pool()).await.expect("query should succeed");
        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    async fn test_database_cleanup_on_drop() {
        let path = {
            let db = TestDatabase::new("test_cleanup").await;
            let path = db.path.clone();
            assert!(path.exists(), "Database file should exist before drop");
            path
        };
        // After drop, file should be removed
        assert!(!path.exists(), "Database file should be removed after drop");
    }
}
