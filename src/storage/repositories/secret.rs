//! Secret repository: the persistence port for stored secrets
//!
//! The trait is the full contract the service layer requires from storage:
//! save, fetch by either address, replace ciphertext, delete. Rows carry the
//! ciphertext blob only; nothing in this module encrypts, decrypts, or logs
//! secret values.

use crate::domain::{SecretId, SecretRecord};
use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use sqlx::FromRow;
use tracing::instrument;

/// Database row structure for secrets
#[derive(Debug, Clone, FromRow)]
struct SecretRow {
    pub id: String,
    pub key: String,
    pub encrypted_value: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<SecretRow> for SecretRecord {
    fn from(row: SecretRow) -> Self {
        SecretRecord {
            id: SecretId::from_string(row.id),
            key: row.key,
            encrypted_value: row.encrypted_value,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Persistence contract for secret records.
///
/// `save` surfaces a duplicate key as a conflict, distinct from other
/// storage failures. Fetches report absence as not-found rather than an
/// optional so the service layer can propagate uniformly.
#[async_trait]
pub trait SecretRepository: Send + Sync {
    async fn save(&self, record: &SecretRecord) -> Result<()>;
    async fn get_by_id(&self, id: &SecretId) -> Result<SecretRecord>;
    async fn get_by_key(&self, key: &str) -> Result<SecretRecord>;
    async fn update_encrypted_value(&self, id: &SecretId, encrypted_value: &str) -> Result<()>;
    async fn delete(&self, id: &SecretId) -> Result<()>;
}

/// SQLite-backed repository over the shared connection pool
#[derive(Debug, Clone)]
pub struct SqlxSecretRepository {
    pool: DbPool,
}

impl SqlxSecretRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .map(|code| code == "2067" || code.starts_with("SQLITE_CONSTRAINT"))
        .unwrap_or(false)
}

#[async_trait]
impl SecretRepository for SqlxSecretRepository {
    #[instrument(
        skip(self, record),
        fields(secret_id = %record.id, secret_key = %record.key),
        name = "db_save_secret"
    )]
    async fn save(&self, record: &SecretRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO secrets (id, key, encrypted_value, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(record.id.as_str())
        .bind(&record.key)
        .bind(&record.encrypted_value)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                tracing::warn!(secret_key = %record.key, "Secret key already exists");
                Error::conflict(format!("Secret with key '{}' already exists", record.key))
            } else {
                tracing::error!(error = %e, secret_id = %record.id, "Failed to save secret");
                Error::Database {
                    source: e,
                    context: format!("Failed to save secret '{}'", record.key),
                }
            }
        })?;

        tracing::info!(secret_id = %record.id, secret_key = %record.key, "Saved new secret");

        Ok(())
    }

    #[instrument(skip(self), fields(secret_id = %id), name = "db_get_secret_by_id")]
    async fn get_by_id(&self, id: &SecretId) -> Result<SecretRecord> {
        let row = sqlx::query_as::<_, SecretRow>(
            "SELECT id, key, encrypted_value, created_at, updated_at \
             FROM secrets WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, secret_id = %id, "Failed to get secret by id");
            Error::Database { source: e, context: format!("Failed to get secret with id '{}'", id) }
        })?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(Error::not_found(format!("Secret with id '{}' not found", id))),
        }
    }

    #[instrument(skip(self), fields(secret_key = %key), name = "db_get_secret_by_key")]
    async fn get_by_key(&self, key: &str) -> Result<SecretRecord> {
        let row = sqlx::query_as::<_, SecretRow>(
            "SELECT id, key, encrypted_value, created_at, updated_at \
             FROM secrets WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, secret_key = %key, "Failed to get secret by key");
            Error::Database {
                source: e,
                context: format!("Failed to get secret with key '{}'", key),
            }
        })?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(Error::not_found(format!("Secret with key '{}' not found", key))),
        }
    }

    #[instrument(skip(self, encrypted_value), fields(secret_id = %id), name = "db_update_secret_value")]
    async fn update_encrypted_value(&self, id: &SecretId, encrypted_value: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE secrets SET encrypted_value = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(encrypted_value)
        .bind(chrono::Utc::now())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, secret_id = %id, "Failed to update secret value");
            Error::Database {
                source: e,
                context: format!("Failed to update secret with id '{}'", id),
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("Secret with id '{}' not found", id)));
        }

        tracing::info!(secret_id = %id, "Replaced secret ciphertext");

        Ok(())
    }

    #[instrument(skip(self), fields(secret_id = %id), name = "db_delete_secret")]
    async fn delete(&self, id: &SecretId) -> Result<()> {
        let result = sqlx::query("DELETE FROM secrets WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, secret_id = %id, "Failed to delete secret");
                Error::Database {
                    source: e,
                    context: format!("Failed to delete secret with id '{}'", id),
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("Secret with id '{}' not found", id)));
        }

        tracing::info!(secret_id = %id, "Deleted secret");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    // Single-connection pool so the in-memory database is shared across
    // queries within a test.
    async fn test_pool() -> DbPool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("create in-memory pool");

        sqlx::raw_sql(
            "CREATE TABLE secrets (
                id TEXT PRIMARY KEY,
                key TEXT NOT NULL UNIQUE,
                encrypted_value TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .expect("create secrets table");

        pool
    }

    fn sample_record(key: &str) -> SecretRecord {
        SecretRecord::new(key.to_string(), "00112233445566778899aabbccddeeff".to_string())
    }

    #[tokio::test]
    async fn save_and_get_by_id() {
        let repo = SqlxSecretRepository::new(test_pool().await);
        let record = sample_record("my-secret-key");

        repo.save(&record).await.unwrap();

        let fetched = repo.get_by_id(&record.id).await.unwrap();
        assert_eq!(fetched.id, record.id);
        assert_eq!(fetched.key, "my-secret-key");
        assert_eq!(fetched.encrypted_value, record.encrypted_value);
    }

    #[tokio::test]
    async fn get_by_key_returns_same_record() {
        let repo = SqlxSecretRepository::new(test_pool().await);
        let record = sample_record("api-key-1");

        repo.save(&record).await.unwrap();

        let by_id = repo.get_by_id(&record.id).await.unwrap();
        let by_key = repo.get_by_key("api-key-1").await.unwrap();
        assert_eq!(by_id.id, by_key.id);
        assert_eq!(by_id.encrypted_value, by_key.encrypted_value);
    }

    #[tokio::test]
    async fn duplicate_key_is_conflict() {
        let repo = SqlxSecretRepository::new(test_pool().await);

        repo.save(&sample_record("dup")).await.unwrap();
        let result = repo.save(&sample_record("dup")).await;

        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let repo = SqlxSecretRepository::new(test_pool().await);

        let result = repo.get_by_id(&SecretId::new()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        let result = repo.get_by_key("nothing-here").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn update_replaces_value_and_advances_updated_at() {
        let repo = SqlxSecretRepository::new(test_pool().await);
        let record = sample_record("my-secret-key");
        repo.save(&record).await.unwrap();

        repo.update_encrypted_value(&record.id, "ffeeddccbbaa99887766554433221100")
            .await
            .unwrap();

        let fetched = repo.get_by_id(&record.id).await.unwrap();
        assert_eq!(fetched.encrypted_value, "ffeeddccbbaa99887766554433221100");
        assert_eq!(fetched.created_at, record.created_at);
        assert!(fetched.updated_at > record.updated_at);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let repo = SqlxSecretRepository::new(test_pool().await);

        let result = repo.update_encrypted_value(&SecretId::new(), "00ff").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let repo = SqlxSecretRepository::new(test_pool().await);
        let record = sample_record("my-secret-key");
        repo.save(&record).await.unwrap();

        repo.delete(&record.id).await.unwrap();

        let result = repo.get_by_id(&record.id).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let repo = SqlxSecretRepository::new(test_pool().await);

        let result = repo.delete(&SecretId::new()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn deleted_key_can_be_reused() {
        let repo = SqlxSecretRepository::new(test_pool().await);
        let first = sample_record("recycled");
        repo.save(&first).await.unwrap();
        repo.delete(&first.id).await.unwrap();

        // Hard delete frees the key for a fresh insert
        let second = sample_record("recycled");
        repo.save(&second).await.unwrap();

        let fetched = repo.get_by_key("recycled").await.unwrap();
        assert_eq!(fetched.id, second.id);
    }
}
