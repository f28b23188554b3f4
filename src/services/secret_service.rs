//! Secret lifecycle orchestration.
//!
//! Ties the crypto engine to the repository port. Read paths stay split in
//! two: `get_encrypted` returns the stored record without touching the
//! ciphertext, and `decrypt` is a separate explicit call. Handlers decide
//! when plaintext actually needs to exist.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{SecretId, SecretRecord};
use crate::errors::{Error, Result};
use crate::services::crypto::CryptoEngine;
use crate::storage::SecretRepository;

/// Address form a lookup query resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretLookup {
    ById(SecretId),
    ByKey(String),
}

/// Application service for creating, fetching, updating and deleting secrets.
#[derive(Clone)]
pub struct SecretService {
    repository: Arc<dyn SecretRepository>,
    crypto: CryptoEngine,
}

impl std::fmt::Debug for SecretService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretService")
            .field("repository", &"[SecretRepository]")
            .field("crypto", &self.crypto)
            .finish()
    }
}

impl SecretService {
    pub fn new(repository: Arc<dyn SecretRepository>, crypto: CryptoEngine) -> Self {
        Self { repository, crypto }
    }

    /// Decide whether `query` addresses a secret by id or by key.
    ///
    /// Anything that parses as a UUID is treated as an id, normalized to the
    /// canonical lowercase form. A record whose key itself is UUID-shaped is
    /// therefore unreachable by key; callers that need it must use its id.
    pub fn resolve_query(query: &str) -> SecretLookup {
        match Uuid::parse_str(query) {
            Ok(id) => SecretLookup::ById(SecretId::from_string(id.to_string())),
            Err(_) => SecretLookup::ByKey(query.to_string()),
        }
    }

    /// Encrypt `plaintext` under `master_key` and persist a new record.
    ///
    /// Returns the generated id together with the key so callers can echo
    /// both back without another fetch.
    #[instrument(skip(self, plaintext, master_key), fields(secret_key = %key))]
    pub async fn create_secret(
        &self,
        key: &str,
        plaintext: &str,
        master_key: &str,
    ) -> Result<(SecretId, String)> {
        let record = SecretRecord::create(&self.crypto, key, plaintext, master_key)?;
        self.repository.save(&record).await?;

        info!(secret_id = %record.id, secret_key = %record.key, "Secret created");
        Ok((record.id, record.key))
    }

    /// Fetch the stored record for `query` without decrypting it.
    #[instrument(skip(self))]
    pub async fn get_encrypted(&self, query: &str) -> Result<SecretRecord> {
        match Self::resolve_query(query) {
            SecretLookup::ById(id) => self.repository.get_by_id(&id).await,
            SecretLookup::ByKey(key) => self.repository.get_by_key(&key).await,
        }
    }

    /// Recover the plaintext of a previously fetched record.
    #[instrument(skip(self, record, master_key), fields(secret_id = %record.id))]
    pub fn decrypt(&self, record: &SecretRecord, master_key: &str) -> Result<String> {
        let plaintext = self.crypto.decrypt(&record.encrypted_value, master_key)?;
        String::from_utf8(plaintext).map_err(|_| Error::crypto("decryption failed"))
    }

    /// Re-encrypt `new_plaintext` and replace the stored ciphertext for `id`.
    ///
    /// The existing record is never read back first; the old value is simply
    /// overwritten. Fails with a not-found error when `id` is unknown.
    #[instrument(skip(self, new_plaintext, master_key), fields(secret_id = %id))]
    pub async fn update_secret(
        &self,
        id: &SecretId,
        new_plaintext: &str,
        master_key: &str,
    ) -> Result<()> {
        let encrypted = self.crypto.encrypt(new_plaintext.as_bytes(), master_key)?;
        self.repository.update_encrypted_value(id, &encrypted).await?;

        info!(secret_id = %id, "Secret value updated");
        Ok(())
    }

    /// Remove the record for `id`. The row is gone for good; there is no
    /// tombstone and the key becomes reusable immediately.
    #[instrument(skip(self), fields(secret_id = %id))]
    pub async fn delete_secret(&self, id: &SecretId) -> Result<()> {
        self.repository.delete(id).await?;

        info!(secret_id = %id, "Secret deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqlxSecretRepository;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_service() -> SecretService {
        // A single connection keeps every query on the same in-memory
        // database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");

        sqlx::raw_sql(
            r#"
            CREATE TABLE secrets (
                id TEXT PRIMARY KEY,
                key TEXT NOT NULL UNIQUE,
                encrypted_value TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await
        .expect("create schema");

        SecretService::new(
            Arc::new(SqlxSecretRepository::new(pool)),
            CryptoEngine::new(),
        )
    }

    #[test]
    fn resolve_query_routes_uuids_to_id_lookup() {
        let id = Uuid::new_v4().to_string();
        assert_eq!(
            SecretService::resolve_query(&id),
            SecretLookup::ById(SecretId::from_string(id))
        );
    }

    #[test]
    fn resolve_query_normalizes_uuid_case() {
        let lookup = SecretService::resolve_query("A54D88E0-6C6A-4BAF-B0C3-7F54EF2BA2E4");
        assert_eq!(
            lookup,
            SecretLookup::ById(SecretId::from_str_unchecked(
                "a54d88e0-6c6a-4baf-b0c3-7f54ef2ba2e4"
            ))
        );
    }

    #[test]
    fn resolve_query_routes_everything_else_to_key_lookup() {
        for query in ["api-key-1", "not a uuid", "a54d88e0", ""] {
            assert_eq!(
                SecretService::resolve_query(query),
                SecretLookup::ByKey(query.to_string())
            );
        }
    }

    #[tokio::test]
    async fn create_then_fetch_and_decrypt() {
        let service = test_service().await;

        let (id, key) = service
            .create_secret("api-key-1", "sk_live_abc123", "masterpass")
            .await
            .expect("create secret");
        assert_eq!(key, "api-key-1");

        let record = service
            .get_encrypted(id.as_str())
            .await
            .expect("fetch by id");
        assert_eq!(record.id, id);
        assert_ne!(record.encrypted_value, "sk_live_abc123");

        let plaintext = service
            .decrypt(&record, "masterpass")
            .expect("decrypt with right key");
        assert_eq!(plaintext, "sk_live_abc123");
    }

    #[tokio::test]
    async fn decrypt_with_wrong_master_key_fails() {
        let service = test_service().await;

        service
            .create_secret("api-key-1", "sk_live_abc123", "masterpass")
            .await
            .expect("create secret");

        let record = service
            .get_encrypted("api-key-1")
            .await
            .expect("fetch by key");

        let err = service.decrypt(&record, "wrongpass").unwrap_err();
        assert!(matches!(err, Error::Crypto(_)));
    }

    #[tokio::test]
    async fn id_and_key_address_the_same_record() {
        let service = test_service().await;

        let (id, _) = service
            .create_secret("api-key-1", "value", "masterpass")
            .await
            .expect("create secret");

        let by_id = service.get_encrypted(id.as_str()).await.expect("by id");
        let by_key = service.get_encrypted("api-key-1").await.expect("by key");
        assert_eq!(by_id, by_key);
    }

    #[tokio::test]
    async fn duplicate_key_is_rejected() {
        let service = test_service().await;

        service
            .create_secret("api-key-1", "first", "masterpass")
            .await
            .expect("first create");

        let err = service
            .create_secret("api-key-1", "second", "masterpass")
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn create_rejects_empty_inputs() {
        let service = test_service().await;

        let err = service
            .create_secret("", "value", "masterpass")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = service
            .create_secret("api-key-1", "", "masterpass")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn update_replaces_plaintext_without_reading_old_value() {
        let service = test_service().await;

        let (id, _) = service
            .create_secret("api-key-1", "v1", "masterpass")
            .await
            .expect("create secret");
        let before = service.get_encrypted(id.as_str()).await.expect("fetch");

        service
            .update_secret(&id, "v2", "masterpass")
            .await
            .expect("update secret");

        let after = service.get_encrypted(id.as_str()).await.expect("refetch");
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
        assert_eq!(service.decrypt(&after, "masterpass").expect("decrypt"), "v2");
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let service = test_service().await;

        let err = service
            .update_secret(&SecretId::new(), "value", "masterpass")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_then_fetch_is_not_found() {
        let service = test_service().await;

        let (id, _) = service
            .create_secret("api-key-1", "value", "masterpass")
            .await
            .expect("create secret");

        service.delete_secret(&id).await.expect("delete secret");

        let err = service.get_encrypted(id.as_str()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        let err = service.get_encrypted("api-key-1").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn uuid_shaped_key_is_shadowed_by_id_lookup() {
        let service = test_service().await;

        // The key is a valid UUID string that matches no record id, so the
        // query resolver sends the lookup down the id path and misses.
        let uuid_key = Uuid::new_v4().to_string();
        service
            .create_secret(&uuid_key, "value", "masterpass")
            .await
            .expect("create secret");

        let err = service.get_encrypted(&uuid_key).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
