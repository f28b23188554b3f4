//! Secret domain entity
//!
//! `SecretRecord` is the persisted unit of the store: one encrypted blob,
//! addressable by a generated id or a caller-chosen key. The plaintext value
//! never appears on this type; `encrypted_value` is produced only by the
//! crypto engine and the record travels through fetch paths without ever
//! being decrypted.

use chrono::{DateTime, Utc};

use crate::errors::{Error, Result};
use crate::services::crypto::CryptoEngine;

use super::id::SecretId;

/// A stored secret: ciphertext plus its two addresses.
///
/// `id` and `key` are both unique and immutable after creation. `key` is
/// stored verbatim as supplied by the caller. `updated_at` advances only
/// when the ciphertext is replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct SecretRecord {
    pub id: SecretId,
    pub key: String,
    pub encrypted_value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SecretRecord {
    /// Assemble a record from already-encrypted material with a fresh id.
    /// Both timestamps start equal; the store advances `updated_at` on
    /// ciphertext replacement.
    pub fn new(key: String, encrypted_value: String) -> Self {
        let now = Utc::now();
        Self { id: SecretId::new(), key, encrypted_value, created_at: now, updated_at: now }
    }

    /// Build a record from caller input: validates, encrypts, assembles.
    ///
    /// The key is taken verbatim apart from the empty check; no trimming or
    /// case folding. Fails with a validation error on empty key or value and
    /// with a crypto error when encryption itself fails.
    pub fn create(
        crypto: &CryptoEngine,
        key: &str,
        plaintext: &str,
        master_key: &str,
    ) -> Result<Self> {
        if key.is_empty() {
            return Err(Error::validation("secret key must not be empty"));
        }
        if plaintext.is_empty() {
            return Err(Error::validation("secret value must not be empty"));
        }

        let encrypted_value = crypto.encrypt(plaintext.as_bytes(), master_key)?;
        Ok(Self::new(key.to_string(), encrypted_value))
    }
}
