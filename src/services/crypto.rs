//! Authenticated encryption for secret values using AES-256-GCM
//!
//! Secrets are encrypted at rest with a key derived from a caller-supplied
//! master passphrase. The passphrase is never stored; the same passphrase
//! always derives the same 256-bit key, so nothing but the ciphertext needs
//! to be persisted.
//!
//! ## Format
//!
//! Output is `hex(nonce || ciphertext || tag)` in lowercase: a fresh random
//! 12-byte nonce per call, then the AES-256-GCM ciphertext with its 16-byte
//! authentication tag appended. The encoding carries no version byte, and the
//! key derivation is a single SHA-256 pass rather than a memory-hard KDF.
//! Both are kept as-is for compatibility with previously stored blobs; a
//! format revision would add an explicit version prefix and an argon2-class
//! derivation.

use crate::errors::{Error, Result};
use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use tracing::{debug, error, instrument};

/// Size of AES-256-GCM nonce in bytes
const NONCE_SIZE: usize = 12;

/// Size of AES-256-GCM tag in bytes
const TAG_SIZE: usize = 16;

/// Derive the 256-bit cipher key from a master-key string.
///
/// Deterministic single SHA-256 pass over the passphrase bytes, so the same
/// passphrase always yields the same key with no stored key material. Not a
/// password-hardening KDF; see the module docs.
fn derive_key(master_key: &str) -> [u8; 32] {
    let digest = Sha256::digest(master_key.as_bytes());
    let mut key_bytes = [0u8; 32];
    key_bytes.copy_from_slice(&digest);
    key_bytes
}

/// Single-use nonce sequence for AES-GCM
struct SingleNonce {
    nonce: Option<[u8; NONCE_SIZE]>,
}

impl SingleNonce {
    fn new(nonce_bytes: [u8; NONCE_SIZE]) -> Self {
        Self { nonce: Some(nonce_bytes) }
    }
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> std::result::Result<Nonce, ring::error::Unspecified> {
        self.nonce.take().map(Nonce::assume_unique_for_key).ok_or(ring::error::Unspecified)
    }
}

/// Secret encryption engine.
///
/// Stateless apart from the system RNG; the cipher key is derived per call
/// from the supplied master key and dropped when the call returns.
#[derive(Clone)]
pub struct CryptoEngine {
    rng: SystemRandom,
}

impl CryptoEngine {
    /// Create a new encryption engine
    pub fn new() -> Self {
        Self { rng: SystemRandom::new() }
    }

    /// Encrypt plaintext under a key derived from `master_key`.
    ///
    /// Returns the storage blob: lowercase hex of `nonce || ciphertext || tag`.
    #[instrument(skip(self, plaintext, master_key), fields(plaintext_len = plaintext.len()))]
    pub fn encrypt(&self, plaintext: &[u8], master_key: &str) -> Result<String> {
        // Generate a random nonce
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        self.rng.fill(&mut nonce_bytes).map_err(|_| {
            error!("Failed to generate random nonce");
            Error::crypto("failed to generate random nonce for encryption")
        })?;

        // Create the sealing key
        let key_bytes = derive_key(master_key);
        let unbound_key = UnboundKey::new(&AES_256_GCM, &key_bytes).map_err(|_| {
            error!("Failed to create encryption key");
            Error::crypto("failed to create encryption key")
        })?;

        let nonce_sequence = SingleNonce::new(nonce_bytes);
        let mut sealing_key = aead::SealingKey::new(unbound_key, nonce_sequence);

        // Prepare buffer with plaintext + space for tag
        let mut ciphertext = plaintext.to_vec();
        ciphertext.reserve(TAG_SIZE);

        // Encrypt in place and append tag
        sealing_key.seal_in_place_append_tag(Aad::empty(), &mut ciphertext).map_err(|_| {
            error!("Encryption failed");
            Error::crypto("failed to encrypt secret value")
        })?;

        // Blob layout: nonce first so decrypt can recover it without metadata
        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        debug!(blob_len = blob.len(), "Successfully encrypted secret value");

        Ok(hex::encode(blob))
    }

    /// Decrypt a storage blob produced by [`encrypt`](Self::encrypt).
    ///
    /// Fails when the blob is not valid hex, too short to carry a nonce and
    /// tag, or when authentication fails. A wrong master key and a tampered
    /// blob are indistinguishable in the returned error.
    #[instrument(skip(self, encoded, master_key), fields(blob_len = encoded.len()))]
    pub fn decrypt(&self, encoded: &str, master_key: &str) -> Result<Vec<u8>> {
        let blob =
            hex::decode(encoded).map_err(|_| Error::crypto("ciphertext is not valid hex"))?;

        if blob.len() < NONCE_SIZE {
            return Err(Error::crypto("ciphertext too short to contain a nonce"));
        }

        let (nonce_slice, ciphertext) = blob.split_at(NONCE_SIZE);
        if ciphertext.len() < TAG_SIZE {
            return Err(Error::crypto("ciphertext too short (missing authentication tag)"));
        }

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        nonce_bytes.copy_from_slice(nonce_slice);

        // Create the opening key
        let key_bytes = derive_key(master_key);
        let unbound_key = UnboundKey::new(&AES_256_GCM, &key_bytes).map_err(|_| {
            error!("Failed to create decryption key");
            Error::crypto("failed to create decryption key")
        })?;

        let nonce_sequence = SingleNonce::new(nonce_bytes);
        let mut opening_key = aead::OpeningKey::new(unbound_key, nonce_sequence);

        // Decrypt in place
        let mut buffer = ciphertext.to_vec();
        let decrypted = opening_key.open_in_place(Aad::empty(), &mut buffer).map_err(|_| {
            error!("Decryption failed - possible tampering or wrong key");
            Error::crypto("decryption failed")
        })?;

        debug!(plaintext_len = decrypted.len(), "Successfully decrypted secret value");

        Ok(decrypted.to_vec())
    }
}

impl Default for CryptoEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CryptoEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoEngine").finish()
    }
}
