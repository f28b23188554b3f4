//! Repository modules for data access
//!
//! One repository per resource type. The secret store has exactly one.

pub mod secret;

// Re-export the repository port and its SQLite implementation
pub use secret::{SecretRepository, SqlxSecretRepository};
