//! Domain layer
//!
//! Pure domain entities for the secret store: the type-safe identifier and
//! the persisted secret record with its construction rule. Nothing in here
//! touches HTTP or the database; the storage layer maps rows into these
//! types and the API layer maps them into wire DTOs.
//!
//! ## Module Organization
//!
//! - `id`: Type-safe domain identifiers with NewType pattern
//! - `secret`: The secret record entity and its factory

pub mod id;
pub mod secret;

// Re-export main types from each module
pub use id::SecretId;
pub use secret::SecretRecord;
