//! # Lockbox
//!
//! Lockbox is a small HTTP service for storing secrets encrypted at rest.
//! Plaintext values are sealed with AES-256-GCM under a key derived from a
//! single master passphrase, and records are addressable both by a generated
//! UUID and by a caller-chosen lookup key.
//!
//! ## Architecture
//!
//! The system follows a layered architecture pattern:
//!
//! ```text
//! REST API Layer → Secret Service → Crypto Engine
//!      ↓                ↓
//! Observability   Persistence Layer (SQLite)
//! ```
//!
//! ## Core Components
//!
//! - **REST API**: Axum-based HTTP server exposing the secrets CRUD surface
//! - **Secret Service**: Lookup resolution plus the fetch/decrypt split
//! - **Crypto Engine**: AES-256-GCM sealing with a SHA-256 derived key
//! - **Persistence Layer**: SQLx with SQLite for encrypted record storage

pub mod api;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod services;
pub mod storage;

// Re-export commonly used types and traits
pub use config::{AppConfig, DatabaseConfig, MasterKey, SecurityConfig, ServerConfig};
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_available() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "lockbox");
    }
}
