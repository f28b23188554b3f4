//! # Configuration Settings
//!
//! Defines the configuration structure for the lockbox service.

use crate::errors::{Error, Result};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;
use zeroize::Zeroizing;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// Server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            observability: ObservabilityConfig::from_env(),
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        // Use validator crate for basic validation
        Validate::validate(self).map_err(Error::from)?;

        // Custom validation logic
        self.validate_custom()?;

        Ok(())
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        // Validate database URL format
        if !self.database.url.starts_with("sqlite://") {
            return Err(Error::validation("Database URL must start with 'sqlite://'"));
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Enable CORS
    pub enable_cors: bool,

    /// CORS allowed origins (empty = allow all)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: false,
            cors_origins: vec![],
        }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Create ServerConfig from environment variables
    pub fn from_env() -> Self {
        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);

        let enable_cors = std::env::var("SERVER_ENABLE_CORS")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(false);

        let cors_origins = std::env::var("SERVER_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self { host, port, enable_cors, cors_origins }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(
        min = 1,
        max = 100,
        message = "Max connections must be between 1 and 100"
    ))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[validate(range(
        min = 0,
        max = 50,
        message = "Min connections must be between 0 and 50"
    ))]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,

    /// Enable automatic migrations
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/lockbox.db".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600, // 10 minutes
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }

    /// Check if this is a SQLite configuration
    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite://")
    }

    /// Create DatabaseConfig from environment variables
    pub fn from_env() -> Self {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/lockbox.db".to_string());

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let min_connections = std::env::var("DATABASE_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);

        let connect_timeout_seconds = std::env::var("DATABASE_CONNECT_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        let idle_timeout_seconds = std::env::var("DATABASE_IDLE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(600);

        let auto_migrate = std::env::var("DATABASE_AUTO_MIGRATE")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(true);

        Self {
            url,
            max_connections,
            min_connections,
            connect_timeout_seconds,
            idle_timeout_seconds,
            auto_migrate,
        }
    }
}

/// Observability configuration for logging
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Service name used in log output
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Log file path (None = stdout only)
    pub log_file: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "lockbox".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
            log_file: None,
        }
    }
}

impl ObservabilityConfig {
    /// Create ObservabilityConfig from environment variables
    pub fn from_env() -> Self {
        let service_name =
            std::env::var("SERVICE_NAME").unwrap_or_else(|_| "lockbox".to_string());

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let json_logging = std::env::var("LOG_JSON")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(false);

        let log_file = std::env::var("LOG_FILE").ok().filter(|s| !s.is_empty());

        Self { service_name, log_level, json_logging, log_file }
    }
}

/// Master passphrase for secret encryption.
///
/// The wrapped string is zeroed on drop and never printed; `Debug` renders a
/// fixed placeholder. Callers reach the actual value only through `expose`.
#[derive(Clone)]
pub struct MasterKey(Zeroizing<String>);

impl MasterKey {
    pub fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }

    /// Borrow the raw passphrase for a crypto call
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MasterKey(***)")
    }
}

/// Security configuration
///
/// Kept out of [`AppConfig`] so the master key never rides along when the
/// rest of the configuration is serialized or logged.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Master passphrase for encrypting and decrypting stored secrets
    pub master_key: MasterKey,
}

impl SecurityConfig {
    /// Load security configuration from environment variables.
    ///
    /// Reads `MASTER_CRYPTO_PASS`. When unset, a random 32-byte key is
    /// generated so the process can still start, with loud warnings: data
    /// written under a generated key is unreadable after a restart.
    pub fn from_env() -> Result<Self> {
        let master_key = match std::env::var("MASTER_CRYPTO_PASS") {
            Ok(value) if !value.is_empty() => MasterKey::new(value),
            _ => {
                tracing::warn!(
                    "MASTER_CRYPTO_PASS environment variable is not set. A random key has been generated."
                );
                tracing::warn!(
                    "A randomly generated key is not suitable for production: secrets encrypted in this session cannot be decrypted after a restart. Configure a consistent key via MASTER_CRYPTO_PASS."
                );
                MasterKey::new(generate_random_key()?)
            }
        };

        Ok(Self { master_key })
    }
}

/// Generate a random 32-byte key rendered as 64 hex characters
fn generate_random_key() -> Result<String> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes)
        .map_err(|_| Error::internal("Failed to generate random master key"))?;
    Ok(hex::encode(bytes))
}
