//! # Configuration Management
//!
//! Environment-driven configuration for the lockbox service.

pub mod settings;

pub use settings::{
    AppConfig, DatabaseConfig, MasterKey, ObservabilityConfig, SecurityConfig, ServerConfig,
};
