//! Business logic services
//!
//! This module contains service layer components that encapsulate
//! business logic, separated from HTTP concerns.

pub mod crypto;
pub mod secret_service;

pub use crypto::CryptoEngine;
pub use secret_service::{SecretLookup, SecretService};
