//! Error handling for the Lockbox secret store.
//!
//! One error type covers the whole crate. The first five variants map
//! one-to-one onto the failure kinds callers can act on (bad input,
//! duplicate key, missing record, cipher failure, storage failure); the
//! rest cover process wiring. The HTTP boundary translates these into
//! status codes in `api::error`.

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Lockbox service
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or empty caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate secret key on create
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unknown identifier or key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Encryption, decryption, or ciphertext-format failure. Decrypt
    /// failures are deliberately undifferentiated: a wrong master key and a
    /// tampered blob produce the same error so callers get no oracle.
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Persistence failure with query context
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network transport errors (HTTP)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new conflict error
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict(message.into())
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a new crypto error
    pub fn crypto<S: Into<String>>(message: S) -> Self {
        Self::Crypto(message.into())
    }

    /// Create a new database error wrapping the sqlx source
    pub fn database<S: Into<String>>(source: sqlx::Error, context: S) -> Self {
        Self::Database { source, context: context.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// True when the error came from a unique-constraint violation, which
    /// the repository surfaces when a secret key already exists.
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Conflict(_) => true,
            Self::Database { source, .. } => source
                .as_database_error()
                .and_then(|db_err| db_err.code())
                .map(|code| code == "2067" || code.starts_with("SQLITE_CONSTRAINT"))
                .unwrap_or(false),
            _ => false,
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}
