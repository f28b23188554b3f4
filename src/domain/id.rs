//! Domain ID Types with NewType Pattern
//!
//! Type-safe wrapper for secret identifiers. The inner value is a UUID
//! rendered as a string, which keeps it directly bindable as a TEXT column
//! while `parse` enforces well-formedness at trust boundaries. The string
//! form also backs the dual-addressing rule in `SecretService::resolve_query`:
//! a query that parses as a UUID is treated as an identifier, anything else
//! as a caller-chosen key.

use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::{Decode, Encode, Sqlite, Type};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Macro to generate NewType ID wrappers with all required traits
macro_rules! domain_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a fresh UUID
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Create an ID from an existing string (for database retrieval)
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Create an ID from a string slice
            pub fn from_str_unchecked(s: &str) -> Self {
                Self(s.to_string())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert to inner string value
            pub fn into_string(self) -> String {
                self.0
            }

            /// Parse and validate a UUID string
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s)?;
                Ok(Self(s.to_string()))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        // SQLx trait implementations for database compatibility
        impl Type<Sqlite> for $name {
            fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
                <String as Type<Sqlite>>::type_info()
            }
        }

        impl<'q> Encode<'q, Sqlite> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
            ) -> Result<IsNull, BoxDynError> {
                <String as Encode<'q, Sqlite>>::encode_by_ref(&self.0, buf)
            }
        }

        impl<'r> Decode<'r, Sqlite> for $name {
            fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
                let s = <String as Decode<'r, Sqlite>>::decode(value)?;
                Ok(Self(s))
            }
        }
    };
}

domain_id!(
    /// Unique identifier for a stored secret, generated once at creation
    SecretId
);
