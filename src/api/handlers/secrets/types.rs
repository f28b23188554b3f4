//! Request and response types for the secrets API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request to create a new secret
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSecretRequest {
    /// Lookup key for the secret (must be unique)
    #[validate(length(min = 1, max = 255))]
    pub secret_key: String,

    /// Plaintext value to encrypt and store
    #[validate(length(min = 1))]
    pub secret_value: String,
}

/// Request to replace the value of an existing secret
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateSecretRequest {
    /// New plaintext value
    #[validate(length(min = 1))]
    pub secret_value: String,
}

/// Response returned after creating a secret
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSecretResponse {
    /// Generated secret id
    pub id: String,

    /// Lookup key the secret was stored under
    pub key: String,
}

/// Response carrying a decrypted secret value
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SecretValueResponse {
    /// Lookup key of the secret
    pub key: String,

    /// Decrypted plaintext value
    pub value: String,
}

/// Generic acknowledgement response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
