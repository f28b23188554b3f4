//! Secret management HTTP handlers
//!
//! Fetching the stored record and decrypting it are separate steps so that a
//! storage miss and a failed decryption surface as different errors.

pub mod types;

pub use types::{
    CreateSecretRequest, CreateSecretResponse, MessageResponse, SecretValueResponse,
    UpdateSecretRequest,
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;
use validator::Validate;

use crate::{
    api::{error::ApiError, routes::ApiState},
    errors::Error,
};

/// Create a new secret
#[utoipa::path(
    post,
    path = "/secrets",
    request_body = CreateSecretRequest,
    responses(
        (status = 201, description = "Secret created", body = CreateSecretResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Secret key already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "secrets"
)]
#[instrument(skip(state, payload), fields(secret_key = %payload.secret_key))]
pub async fn create_secret_handler(
    State(state): State<ApiState>,
    Json(payload): Json<CreateSecretRequest>,
) -> Result<(StatusCode, Json<CreateSecretResponse>), ApiError> {
    payload
        .validate()
        .map_err(|err| ApiError::from(Error::from(err)))?;

    let (id, key) = state
        .service
        .create_secret(
            &payload.secret_key,
            &payload.secret_value,
            state.master_key.expose(),
        )
        .await
        .map_err(ApiError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSecretResponse {
            id: id.into_string(),
            key,
        }),
    ))
}

/// Fetch a secret by id or key and return the decrypted value
#[utoipa::path(
    get,
    path = "/secrets/{query}",
    params(("query" = String, Path, description = "Secret id (UUID) or lookup key")),
    responses(
        (status = 200, description = "Decrypted secret value", body = SecretValueResponse),
        (status = 404, description = "Secret not found"),
        (status = 500, description = "Decryption failed")
    ),
    tag = "secrets"
)]
#[instrument(skip(state))]
pub async fn get_secret_handler(
    State(state): State<ApiState>,
    Path(query): Path<String>,
) -> Result<Json<SecretValueResponse>, ApiError> {
    let record = state
        .service
        .get_encrypted(&query)
        .await
        .map_err(|_| ApiError::NotFound("Secret not found".to_string()))?;

    let value = state
        .service
        .decrypt(&record, state.master_key.expose())
        .map_err(ApiError::from)?;

    Ok(Json(SecretValueResponse {
        key: record.key,
        value,
    }))
}

/// Replace the value of an existing secret
#[utoipa::path(
    put,
    path = "/secrets/{query}",
    params(("query" = String, Path, description = "Secret id (UUID) or lookup key")),
    request_body = UpdateSecretRequest,
    responses(
        (status = 200, description = "Secret updated", body = MessageResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Secret not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "secrets"
)]
#[instrument(skip(state, payload))]
pub async fn update_secret_handler(
    State(state): State<ApiState>,
    Path(query): Path<String>,
    Json(payload): Json<UpdateSecretRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload
        .validate()
        .map_err(|err| ApiError::from(Error::from(err)))?;

    let record = state
        .service
        .get_encrypted(&query)
        .await
        .map_err(|_| ApiError::NotFound("Secret not found".to_string()))?;

    state
        .service
        .update_secret(&record.id, &payload.secret_value, state.master_key.expose())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(MessageResponse {
        message: "Secret updated successfully".to_string(),
    }))
}

/// Delete a secret by id or key
#[utoipa::path(
    delete,
    path = "/secrets/{query}",
    params(("query" = String, Path, description = "Secret id (UUID) or lookup key")),
    responses(
        (status = 200, description = "Secret deleted", body = MessageResponse),
        (status = 404, description = "Secret not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "secrets"
)]
#[instrument(skip(state))]
pub async fn delete_secret_handler(
    State(state): State<ApiState>,
    Path(query): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let record = state
        .service
        .get_encrypted(&query)
        .await
        .map_err(|_| ApiError::NotFound("Secret not found".to_string()))?;

    state
        .service
        .delete_secret(&record.id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(MessageResponse {
        message: "Secret deleted successfully".to_string(),
    }))
}
