use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::error;

use crate::errors::Error;
use crate::observability::sanitize_log_message;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Conflict(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error_kind = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal_error",
        };

        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::NotFound(msg)
            | ApiError::Internal(msg) => msg,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(message = %sanitize_log_message(&message), "Internal server error");
        }

        (status, Json(ErrorBody { error: error_kind, message })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => ApiError::BadRequest(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            // Wrong key and tampered ciphertext must be indistinguishable to
            // the caller.
            Error::Crypto(_) => ApiError::Internal("Something went wrong".to_string()),
            Error::Database { source, context } => {
                if let Some(db_err) = source.as_database_error() {
                    if let Some(code) = db_err.code() {
                        if code.as_ref() == "2067" || code.as_ref().starts_with("SQLITE_CONSTRAINT")
                        {
                            return ApiError::Conflict(context);
                        }
                    }
                }
                ApiError::Internal(context)
            }
            Error::Config(msg) | Error::Transport(msg) | Error::Internal(msg) => {
                ApiError::Internal(msg)
            }
            Error::Io(err) => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_variants() {
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ApiError::from(Error::validation("secret key must not be empty"));
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn conflict_maps_to_conflict() {
        let err = ApiError::from(Error::conflict("Secret with key 'a' already exists"));
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn crypto_errors_collapse_to_a_generic_message() {
        for detail in ["decryption failed", "ciphertext is not valid hex"] {
            match ApiError::from(Error::crypto(detail)) {
                ApiError::Internal(msg) => assert_eq!(msg, "Something went wrong"),
                other => panic!("expected Internal, got {:?}", other),
            }
        }
    }

    #[test]
    fn not_found_maps_to_not_found() {
        let err = ApiError::from(Error::not_found("Secret with key 'a' not found"));
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
