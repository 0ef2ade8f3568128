/*
 * Responsibility
 * - AppError shared by every handler
 * - IntoResponse (HTTP status + JSON error body)
 * - Conversions from repo / codec / password / token errors
 *
 * The authentication gate does not use this type: its rejections are bare
 * 403s (see middleware/auth).
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::TokenError;
use crate::services::auth::password::PasswordError;
use crate::services::id_codec::IdCodecError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "unauthorized".into(),
            ),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found."),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::bad_request("CONFLICT", "resource already exists"),
            RepoError::MissingReference => {
                AppError::bad_request("UNKNOWN_REFERENCE", "referenced resource does not exist")
            }
            RepoError::Db(err) => {
                tracing::error!(error = %err, "database error");
                AppError::Internal
            }
        }
    }
}

impl From<IdCodecError> for AppError {
    fn from(e: IdCodecError) -> Self {
        match e {
            // Client supplied a malformed public id (e.g. /posts/{id})
            IdCodecError::DecodeInvalidFormat | IdCodecError::DecodeOutOfRange => {
                AppError::bad_request("INVALID_PUBLIC_ID", "invalid id")
            }
            // Server-side config / programming errors
            other => {
                tracing::error!(error = %other, "id codec failure");
                AppError::Internal
            }
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::Mismatch => AppError::Unauthorized,
            other => {
                tracing::error!(error = %other, "password hashing failure");
                AppError::Internal
            }
        }
    }
}

// Reached only when signing fails; verification errors never leave the gate.
impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        tracing::error!(error = %e, "token issuance failure");
        AppError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn renders_json_error_body() {
        let (status, body) =
            body_json(AppError::bad_request("VALIDATION", "title too short")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION");
        assert_eq!(body["error"]["message"], "title too short");
    }

    #[tokio::test]
    async fn maps_statuses() {
        assert_eq!(body_json(AppError::Unauthorized).await.0, StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(AppError::not_found("post")).await.0, StatusCode::NOT_FOUND);
        assert_eq!(body_json(AppError::Internal).await.0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn conflict_becomes_bad_request() {
        assert!(matches!(
            AppError::from(RepoError::Conflict),
            AppError::BadRequest { code: "CONFLICT", .. }
        ));
    }

    #[test]
    fn missing_reference_is_client_error() {
        assert!(matches!(
            AppError::from(RepoError::MissingReference),
            AppError::BadRequest { code: "UNKNOWN_REFERENCE", .. }
        ));
    }

    #[test]
    fn malformed_public_id_is_client_error() {
        assert!(matches!(
            AppError::from(IdCodecError::DecodeInvalidFormat),
            AppError::BadRequest { code: "INVALID_PUBLIC_ID", .. }
        ));
    }
}
