//! Application error types with Axum response mapping.
//!
//! Each variant maps to a specific HTTP status. API-style failures carry a
//! JSON `{"error": ...}` body; a missing session becomes a redirect to the
//! login page instead.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::middleware::gate::LOGIN_PATH;
use crate::provider::ProviderError;
use crate::todo::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Provider(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Upstream renderer failed: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(format!("Todo with id {id} not found")),
            StoreError::InvalidInput(msg) => AppError::InvalidInput(msg),
            StoreError::Forbidden(id) => {
                AppError::Forbidden(format!("Todo with id {id} belongs to another user"))
            }
            StoreError::Persistence(msg) => AppError::Persistence(msg),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::Provider(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthenticated => {
                return (StatusCode::FOUND, [(header::LOCATION, LOGIN_PATH)]).into_response();
            }
            AppError::BadRequest(_) | AppError::InvalidInput(_) | AppError::Provider(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Persistence(msg) | AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, axum::Json(json!({"error": self.to_string()}))).into_response()
    }
}
