//! HTTP route handlers.

pub mod confirm;
pub mod forgot_password;
pub mod health;
pub mod login;
pub mod logout;
pub mod public;
pub mod render;
pub mod signup;
pub mod todos;
pub mod update_password;

use axum::Form;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::AppError;

/// JSON body extractor that ignores `Content-Type`.
///
/// The login and sign-up pages post `JSON.stringify(...)` through `fetch`
/// without setting a content type, which axum's `Json` would reject.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(body_rejection)?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))
    }
}

/// `application/x-www-form-urlencoded` extractor whose rejections render as
/// JSON `{error}` instead of axum's plain-text 415/422.
pub struct FormBody<T>(pub T);

impl<S, T> FromRequest<S> for FormBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Form::<T>::from_request(req, state)
            .await
            .map(|Form(value)| FormBody(value))
            .map_err(|e| AppError::InvalidInput(e.body_text()))
    }
}

/// Map a body buffering failure, keeping 413 for oversized bodies.
pub(crate) fn body_rejection(e: BytesRejection) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Public origin of this request, e.g. `https://app.example.com`.
///
/// Scheme from `X-Forwarded-Proto` (behind a proxy) or the cookie security
/// setting; host from the `Host` header.
pub fn request_origin(headers: &HeaderMap, config: &Config) -> String {
    let host = headers
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or(if config.session_https_only {
            "https"
        } else {
            "http"
        });

    format!("{}://{}", scheme, host)
}
