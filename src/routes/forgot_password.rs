//! POST /auth/forgot-password

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use std::sync::Arc;

use super::{JsonBody, request_origin};
use crate::error::AppError;
use crate::ocsf;
use crate::provider::client;
use crate::types::{EmailRequest, SuccessResponse};

/// Ask the provider to mail a reset link that lands on the update-password page.
pub async fn forgot_password(
    State(state): State<Arc<crate::AppState>>,
    headers: HeaderMap,
    JsonBody(body): JsonBody<EmailRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let redirect_to = format!(
        "{}{}",
        request_origin(&headers, &state.config),
        state.config.password_reset_redirect_path
    );

    let result = client::reset_password_for_email(
        &state.http_client,
        &state.config,
        &body.email,
        &redirect_to,
    )
    .await;

    ocsf::account_change_event(
        ocsf::ACTIVITY_PASSWORD_RESET,
        "Password Reset",
        result.is_ok(),
        Some(&body.email),
        &match &result {
            Ok(()) => "Password reset email requested".to_string(),
            Err(e) => format!("Password reset request failed: {}", e),
        },
    );

    result?;
    Ok(Json(SuccessResponse { success: true }))
}
