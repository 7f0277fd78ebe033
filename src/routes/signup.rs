//! POST /auth/signup

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use std::sync::Arc;

use super::{JsonBody, request_origin};
use crate::error::AppError;
use crate::ocsf;
use crate::provider::client;
use crate::session::middleware::CookieBridge;
use crate::types::{CredentialsRequest, SuccessResponse};

/// Register an account; the confirmation email links back to the sign-up
/// landing page on this origin.
pub async fn signup(
    State(state): State<Arc<crate::AppState>>,
    headers: HeaderMap,
    bridge: CookieBridge,
    JsonBody(body): JsonBody<CredentialsRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let redirect_to = format!(
        "{}{}",
        request_origin(&headers, &state.config),
        state.config.signup_redirect_path
    );

    let result = client::sign_up(
        &state.http_client,
        &state.config,
        &body.email,
        &body.password,
        &redirect_to,
    )
    .await;

    ocsf::account_change_event(
        ocsf::ACTIVITY_CREATE,
        "Create",
        result.is_ok(),
        Some(&body.email),
        &match &result {
            Ok(_) => "Account created".to_string(),
            Err(e) => format!("Sign-up failed: {}", e),
        },
    );

    // Auto-confirmed projects hand back a session straight away.
    if let Some(signed_in) = result? {
        bridge.set(signed_in.session).await;
    }

    Ok(Json(SuccessResponse { success: true }))
}
