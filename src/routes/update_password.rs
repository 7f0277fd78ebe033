//! POST /auth/update-password

use axum::Json;
use axum::extract::State;
use std::sync::Arc;

use super::JsonBody;
use crate::error::AppError;
use crate::ocsf;
use crate::provider::{self, ProviderError, client};
use crate::session::middleware::CookieBridge;
use crate::types::{PasswordRequest, SuccessResponse};

/// Change the signed-in user's password. Needs an active session.
pub async fn update_password(
    State(state): State<Arc<crate::AppState>>,
    bridge: CookieBridge,
    JsonBody(body): JsonBody<PasswordRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let session = provider::active_session(&state.http_client, &state.config, &bridge)
        .await?
        .ok_or(ProviderError::SessionMissing)?;

    match client::update_password(
        &state.http_client,
        &state.config,
        &session.access_token,
        &body.password,
    )
    .await
    {
        Ok(user) => {
            ocsf::account_change_event(
                ocsf::ACTIVITY_PASSWORD_CHANGE,
                "Password Change",
                true,
                user.email.as_deref(),
                "Password updated",
            );
            Ok(Json(SuccessResponse { success: true }))
        }
        Err(e) => {
            ocsf::account_change_event(
                ocsf::ACTIVITY_PASSWORD_CHANGE,
                "Password Change",
                false,
                None,
                &format!("Password update failed: {}", e),
            );
            Err(e.into())
        }
    }
}
