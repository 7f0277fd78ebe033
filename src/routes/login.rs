//! POST /auth/login

use axum::Json;
use axum::extract::State;
use std::sync::Arc;

use super::JsonBody;
use crate::error::AppError;
use crate::ocsf;
use crate::provider::client;
use crate::session::middleware::CookieBridge;
use crate::types::{CredentialsRequest, SuccessResponse};

/// Password login. The provider session is stored in the session cookie.
pub async fn login(
    State(state): State<Arc<crate::AppState>>,
    bridge: CookieBridge,
    JsonBody(body): JsonBody<CredentialsRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    match client::sign_in_with_password(
        &state.http_client,
        &state.config,
        &body.email,
        &body.password,
    )
    .await
    {
        Ok(signed_in) => {
            bridge.set(signed_in.session).await;

            ocsf::authentication_event(
                ocsf::ACTIVITY_LOGON,
                "Logon",
                true,
                Some(&body.email),
                "Password login succeeded",
            );

            Ok(Json(SuccessResponse { success: true }))
        }
        Err(e) => {
            ocsf::authentication_event(
                ocsf::ACTIVITY_LOGON,
                "Logon",
                false,
                Some(&body.email),
                &format!("Password login failed: {}", e),
            );
            Err(e.into())
        }
    }
}
