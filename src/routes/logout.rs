//! POST /auth/logout

use axum::Json;
use axum::extract::State;
use std::sync::Arc;

use crate::error::AppError;
use crate::ocsf;
use crate::provider::client;
use crate::session::middleware::CookieBridge;
use crate::types::SuccessResponse;

/// Revoke the provider session and clear the session cookie.
pub async fn logout(
    State(state): State<Arc<crate::AppState>>,
    bridge: CookieBridge,
) -> Result<Json<SuccessResponse>, AppError> {
    if let Some(session) = bridge.session().await {
        match client::sign_out(&state.http_client, &state.config, &session.access_token).await {
            Ok(()) => {}
            // Already revoked or expired upstream: nothing left to end.
            Err(e) if e.is_session_gone() => {
                tracing::debug!("provider session already gone: {}", e);
            }
            Err(e) => {
                ocsf::authentication_event(
                    ocsf::ACTIVITY_LOGOFF,
                    "Logoff",
                    false,
                    None,
                    &format!("Logout failed: {}", e),
                );
                return Err(e.into());
            }
        }
    }

    bridge.clear().await;

    ocsf::authentication_event(
        ocsf::ACTIVITY_LOGOFF,
        "Logoff",
        true,
        None,
        "User logged out",
    );

    Ok(Json(SuccessResponse { success: true }))
}
