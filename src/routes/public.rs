//! GET /public

use axum::Json;

use crate::types::MessageResponse;

/// Example open endpoint, reachable without a session.
pub async fn public() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "This is a public api endpoint".into(),
    })
}
