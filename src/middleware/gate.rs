//! Access gate: session enforcement for protected path prefixes.
//!
//! Paths under a configured prefix need a resolvable provider user. The
//! resolved user is attached to the request as `CurrentUser`; otherwise the
//! caller is redirected to the login page and the handler never runs.
//! Provider failures are not told apart from a missing session.

use axum::extract::{FromRequestParts, OptionalFromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::convert::Infallible;
use std::sync::Arc;

use crate::AppState;
use crate::error::AppError;
use crate::ocsf;
use crate::provider::{self, User};
use crate::session::middleware::CookieBridge;

pub const LOGIN_PATH: &str = "/login";

/// Suffix of the data-only variant of a page route (`/dashboard.data`).
const DATA_SUFFIX: &str = ".data";

/// Identity resolved by the gate for this request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Required identity: rejects with a login redirect when the gate did not run
/// or found no user.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}

/// Optional identity for open pages that render differently for guests.
impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned())
    }
}

/// Whether `path` falls under `prefix`: the prefix itself, anything below
/// it, or its data-only variant.
pub fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('/') || rest == DATA_SUFFIX,
        None => false,
    }
}

/// Whether any configured prefix covers `path`.
pub fn is_protected(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| matches_prefix(path, prefix))
}

/// Axum middleware enforcing a session on protected prefixes.
pub async fn access_gate(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if !is_protected(&path, &state.config.protected_routes) {
        return next.run(req).await;
    }

    let Some(bridge) = req.extensions().get::<CookieBridge>().cloned() else {
        return AppError::Internal("Cookie bridge middleware not configured".into())
            .into_response();
    };

    match provider::current_user(&state.http_client, &state.config, &bridge).await {
        Ok(Some(user)) => {
            tracing::debug!(user_id = %user.id, path = %path, "access granted");
            req.extensions_mut().insert(CurrentUser(user));
            next.run(req).await
        }
        Ok(None) => {
            ocsf::access_denied_event(&path, "No session");
            AppError::Unauthenticated.into_response()
        }
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "session resolution failed");
            ocsf::access_denied_event(&path, &format!("Session resolution failed: {e}"));
            AppError::Unauthenticated.into_response()
        }
    }
}
