//! Identity provider integration.
//!
//! The provider owns users, credentials and sessions. This module wraps its
//! REST API (`client`) and resolves the caller's identity from the session
//! carried by the cookie bridge, refreshing it when the access token is stale.

pub mod client;
pub mod jwt;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::Config;
use crate::session::StoredSession;
use crate::session::middleware::CookieBridge;

/// Seconds before `expires_at` at which a session is already treated as stale.
pub const EXPIRY_MARGIN_SECS: u64 = 10;

/// A provider user. Only the fields this service reads are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// One-time token kinds accepted by `/auth/confirm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpType {
    Signup,
    Invite,
    Magiclink,
    Recovery,
    EmailChange,
    Email,
}

impl OtpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpType::Signup => "signup",
            OtpType::Invite => "invite",
            OtpType::Magiclink => "magiclink",
            OtpType::Recovery => "recovery",
            OtpType::EmailChange => "email_change",
            OtpType::Email => "email",
        }
    }
}

impl FromStr for OtpType {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup" => Ok(OtpType::Signup),
            "invite" => Ok(OtpType::Invite),
            "magiclink" => Ok(OtpType::Magiclink),
            "recovery" => Ok(OtpType::Recovery),
            "email_change" => Ok(OtpType::EmailChange),
            "email" => Ok(OtpType::Email),
            other => Err(ProviderError::InvalidResponse(format!(
                "unknown otp type: {other}"
            ))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Auth session missing!")]
    SessionMissing,

    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether the provider says the session no longer exists.
    pub fn is_session_gone(&self) -> bool {
        matches!(self, ProviderError::Api { status: 401 | 403 | 404, .. })
    }
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Return the bridge's session, refreshing it first when stale.
///
/// A refreshed session is written back through the bridge. If the provider
/// rejects the refresh token the cookie is cleared; transport failures leave
/// it in place so a later request can retry.
pub async fn active_session(
    http_client: &reqwest::Client,
    config: &Config,
    bridge: &CookieBridge,
) -> Result<Option<StoredSession>, ProviderError> {
    let Some(session) = bridge.session().await else {
        return Ok(None);
    };

    if !session.is_expired() {
        return Ok(Some(session));
    }

    match client::refresh_session(http_client, config, &session.refresh_token).await {
        Ok(fresh) => {
            tracing::debug!("provider session refreshed");
            bridge.set(fresh.session.clone()).await;
            Ok(Some(fresh.session))
        }
        Err(e @ ProviderError::Api { .. }) => {
            bridge.clear().await;
            Err(e)
        }
        Err(e) => Err(e),
    }
}

/// Resolve the signed-in user, or `None` when the request carries no session.
pub async fn current_user(
    http_client: &reqwest::Client,
    config: &Config,
    bridge: &CookieBridge,
) -> Result<Option<User>, ProviderError> {
    let Some(session) = active_session(http_client, config, bridge).await? else {
        return Ok(None);
    };

    client::get_user(http_client, config, &session.access_token)
        .await
        .map(Some)
}
