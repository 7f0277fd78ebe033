//! Identity provider HTTP client.
//!
//! Talks to a GoTrue-compatible auth API at `{PROVIDER_URL}/auth/v1`. Every
//! call carries the publishable key in `apikey`; user-scoped calls add the
//! session's access token as a bearer credential.

use serde::Deserialize;
use serde_json::{Value, json};

use super::{OtpType, ProviderError, User, now_secs};
use crate::config::Config;
use crate::session::StoredSession;

/// Result of any grant that yields a session.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub session: StoredSession,
    pub user: Option<User>,
}

/// Token grant body shared by `/token`, `/verify` and auto-confirmed `/signup`.
#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    expires_at: Option<u64>,
    #[serde(default)]
    user: Option<User>,
}

impl From<TokenGrant> for SignedIn {
    fn from(grant: TokenGrant) -> Self {
        let expires_at = grant
            .expires_at
            .or_else(|| grant.expires_in.map(|secs| now_secs() + secs));
        SignedIn {
            session: StoredSession {
                access_token: grant.access_token,
                refresh_token: grant.refresh_token,
                expires_at,
            },
            user: grant.user,
        }
    }
}

fn endpoint(config: &Config, path: &str) -> String {
    format!("{}{}", config.auth_url(), path)
}

/// Send a provider request, returning the JSON body (or `Null` when empty).
///
/// Non-2xx responses become `ProviderError::Api` with the provider's message.
async fn send(
    config: &Config,
    request: reqwest::RequestBuilder,
) -> Result<Value, ProviderError> {
    let resp = request
        .header("apikey", &config.provider_publishable_key)
        .send()
        .await
        .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

    // Capture status before consuming the body
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
    let data: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::Null)
    };

    if !status.is_success() {
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message: error_message(&data),
        });
    }

    Ok(data)
}

/// Pick the human-readable message out of a provider error body.
fn error_message(data: &Value) -> String {
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| data.get(key).and_then(|v| v.as_str()))
        .unwrap_or("An error occurred")
        .to_string()
}

fn parse_grant(data: Value) -> Result<SignedIn, ProviderError> {
    serde_json::from_value::<TokenGrant>(data)
        .map(SignedIn::from)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

/// Password grant: `POST /token?grant_type=password`.
pub async fn sign_in_with_password(
    http_client: &reqwest::Client,
    config: &Config,
    email: &str,
    password: &str,
) -> Result<SignedIn, ProviderError> {
    let request = http_client
        .post(endpoint(config, "/token"))
        .query(&[("grant_type", "password")])
        .json(&json!({ "email": email, "password": password }));

    parse_grant(send(config, request).await?)
}

/// Register a new account.
///
/// Returns `Some` only when the project auto-confirms sign-ups; otherwise the
/// provider mails a confirmation link pointing at `redirect_to`.
pub async fn sign_up(
    http_client: &reqwest::Client,
    config: &Config,
    email: &str,
    password: &str,
    redirect_to: &str,
) -> Result<Option<SignedIn>, ProviderError> {
    let request = http_client
        .post(endpoint(config, "/signup"))
        .query(&[("redirect_to", redirect_to)])
        .json(&json!({ "email": email, "password": password }));

    let data = send(config, request).await?;
    if data.get("access_token").is_some() {
        parse_grant(data).map(Some)
    } else {
        Ok(None)
    }
}

/// Revoke the session server-side.
pub async fn sign_out(
    http_client: &reqwest::Client,
    config: &Config,
    access_token: &str,
) -> Result<(), ProviderError> {
    let request = http_client
        .post(endpoint(config, "/logout"))
        .query(&[("scope", "global")])
        .bearer_auth(access_token);

    send(config, request).await.map(|_| ())
}

/// Exchange an emailed one-time token hash for a session.
pub async fn verify_otp(
    http_client: &reqwest::Client,
    config: &Config,
    token_hash: &str,
    otp_type: OtpType,
) -> Result<SignedIn, ProviderError> {
    let request = http_client
        .post(endpoint(config, "/verify"))
        .json(&json!({ "type": otp_type.as_str(), "token_hash": token_hash }));

    parse_grant(send(config, request).await?)
}

/// Send a password-reset email whose link lands on `redirect_to`.
pub async fn reset_password_for_email(
    http_client: &reqwest::Client,
    config: &Config,
    email: &str,
    redirect_to: &str,
) -> Result<(), ProviderError> {
    let request = http_client
        .post(endpoint(config, "/recover"))
        .query(&[("redirect_to", redirect_to)])
        .json(&json!({ "email": email }));

    send(config, request).await.map(|_| ())
}

/// Change the signed-in user's password.
pub async fn update_password(
    http_client: &reqwest::Client,
    config: &Config,
    access_token: &str,
    password: &str,
) -> Result<User, ProviderError> {
    let request = http_client
        .put(endpoint(config, "/user"))
        .bearer_auth(access_token)
        .json(&json!({ "password": password }));

    let data = send(config, request).await?;
    serde_json::from_value(data).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

/// Resolve the user behind an access token.
pub async fn get_user(
    http_client: &reqwest::Client,
    config: &Config,
    access_token: &str,
) -> Result<User, ProviderError> {
    let request = http_client
        .get(endpoint(config, "/user"))
        .bearer_auth(access_token);

    let data = send(config, request).await?;
    serde_json::from_value(data).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

/// Refresh grant: `POST /token?grant_type=refresh_token`.
pub async fn refresh_session(
    http_client: &reqwest::Client,
    config: &Config,
    refresh_token: &str,
) -> Result<SignedIn, ProviderError> {
    let request = http_client
        .post(endpoint(config, "/token"))
        .query(&[("grant_type", "refresh_token")])
        .json(&json!({ "refresh_token": refresh_token }));

    parse_grant(send(config, request).await?)
}
