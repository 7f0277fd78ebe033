//! Axum cookie bridge layer.
//!
//! Reads the signed session cookie once per request, exposes it to the
//! access gate and handlers through a `CookieBridge` in the request
//! extensions, and turns any buffered change into a `Set-Cookie` header on
//! the response. Redirects and error responses pass through the same exit,
//! so a session refreshed by the gate is persisted even when the gate then
//! rejects the request.

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::StoredSession;
use super::cookie::{decode_session, encode_session};

pub const COOKIE_NAME: &str = "todo_session";
const MAX_AGE_SECS: u64 = 30 * 24 * 3600; // 30 days

/// Buffered cookie mutation, applied when the response leaves the stack.
#[derive(Debug, Clone, PartialEq)]
enum CookieChange {
    Set(StoredSession),
    Clear,
}

/// Per-request handle to the session cookie, inserted into request extensions.
#[derive(Clone)]
pub struct CookieBridge {
    incoming: Option<StoredSession>,
    pending: Arc<Mutex<Option<CookieChange>>>,
}

/// Extract CookieBridge from request extensions (put there by the bridge middleware).
impl<S> FromRequestParts<S> for CookieBridge
where
    S: Send + Sync,
{
    type Rejection = crate::error::AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CookieBridge>()
            .cloned()
            .ok_or(crate::error::AppError::Internal(
                "Cookie bridge middleware not configured".into(),
            ))
    }
}

impl CookieBridge {
    fn new(incoming: Option<StoredSession>, initial: Option<CookieChange>) -> Self {
        Self {
            incoming,
            pending: Arc::new(Mutex::new(initial)),
        }
    }

    /// The session as this request currently sees it, buffered writes included.
    pub async fn session(&self) -> Option<StoredSession> {
        match &*self.pending.lock().await {
            Some(CookieChange::Set(session)) => Some(session.clone()),
            Some(CookieChange::Clear) => None,
            None => self.incoming.clone(),
        }
    }

    /// Replace the session cookie on the way out.
    pub async fn set(&self, session: StoredSession) {
        *self.pending.lock().await = Some(CookieChange::Set(session));
    }

    /// Expire the session cookie on the way out.
    pub async fn clear(&self) {
        *self.pending.lock().await = Some(CookieChange::Clear);
    }
}

/// Cookie bridge configuration.
pub struct CookieLayer {
    pub secret: String,
    pub https_only: bool,
    pub cookie_domain: Option<String>,
}

/// Axum middleware function for the session cookie bridge.
pub async fn cookie_bridge_middleware(
    layer: Arc<CookieLayer>,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_header = req
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    let raw = parse_cookie(&cookie_header, COOKIE_NAME);
    let incoming = raw.and_then(|v| decode_session(layer.secret.as_bytes(), v));

    // A cookie we cannot verify is dropped rather than echoed back forever.
    let initial = match (raw, &incoming) {
        (Some(value), None) if !value.is_empty() => {
            tracing::debug!("discarding unverifiable session cookie");
            Some(CookieChange::Clear)
        }
        _ => None,
    };

    let bridge = CookieBridge::new(incoming, initial);
    req.extensions_mut().insert(bridge.clone());

    let mut response = next.run(req).await;

    let change = bridge.pending.lock().await.take();
    let domain = layer.cookie_domain.as_deref();

    let cookie = match change {
        Some(CookieChange::Set(session)) => Some(make_set_cookie(
            &layer.secret,
            &session,
            layer.https_only,
            domain,
        )),
        Some(CookieChange::Clear) => Some(make_delete_cookie(layer.https_only, domain)),
        None => None,
    };

    if let Some(cookie) = cookie {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Failed to encode session cookie: {}", e),
        }
    }

    response
}

fn make_set_cookie(
    secret: &str,
    session: &StoredSession,
    https_only: bool,
    cookie_domain: Option<&str>,
) -> String {
    let signed = encode_session(secret.as_bytes(), session);
    let mut parts = vec![
        format!("{}={}", COOKIE_NAME, signed),
        format!("Max-Age={}", MAX_AGE_SECS),
        "Path=/".into(),
        "HttpOnly".into(),
        "SameSite=Lax".into(),
    ];
    if https_only {
        parts.push("Secure".into());
    }
    if let Some(domain) = cookie_domain {
        parts.push(format!("Domain={domain}"));
    }
    parts.join("; ")
}

fn make_delete_cookie(https_only: bool, cookie_domain: Option<&str>) -> String {
    let mut parts = vec![
        format!("{}=", COOKIE_NAME),
        "Max-Age=0".into(),
        "Path=/".into(),
        "HttpOnly".into(),
        "SameSite=Lax".into(),
    ];
    if https_only {
        parts.push("Secure".into());
    }
    if let Some(domain) = cookie_domain {
        parts.push(format!("Domain={domain}"));
    }
    parts.join("; ")
}

/// Parse a specific cookie from a Cookie header value.
fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    for part in header.split(';') {
        let trimmed = part.trim();
        if let Some(value) = trimmed.strip_prefix(name)
            && let Some(value) = value.strip_prefix('=')
        {
            return Some(value);
        }
    }
    None
}
