//! Fallback: hand unmatched paths to the page renderer.
//!
//! Requests that reach this point have already passed the access gate, so a
//! protected page arrives with the resolved user forwarded as headers.

use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use axum::response::Response;
use std::sync::Arc;

use super::body_rejection;
use crate::error::AppError;
use crate::middleware::gate::CurrentUser;

const USER_ID_HEADER: &str = "x-user-id";
const USER_EMAIL_HEADER: &str = "x-user-email";

/// Connection-level headers that must not be relayed in either direction.
const HOP_BY_HOP: &[HeaderName] = &[
    header::CONNECTION,
    header::HOST,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
    header::PROXY_AUTHORIZATION,
    header::PROXY_AUTHENTICATE,
];

pub async fn render(
    State(state): State<Arc<crate::AppState>>,
    user: Option<CurrentUser>,
    req: Request,
) -> Result<Response, AppError> {
    let Some(base) = state.config.renderer_url.as_deref() else {
        return Err(AppError::NotFound("Not found".into()));
    };

    let (parts, body) = req.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", base.trim_end_matches('/'), path_and_query);

    // Buffered under axum's default body limit; larger bodies get a 413.
    let body = Bytes::from_request(Request::new(body), &())
        .await
        .map_err(body_rejection)?;

    let mut headers = relay_headers(&parts.headers);
    // Identity headers come only from the gate, never from the client.
    headers.remove(USER_ID_HEADER);
    headers.remove(USER_EMAIL_HEADER);
    if let Some(CurrentUser(user)) = &user {
        if let Ok(v) = HeaderValue::from_str(&user.id) {
            headers.insert(USER_ID_HEADER, v);
        }
        if let Some(email) = user.email.as_deref()
            && let Ok(v) = HeaderValue::from_str(email)
        {
            headers.insert(USER_EMAIL_HEADER, v);
        }
    }

    let upstream = state
        .http_client
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            tracing::error!(url = %url, error = %e, "renderer request failed");
            AppError::Upstream(e.to_string())
        })?;

    let status = upstream.status();
    let response_headers = relay_headers(upstream.headers());
    let bytes = upstream.bytes().await.map_err(|e| {
        tracing::error!(url = %url, error = %e, "renderer response unreadable");
        AppError::Upstream(e.to_string())
    })?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}

/// Copy headers, leaving out the hop-by-hop set.
fn relay_headers(source: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(source.len());
    for (name, value) in source {
        if !HOP_BY_HOP.contains(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_headers_drops_hop_by_hop() {
        let mut source = HeaderMap::new();
        source.insert(header::HOST, HeaderValue::from_static("example.com"));
        source.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        source.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        source.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
        source.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        source.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));

        let out = relay_headers(&source);
        assert!(out.get(header::HOST).is_none());
        assert!(out.get(header::CONNECTION).is_none());
        assert!(out.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(out.get(header::ACCEPT).unwrap(), "text/html");
        assert_eq!(out.get_all(header::SET_COOKIE).iter().count(), 2);
    }
}
