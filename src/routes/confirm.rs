//! GET /auth/confirm

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Redirect;
use reqwest::Url;
use std::sync::Arc;

use super::request_origin;
use crate::ocsf;
use crate::provider::{OtpType, client};
use crate::session::middleware::CookieBridge;
use crate::types::ConfirmParams;

/// Where a confirmation link without a usable token ends up.
const CODE_ERROR_PATH: &str = "/auth-code-error";

/// Email link landing: verify the one-time token, store the session and send
/// the user on to `next`.
pub async fn confirm(
    State(state): State<Arc<crate::AppState>>,
    headers: HeaderMap,
    bridge: CookieBridge,
    Query(params): Query<ConfirmParams>,
) -> Redirect {
    let origin = request_origin(&headers, &state.config);
    let next = same_origin_path(params.next.as_deref(), &origin);

    let token_hash = params.token_hash.as_deref().filter(|t| !t.is_empty());
    let otp_type = params
        .otp_type
        .as_deref()
        .and_then(|t| t.parse::<OtpType>().ok());

    let (Some(token_hash), Some(otp_type)) = (token_hash, otp_type) else {
        return Redirect::to(CODE_ERROR_PATH);
    };

    match client::verify_otp(&state.http_client, &state.config, token_hash, otp_type).await {
        Ok(signed_in) => {
            let email = signed_in.user.as_ref().and_then(|u| u.email.clone());
            bridge.set(signed_in.session).await;

            ocsf::authentication_event(
                ocsf::ACTIVITY_OTHER,
                "Other",
                true,
                email.as_deref(),
                &format!("Email confirmation ({}) succeeded", otp_type.as_str()),
            );

            Redirect::to(&next)
        }
        Err(e) => {
            ocsf::authentication_event(
                ocsf::ACTIVITY_OTHER,
                "Other",
                false,
                None,
                &format!("Email confirmation ({}) failed: {}", otp_type.as_str(), e),
            );

            Redirect::to(&format!(
                "/error?error={}",
                urlencoding::encode(&e.to_string())
            ))
        }
    }
}

/// Reduce `next` to a local path, accepting only URLs on this origin.
///
/// Both sides go through URL parsing, so backslashes and embedded tab or
/// newline characters are read the way a browser reads them. Anything that
/// does not land on this origin, including a `//host` path, becomes `/`.
fn same_origin_path(next: Option<&str>, origin: &str) -> String {
    let (Some(next), Ok(origin)) = (next, Url::parse(origin)) else {
        return "/".into();
    };

    match Url::parse(next) {
        Ok(url) if url.origin() == origin.origin() && !url.path().starts_with("//") => {
            match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            }
        }
        _ => "/".into(),
    }
}
