//! Test utilities: test app builder, session cookie factory, provider mocks.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use serde_json::{Value, json};
use std::sync::Arc;
use todo_gate::config::Config;
use todo_gate::session::StoredSession;
use todo_gate::session::cookie::encode_session;
use todo_gate::session::middleware::{COOKIE_NAME, CookieLayer};
use todo_gate::todo::AnyStore;
use todo_gate::todo::memory::InMemoryStore;
use todo_gate::{AppState, create_app};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USER_ID: &str = "user-1";
pub const USER_EMAIL: &str = "a@b.com";
pub const ACCESS_TOKEN: &str = "at-valid";
pub const REFRESH_TOKEN: &str = "rt-valid";

pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Config pointing the provider client at a mock server.
pub fn config_for(server: &MockServer) -> Config {
    Config {
        provider_url: server.uri(),
        ..Config::test_default()
    }
}

/// Build a test app with an in-memory todo store.
pub fn build_test_app(config: Config) -> (axum::Router, Arc<AppState>) {
    let cookie_layer = Arc::new(CookieLayer {
        secret: config.session_secret.clone(),
        https_only: config.session_https_only,
        cookie_domain: config.cookie_domain.clone(),
    });

    let state = Arc::new(AppState {
        config,
        http_client: reqwest::Client::new(),
        todos: Arc::new(AnyStore::Memory(InMemoryStore::new())),
        cookie_layer,
    });

    let app = create_app(state.clone());
    (app, state)
}

/// A session that stays valid for the next hour.
pub fn live_session() -> StoredSession {
    StoredSession {
        access_token: ACCESS_TOKEN.into(),
        refresh_token: REFRESH_TOKEN.into(),
        expires_at: Some(now_secs() + 3600),
    }
}

/// A session whose access token has already expired.
pub fn expired_session() -> StoredSession {
    StoredSession {
        access_token: "at-expired".into(),
        refresh_token: REFRESH_TOKEN.into(),
        expires_at: Some(now_secs() - 60),
    }
}

/// `Cookie` header value carrying `session`, signed with the config secret.
pub fn session_cookie(config: &Config, session: &StoredSession) -> String {
    format!(
        "{}={}",
        COOKIE_NAME,
        encode_session(config.session_secret.as_bytes(), session)
    )
}

/// Build a request carrying a session cookie.
pub fn request_with_session(
    method: &str,
    uri: &str,
    config: &Config,
    session: &StoredSession,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Cookie", session_cookie(config, session))
        .body(Body::empty())
        .unwrap()
}

/// POST a JSON body without a content type, the way the login pages do.
pub fn json_post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Provider user body for `GET /user`.
pub fn user_json(id: &str, email: &str) -> Value {
    json!({
        "id": id,
        "aud": "authenticated",
        "role": "authenticated",
        "email": email,
        "app_metadata": {},
        "user_metadata": {}
    })
}

/// Token grant body as returned by `/token` and `/verify`.
pub fn grant_json(access_token: &str, refresh_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": refresh_token,
        "user": user_json(USER_ID, USER_EMAIL)
    })
}

/// Mount `GET /user` answering for `access_token`.
pub async fn mount_user(server: &MockServer, access_token: &str, id: &str, email: &str) {
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", format!("Bearer {access_token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(id, email)))
        .mount(server)
        .await;
}

/// Extract the session cookie value from the first matching `Set-Cookie`.
pub fn set_cookie(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|s| s.starts_with(&format!("{COOKIE_NAME}=")))
        .map(String::from)
}

/// Helper to read response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
