//! Todo Gate: session-gated todo app backed by a GoTrue-compatible auth
//! provider.
//!
//! Same Axum router runs in both Lambda and local dev contexts.
//! Detection via `AWS_LAMBDA_RUNTIME_API` env var.

pub mod config;
pub mod error;
pub mod middleware;
pub mod ocsf;
pub mod provider;
pub mod routes;
pub mod session;
pub mod todo;
pub mod types;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::session::middleware::{CookieLayer, cookie_bridge_middleware};
use crate::todo::AnyStore;

/// Shared application state available to all route handlers.
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub todos: Arc<AnyStore>,
    pub cookie_layer: Arc<CookieLayer>,
}

/// Build the Axum router with all middleware and routes.
///
/// Outermost first: trace, secure headers, trailing-slash redirect, cookie
/// bridge, access gate. Unmatched paths fall through to the renderer.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cookie_layer = state.cookie_layer.clone();

    let auth_routes = Router::new()
        .route("/signup", post(routes::signup::signup))
        .route("/login", post(routes::login::login))
        .route("/logout", post(routes::logout::logout))
        .route(
            "/forgot-password",
            post(routes::forgot_password::forgot_password),
        )
        .route(
            "/update-password",
            post(routes::update_password::update_password),
        )
        .route("/confirm", get(routes::confirm::confirm));

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/public", get(routes::public::public))
        .route(
            "/todos",
            get(routes::todos::list_todos).post(routes::todos::todo_action),
        )
        .route("/todos/{id}", get(routes::todos::get_todo))
        .nest("/auth", auth_routes)
        .fallback(routes::render::render)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::gate::access_gate,
        ))
        .layer(from_fn(move |req, next| {
            let layer = cookie_layer.clone();
            cookie_bridge_middleware(layer, req, next)
        }))
        .layer(from_fn(middleware::trailing_slash::trim_trailing_slash))
        .layer(from_fn(middleware::secure_headers::secure_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
