//! Application configuration via environment variables.
//!
//! Loaded once at startup and shared read-only through `AppState`.

use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider_url: String,
    pub provider_publishable_key: String,
    pub session_secret: String,
    pub session_https_only: bool,
    pub cookie_domain: Option<String>,
    pub port: u16,
    pub protected_routes: Vec<String>,
    pub signup_redirect_path: String,
    pub password_reset_redirect_path: String,
    pub todo_backend: String,
    pub dynamodb_table: String,
    pub dynamodb_endpoint: Option<String>,
    pub renderer_url: Option<String>,
}

const DEFAULT_PROTECTED_ROUTES: &str = "/dashboard,/protected,/todos";

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required: `PROVIDER_URL`, `PROVIDER_PUBLISHABLE_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            provider_url: required_env("PROVIDER_URL")?,
            provider_publishable_key: required_env("PROVIDER_PUBLISHABLE_KEY")?,
            session_secret: env::var("SESSION_SECRET")
                .unwrap_or_else(|_| "change-me-in-production".into()),
            session_https_only: env::var("SESSION_HTTPS_ONLY")
                .map(|v| v == "true" || v == "1" || v == "True")
                .unwrap_or(false),
            cookie_domain: optional_env("COOKIE_DOMAIN"),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3001),
            protected_routes: parse_routes(
                &env::var("PROTECTED_ROUTES").unwrap_or_else(|_| DEFAULT_PROTECTED_ROUTES.into()),
            ),
            signup_redirect_path: env::var("SIGNUP_REDIRECT_PATH")
                .unwrap_or_else(|_| "/protected".into()),
            password_reset_redirect_path: env::var("PASSWORD_RESET_REDIRECT_PATH")
                .unwrap_or_else(|_| "/update-password".into()),
            todo_backend: env::var("TODO_BACKEND").unwrap_or_else(|_| "memory".into()),
            dynamodb_table: env::var("DYNAMODB_TABLE").unwrap_or_else(|_| "todos".into()),
            dynamodb_endpoint: optional_env("DYNAMODB_ENDPOINT"),
            renderer_url: optional_env("RENDERER_URL"),
        })
    }

    /// Root of the provider's auth REST API.
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.provider_url.trim_end_matches('/'))
    }
}

/// Configuration for testing; all fields settable directly.
impl Config {
    pub fn test_default() -> Self {
        Self {
            provider_url: "http://127.0.0.1:54321".into(),
            provider_publishable_key: "test-publishable-key".into(),
            session_secret: "test-secret-key".into(),
            session_https_only: false,
            cookie_domain: None,
            port: 3001,
            protected_routes: parse_routes(DEFAULT_PROTECTED_ROUTES),
            signup_redirect_path: "/protected".into(),
            password_reset_redirect_path: "/update-password".into(),
            todo_backend: "memory".into(),
            dynamodb_table: "todos".into(),
            dynamodb_endpoint: None,
            renderer_url: None,
        }
    }
}

/// Split a comma-separated prefix list into normalized `/prefix` entries.
pub fn parse_routes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|r| r.trim().trim_end_matches('/'))
        .filter(|r| !r.is_empty())
        .map(|r| {
            if r.starts_with('/') {
                r.to_string()
            } else {
                format!("/{r}")
            }
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnv(String),
}

fn required_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnv(key.into()))
}

/// An unset or empty variable both read as `None`.
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
