//! Trailing-slash normalization.
//!
//! `GET /todos/` answers with a permanent redirect to `/todos` so every page
//! has one canonical URL and prefix checks see a single form.

use axum::extract::Request;
use axum::http::{Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Axum middleware redirecting `GET`/`HEAD` paths that end in `/`.
pub async fn trim_trailing_slash(req: Request, next: Next) -> Response {
    match canonical_location(req.method(), req.uri()) {
        Some(location) => {
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
        }
        None => next.run(req).await,
    }
}

fn canonical_location(method: &Method, uri: &axum::http::Uri) -> Option<String> {
    if method != Method::GET && method != Method::HEAD {
        return None;
    }

    let path = uri.path();
    if path == "/" || !path.ends_with('/') {
        return None;
    }

    let trimmed = match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    };

    Some(match uri.query() {
        Some(query) => format!("{trimmed}?{query}"),
        None => trimmed.to_string(),
    })
}
