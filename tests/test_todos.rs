//! Integration tests for the todo pages and form actions.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    ACCESS_TOKEN, USER_EMAIL, USER_ID, body_json, build_test_app, config_for, live_session,
    mount_user, request_with_session, session_cookie,
};
use todo_gate::config::Config;
use todo_gate::session::StoredSession;
use todo_gate::todo::TodoStore;
use tower::ServiceExt;
use wiremock::MockServer;

const OTHER_TOKEN: &str = "at-other";
const OTHER_ID: &str = "user-2";

/// Provider with two signed-up users.
async fn provider() -> MockServer {
    let server = MockServer::start().await;
    mount_user(&server, ACCESS_TOKEN, USER_ID, USER_EMAIL).await;
    mount_user(&server, OTHER_TOKEN, OTHER_ID, "other@b.com").await;
    server
}

fn other_session() -> StoredSession {
    StoredSession {
        access_token: OTHER_TOKEN.into(),
        ..live_session()
    }
}

fn form_post(config: &Config, session: &StoredSession, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/todos")
        .header("Cookie", session_cookie(config, session))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ───── GET /todos ─────

#[tokio::test]
async fn test_list_empty_with_user() {
    let server = provider().await;
    let config = config_for(&server);
    let (app, _state) = build_test_app(config.clone());

    let req = request_with_session("GET", "/todos", &config, &live_session());
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["todos"].as_array().unwrap().len(), 0);
    assert_eq!(body["user"]["id"], USER_ID);
    assert_eq!(body["user"]["email"], USER_EMAIL);
}

#[tokio::test]
async fn test_list_is_newest_first_and_shared() {
    let server = provider().await;
    let config = config_for(&server);
    let (app, state) = build_test_app(config.clone());

    state.todos.create("first", USER_ID).await.unwrap();
    state.todos.create("second", OTHER_ID).await.unwrap();
    state.todos.create("third", USER_ID).await.unwrap();

    let req = request_with_session("GET", "/todos", &config, &live_session());
    let resp = app.oneshot(req).await.unwrap();

    let body = body_json(resp).await;
    let texts: Vec<&str> = body["todos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["third", "second", "first"]);
}

// ───── GET /todos/{id} ─────

#[tokio::test]
async fn test_get_todo_camel_case() {
    let server = provider().await;
    let config = config_for(&server);
    let (app, state) = build_test_app(config.clone());

    let todo = state.todos.create("Buy milk", USER_ID).await.unwrap();

    let uri = format!("/todos/{}", todo.id);
    let req = request_with_session("GET", &uri, &config, &live_session());
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["id"], todo.id.as_str());
    assert_eq!(body["text"], "Buy milk");
    assert_eq!(body["completed"], false);
    assert_eq!(body["ownerId"], USER_ID);
    assert!(body["createdAt"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_get_missing_todo() {
    let server = provider().await;
    let config = config_for(&server);
    let (app, _state) = build_test_app(config.clone());

    let req = request_with_session("GET", "/todos/nope", &config, &live_session());
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Todo with id nope not found");
}

// ───── POST /todos ─────

#[tokio::test]
async fn test_create_redirects_and_stores() {
    let server = provider().await;
    let config = config_for(&server);
    let (app, state) = build_test_app(config.clone());

    let req = form_post(&config, &live_session(), "intent=create&text=Buy+milk");
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/todos");

    let todos = state.todos.list().await.unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].text, "Buy milk");
    assert_eq!(todos[0].owner_id, USER_ID);
    assert!(!todos[0].completed);
}

#[tokio::test]
async fn test_toggle_twice_restores() {
    let server = provider().await;
    let config = config_for(&server);
    let (app, state) = build_test_app(config.clone());

    let todo = state.todos.create("walk", USER_ID).await.unwrap();
    let body = format!("intent=toggle&id={}", todo.id);

    let resp = app
        .clone()
        .oneshot(form_post(&config, &live_session(), &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(state.todos.get(&todo.id).await.unwrap().completed);

    let resp = app
        .oneshot(form_post(&config, &live_session(), &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(!state.todos.get(&todo.id).await.unwrap().completed);
}

#[tokio::test]
async fn test_delete_then_get_is_404() {
    let server = provider().await;
    let config = config_for(&server);
    let (app, state) = build_test_app(config.clone());

    let todo = state.todos.create("gone soon", USER_ID).await.unwrap();

    let body = format!("intent=delete&id={}", todo.id);
    let resp = app
        .clone()
        .oneshot(form_post(&config, &live_session(), &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let uri = format!("/todos/{}", todo.id);
    let req = request_with_session("GET", &uri, &config, &live_session());
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_foreign_todo_is_forbidden() {
    let server = provider().await;
    let config = config_for(&server);
    let (app, state) = build_test_app(config.clone());

    let todo = state.todos.create("mine", USER_ID).await.unwrap();

    for intent in ["toggle", "delete"] {
        let body = format!("intent={intent}&id={}", todo.id);
        let resp = app
            .clone()
            .oneshot(form_post(&config, &other_session(), &body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{intent}");
    }

    let stored = state.todos.get(&todo.id).await.unwrap();
    assert!(!stored.completed);
}

#[tokio::test]
async fn test_invalid_form_inputs() {
    let server = provider().await;
    let config = config_for(&server);
    let (app, state) = build_test_app(config.clone());

    let cases = [
        ("intent=archive&id=x", "Invalid intent"),
        ("text=no+intent", "Invalid intent"),
        ("intent=create", "Invalid text"),
        ("intent=create&text=", "Invalid text"),
        ("intent=create&text=+++", "Invalid text"),
        ("intent=toggle", "Invalid id"),
        ("intent=delete&id=", "Invalid id"),
    ];

    for (body, expected) in cases {
        let resp = app
            .clone()
            .oneshot(form_post(&config, &live_session(), body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        let json = body_json(resp).await;
        assert_eq!(json["error"], expected, "{body}");
    }

    assert!(state.todos.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_toggle_unknown_id() {
    let server = provider().await;
    let config = config_for(&server);
    let (app, _state) = build_test_app(config.clone());

    let resp = app
        .oneshot(form_post(&config, &live_session(), "intent=toggle&id=missing"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Todo with id missing not found");
}

#[tokio::test]
async fn test_non_form_body_is_json_400() {
    let server = provider().await;
    let config = config_for(&server);
    let (app, state) = build_test_app(config.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/todos")
        .header("Cookie", session_cookie(&config, &live_session()))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"intent":"create","text":"Buy milk"}"#))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["error"].is_string());
    assert!(state.todos.list().await.unwrap().is_empty());
}
