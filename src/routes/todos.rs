//! GET /todos, GET /todos/{id}, POST /todos

use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::Json;
use std::sync::Arc;

use super::FormBody;
use crate::error::AppError;
use crate::middleware::gate::CurrentUser;
use crate::todo::{Todo, TodoStore};
use crate::types::{TodoForm, TodoListResponse};

const TODOS_PATH: &str = "/todos";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Create,
    Toggle,
    Delete,
}

impl Intent {
    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw? {
            "create" => Some(Intent::Create),
            "toggle" => Some(Intent::Toggle),
            "delete" => Some(Intent::Delete),
            _ => None,
        }
    }
}

/// Todo list page data. Guests see the list with `user: null`.
pub async fn list_todos(
    State(state): State<Arc<crate::AppState>>,
    user: Option<CurrentUser>,
) -> Result<Json<TodoListResponse>, AppError> {
    let todos = state.todos.list().await?;
    Ok(Json(TodoListResponse {
        todos,
        user: user.map(|CurrentUser(u)| u),
    }))
}

/// A single todo.
pub async fn get_todo(
    State(state): State<Arc<crate::AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, AppError> {
    Ok(Json(state.todos.get(&id).await?))
}

/// Form action: create, toggle or delete, then back to the list.
pub async fn todo_action(
    State(state): State<Arc<crate::AppState>>,
    CurrentUser(user): CurrentUser,
    FormBody(form): FormBody<TodoForm>,
) -> Result<Redirect, AppError> {
    let intent = Intent::parse(form.intent.as_deref())
        .ok_or_else(|| AppError::InvalidInput("Invalid intent".into()))?;

    match intent {
        Intent::Create => {
            let text = form
                .text
                .as_deref()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| AppError::InvalidInput("Invalid text".into()))?;
            let todo = state.todos.create(text, &user.id).await?;
            tracing::info!(todo_id = %todo.id, user_id = %user.id, "todo created");
        }
        Intent::Toggle => {
            let id = required_id(&form)?;
            let todo = state.todos.toggle(id, &user.id).await?;
            tracing::info!(todo_id = %todo.id, completed = todo.completed, "todo toggled");
        }
        Intent::Delete => {
            let id = required_id(&form)?;
            state.todos.delete(id, &user.id).await?;
            tracing::info!(todo_id = %id, user_id = %user.id, "todo deleted");
        }
    }

    Ok(Redirect::to(TODOS_PATH))
}

fn required_id(form: &TodoForm) -> Result<&str, AppError> {
    form.id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Invalid id".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_parse() {
        assert_eq!(Intent::parse(Some("create")), Some(Intent::Create));
        assert_eq!(Intent::parse(Some("toggle")), Some(Intent::Toggle));
        assert_eq!(Intent::parse(Some("delete")), Some(Intent::Delete));
        assert_eq!(Intent::parse(Some("archive")), None);
        assert_eq!(Intent::parse(Some("")), None);
        assert_eq!(Intent::parse(None), None);
    }

    #[test]
    fn test_required_id() {
        let form = TodoForm {
            id: Some("t-1".into()),
            ..Default::default()
        };
        assert_eq!(required_id(&form).unwrap(), "t-1");

        let empty = TodoForm {
            id: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(required_id(&empty), Err(AppError::InvalidInput(_))));
        assert!(required_id(&TodoForm::default()).is_err());
    }
}
