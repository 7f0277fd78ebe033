//! Todo persistence.
//!
//! Provides the `TodoStore` trait for pluggable storage, an in-memory
//! backend for development/testing and a DynamoDB backend for production.
//!
//! Ownership is enforced here, not in the route handlers: `toggle` and
//! `delete` compare the caller's id against the stored owner and refuse
//! with `StoreError::Forbidden` before touching the record.

pub mod dynamodb;
pub mod memory;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A todo record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
    /// Unix milliseconds.
    pub created_at: u64,
    pub owner_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Todo with id {0} not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Todo with id {0} belongs to another user")]
    Forbidden(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),
}

/// Pluggable todo storage backend.
///
/// Implementations must be `Send + Sync` for use in Axum's async handlers.
pub trait TodoStore: Send + Sync {
    /// All todos, newest `created_at` first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Todo>, StoreError>> + Send;

    /// Fetch one todo.
    fn get(&self, id: &str) -> impl std::future::Future<Output = Result<Todo, StoreError>> + Send;

    /// Create a todo owned by `owner_id`.
    fn create(
        &self,
        text: &str,
        owner_id: &str,
    ) -> impl std::future::Future<Output = Result<Todo, StoreError>> + Send;

    /// Flip `completed`. Only the owner may toggle.
    fn toggle(
        &self,
        id: &str,
        owner_id: &str,
    ) -> impl std::future::Future<Output = Result<Todo, StoreError>> + Send;

    /// Remove a todo. Only the owner may delete.
    fn delete(
        &self,
        id: &str,
        owner_id: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// Type-erased todo store supporting both InMemory and DynamoDB.
///
/// Since `TodoStore` uses RPITIT, it's not object-safe. This enum
/// dispatches manually instead.
pub enum AnyStore {
    Memory(memory::InMemoryStore),
    DynamoDb(dynamodb::DynamoDbStore),
}

impl AnyStore {
    /// Backend name reported by `/health`.
    pub fn backend_name(&self) -> &'static str {
        match self {
            AnyStore::Memory(_) => "memory",
            AnyStore::DynamoDb(_) => "dynamodb",
        }
    }
}

impl TodoStore for AnyStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        match self {
            AnyStore::Memory(s) => s.list().await,
            AnyStore::DynamoDb(s) => s.list().await,
        }
    }

    async fn get(&self, id: &str) -> Result<Todo, StoreError> {
        match self {
            AnyStore::Memory(s) => s.get(id).await,
            AnyStore::DynamoDb(s) => s.get(id).await,
        }
    }

    async fn create(&self, text: &str, owner_id: &str) -> Result<Todo, StoreError> {
        match self {
            AnyStore::Memory(s) => s.create(text, owner_id).await,
            AnyStore::DynamoDb(s) => s.create(text, owner_id).await,
        }
    }

    async fn toggle(&self, id: &str, owner_id: &str) -> Result<Todo, StoreError> {
        match self {
            AnyStore::Memory(s) => s.toggle(id, owner_id).await,
            AnyStore::DynamoDb(s) => s.toggle(id, owner_id).await,
        }
    }

    async fn delete(&self, id: &str, owner_id: &str) -> Result<(), StoreError> {
        match self {
            AnyStore::Memory(s) => s.delete(id, owner_id).await,
            AnyStore::DynamoDb(s) => s.delete(id, owner_id).await,
        }
    }
}

/// Build a fresh, not-yet-stored todo after validating its text.
fn new_todo(text: &str, owner_id: &str) -> Result<Todo, StoreError> {
    if text.trim().is_empty() {
        return Err(StoreError::InvalidInput("Invalid text".into()));
    }
    Ok(Todo {
        id: generate_todo_id(),
        text: text.to_string(),
        completed: false,
        created_at: now_millis(),
        owner_id: owner_id.to_string(),
    })
}

fn ensure_owner(todo: &Todo, owner_id: &str) -> Result<(), StoreError> {
    if todo.owner_id == owner_id {
        Ok(())
    } else {
        Err(StoreError::Forbidden(todo.id.clone()))
    }
}

fn generate_todo_id() -> String {
    use rand::Rng;
    let bytes: [u8; 16] = rand::thread_rng().r#gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_todo_defaults() {
        let todo = new_todo("Buy milk", "user-1").unwrap();
        assert_eq!(todo.text, "Buy milk");
        assert!(!todo.completed);
        assert_eq!(todo.owner_id, "user-1");
        assert!(todo.created_at > 0);
        assert_eq!(todo.id.len(), 22);
    }

    #[test]
    fn test_new_todo_rejects_blank_text() {
        assert!(matches!(new_todo("", "u"), Err(StoreError::InvalidInput(_))));
        assert!(matches!(new_todo("   ", "u"), Err(StoreError::InvalidInput(_))));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = generate_todo_id();
        let b = generate_todo_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_ensure_owner() {
        let todo = new_todo("x", "owner").unwrap();
        assert!(ensure_owner(&todo, "owner").is_ok());
        assert!(matches!(
            ensure_owner(&todo, "intruder"),
            Err(StoreError::Forbidden(_))
        ));
    }

    #[test]
    fn test_todo_serializes_camel_case() {
        let todo = Todo {
            id: "t-1".into(),
            text: "x".into(),
            completed: true,
            created_at: 42,
            owner_id: "u-1".into(),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["createdAt"], 42);
        assert_eq!(json["ownerId"], "u-1");
        assert_eq!(json["completed"], true);
    }
}
