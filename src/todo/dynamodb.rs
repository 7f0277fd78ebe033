//! DynamoDB todo store for production/Lambda deployments.
//!
//! Table schema:
//! - `id` (S): partition key
//! - `text` (S)
//! - `completed` (BOOL)
//! - `created_at` (N): Unix milliseconds
//! - `owner_id` (S)
//!
//! Every operation touches a single item; conditional writes stand in for
//! transactions.

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

use super::{StoreError, Todo, TodoStore, ensure_owner, new_todo};

type Item = HashMap<String, AttributeValue>;

/// DynamoDB todo store.
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
}

impl DynamoDbStore {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    fn key(id: &str) -> AttributeValue {
        AttributeValue::S(id.to_string())
    }
}

fn to_item(todo: &Todo) -> Item {
    HashMap::from([
        ("id".to_string(), AttributeValue::S(todo.id.clone())),
        ("text".to_string(), AttributeValue::S(todo.text.clone())),
        ("completed".to_string(), AttributeValue::Bool(todo.completed)),
        (
            "created_at".to_string(),
            AttributeValue::N(todo.created_at.to_string()),
        ),
        ("owner_id".to_string(), AttributeValue::S(todo.owner_id.clone())),
    ])
}

fn from_item(item: &Item) -> Option<Todo> {
    Some(Todo {
        id: item.get("id")?.as_s().ok()?.clone(),
        text: item.get("text")?.as_s().ok()?.clone(),
        completed: item
            .get("completed")
            .and_then(|v| v.as_bool().ok())
            .copied()
            .unwrap_or(false),
        created_at: item
            .get("created_at")
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse::<u64>().ok())
            .unwrap_or(0),
        owner_id: item.get("owner_id")?.as_s().ok()?.clone(),
    })
}

fn persistence<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Persistence(e.to_string())
}

impl TodoStore for DynamoDbStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let mut todos = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let page = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(persistence)?;

            for item in page.items() {
                match from_item(item) {
                    Some(todo) => todos.push(todo),
                    None => tracing::warn!("Skipping malformed todo item in {}", self.table_name),
                }
            }

            match page.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        todos.sort_by(|a, b| (b.created_at, &b.id).cmp(&(a.created_at, &a.id)));
        Ok(todos)
    }

    async fn get(&self, id: &str) -> Result<Todo, StoreError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", Self::key(id))
            .consistent_read(true)
            .send()
            .await
            .map_err(persistence)?;

        result
            .item()
            .and_then(from_item)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn create(&self, text: &str, owner_id: &str) -> Result<Todo, StoreError> {
        let todo = new_todo(text, owner_id)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(&todo)))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to create todo {}: {}", todo.id, e);
                persistence(e)
            })?;

        Ok(todo)
    }

    async fn toggle(&self, id: &str, owner_id: &str) -> Result<Todo, StoreError> {
        let mut todo = self.get(id).await?;
        ensure_owner(&todo, owner_id)?;
        todo.completed = !todo.completed;

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("id", Self::key(id))
            .update_expression("SET completed = :completed")
            .condition_expression("attribute_exists(id) AND owner_id = :owner")
            .expression_attribute_values(":completed", AttributeValue::Bool(todo.completed))
            .expression_attribute_values(":owner", AttributeValue::S(owner_id.to_string()))
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    StoreError::NotFound(id.to_string())
                } else {
                    tracing::error!("Failed to update todo {}: {}", id, service_error);
                    persistence(service_error)
                }
            })?;

        Ok(todo)
    }

    async fn delete(&self, id: &str, owner_id: &str) -> Result<(), StoreError> {
        let todo = self.get(id).await?;
        ensure_owner(&todo, owner_id)?;

        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("id", Self::key(id))
            .condition_expression("owner_id = :owner")
            .expression_attribute_values(":owner", AttributeValue::S(owner_id.to_string()))
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_conditional_check_failed_exception() {
                    StoreError::NotFound(id.to_string())
                } else {
                    tracing::error!("Failed to delete todo {}: {}", id, service_error);
                    persistence(service_error)
                }
            })?;

        Ok(())
    }
}
