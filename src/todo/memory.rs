//! In-memory todo store for development and testing.
//!
//! Uses `DashMap` for concurrent access without external locks.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{StoreError, Todo, TodoStore, ensure_owner, new_todo};

/// In-memory todo store.
///
/// Not suitable for production: todos are lost on restart and not
/// shared across processes. Use the DynamoDB store for production.
pub struct InMemoryStore {
    /// Each todo is stored with its insertion sequence, used to order
    /// records created within the same millisecond.
    store: DashMap<String, (Todo, u64)>,
    next_seq: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Number of todos currently stored.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStore for InMemoryStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let mut entries: Vec<(Todo, u64)> = self
            .store
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        entries.sort_by(|(a, a_seq), (b, b_seq)| {
            (b.created_at, *b_seq).cmp(&(a.created_at, *a_seq))
        });

        Ok(entries.into_iter().map(|(todo, _)| todo).collect())
    }

    async fn get(&self, id: &str) -> Result<Todo, StoreError> {
        self.store
            .get(id)
            .map(|entry| entry.value().0.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn create(&self, text: &str, owner_id: &str) -> Result<Todo, StoreError> {
        let todo = new_todo(text, owner_id)?;
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.store.insert(todo.id.clone(), (todo.clone(), seq));
        Ok(todo)
    }

    async fn toggle(&self, id: &str, owner_id: &str) -> Result<Todo, StoreError> {
        let mut entry = self
            .store
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let (todo, _) = entry.value_mut();
        ensure_owner(todo, owner_id)?;
        todo.completed = !todo.completed;

        Ok(todo.clone())
    }

    async fn delete(&self, id: &str, owner_id: &str) -> Result<(), StoreError> {
        {
            let entry = self
                .store
                .get(id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            ensure_owner(&entry.value().0, owner_id)?;
        } // Release the read lock before removing

        self.store
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
