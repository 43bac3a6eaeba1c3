use std::sync::Arc;

use tracing::{debug, info};

use crate::database::{NewTodo, StoreError, Todo, TodoChanges, TodoId, TodoStore, UserId};

/// Ownership-enforcing access to the to-do store.
///
/// Every read is scoped to an owner and every mutation carries the owner in
/// its predicate, so a record is never visible to or changed by anyone but
/// the user who created it. Errors are returned raw; mapping them to HTTP is
/// the handlers' job.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// Create a to-do for `owner_id`. New records always start not done.
    pub async fn create_todo(
        &self,
        owner_id: UserId,
        title: String,
        content: String,
    ) -> Result<Todo, StoreError> {
        let todo = self
            .store
            .insert(NewTodo {
                owner_id,
                title,
                content,
                done: false,
            })
            .await?;

        info!("Created todo {} for owner {}", todo.id, owner_id);
        Ok(todo)
    }

    /// All live to-dos of `owner_id`, in store order.
    pub async fn get_todos_by_owner(&self, owner_id: UserId) -> Result<Vec<Todo>, StoreError> {
        let todos = self.store.find_by_owner(owner_id).await?;
        debug!("Owner {} has {} todos", owner_id, todos.len());
        Ok(todos)
    }

    /// True iff a live record with `todo_id` exists and belongs to `owner_id`.
    /// A missing record is `false`, not an error.
    pub async fn is_owner(&self, todo_id: TodoId, owner_id: UserId) -> Result<bool, StoreError> {
        self.store.exists_owned(todo_id, owner_id).await
    }

    /// Replace title, content and done of an owned record. `NotFound` when no
    /// live record matches both id and owner.
    pub async fn update_todo_by_id(
        &self,
        todo_id: TodoId,
        owner_id: UserId,
        changes: TodoChanges,
    ) -> Result<(), StoreError> {
        let affected = self.store.update_owned(todo_id, owner_id, &changes).await?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("todo {}", todo_id)));
        }

        info!("Updated todo {} for owner {}", todo_id, owner_id);
        Ok(())
    }

    /// Soft-delete an owned record. `NotFound` when no live record matches
    /// both id and owner.
    pub async fn delete_todo_by_id(&self, todo_id: TodoId, owner_id: UserId) -> Result<(), StoreError> {
        let affected = self.store.delete_owned(todo_id, owner_id).await?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("todo {}", todo_id)));
        }

        info!("Deleted todo {} for owner {}", todo_id, owner_id);
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}
