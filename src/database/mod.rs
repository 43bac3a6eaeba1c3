pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;

use async_trait::async_trait;
use thiserror::Error;

pub use manager::{close, connect, health_check, migrate};
pub use memory::{InMemoryTodoStore, MutationFault};
pub use models::{NewTodo, Todo, TodoChanges, TodoId, UserId};
pub use repository::PgTodoStore;

/// Errors raised by a [`TodoStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Identifier out of range: {0}")]
    IdOutOfRange(u64),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Durable storage for to-do records.
///
/// Soft-deleted rows are invisible to every method. The `_owned` operations
/// only touch a row when both its id and its owner match, and report how many
/// rows they affected so callers can tell "no such row for this owner" apart
/// from success.
#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError>;

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Todo>, StoreError>;

    async fn exists_owned(&self, id: TodoId, owner_id: UserId) -> Result<bool, StoreError>;

    async fn update_owned(
        &self,
        id: TodoId,
        owner_id: UserId,
        changes: &TodoChanges,
    ) -> Result<u64, StoreError>;

    async fn delete_owned(&self, id: TodoId, owner_id: UserId) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
