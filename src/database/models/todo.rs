use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type TodoId = u64;
pub type UserId = u64;

/// A live to-do record as seen by the service layer.
///
/// `id` and `owner_id` are assigned at creation and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub owner_id: UserId,
    pub title: String,
    pub content: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a record about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub owner_id: UserId,
    pub title: String,
    pub content: String,
    pub done: bool,
}

/// The mutable subset of a record. Identity fields are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: String,
    pub content: String,
    pub done: bool,
}

/// Live row of the `todos` table. `deleted_at` is only ever filtered on, so
/// it is not selected.
#[derive(Debug, Clone, FromRow)]
pub struct TodoRow {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub content: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        // BIGSERIAL ids and owner ids written from u64 are never negative
        Self {
            id: row.id as u64,
            owner_id: row.owner_id as u64,
            title: row.title,
            content: row.content,
            done: row.done,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
