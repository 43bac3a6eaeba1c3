//! Wire shapes of the to-do API.
//!
//! Request bodies decode leniently: absent or `null` fields take their zero
//! value, keys match case-insensitively, and unknown fields are ignored (see
//! [`JsonBody`](super::JsonBody)). The update body has no owner field, so a client
//! has no way to even express a change of ownership.

use serde::{Deserialize, Serialize};

use crate::database::{Todo, TodoChanges, TodoId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

/// Body of `POST /todos`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CreateTodoInput {
    pub title: String,
    pub content: String,
}

/// Body of `PUT /todos`. `id` selects the record; it is never written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdateTodoInput {
    pub id: TodoId,
    pub title: String,
    pub content: String,
    pub done: bool,
}

impl UpdateTodoInput {
    pub fn into_changes(self) -> (TodoId, TodoChanges) {
        (
            self.id,
            TodoChanges {
                title: self.title,
                content: self.content,
                done: self.done,
            },
        )
    }
}

/// A to-do as returned by `GET /todos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoResponse {
    pub id: TodoId,
    pub title: String,
    pub content: String,
    pub done: bool,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            content: todo.content,
            done: todo.done,
        }
    }
}
