pub mod dto;
pub mod extract;

pub use dto::{CreateTodoInput, ErrorBody, TodoResponse, UpdateTodoInput};
pub use extract::{parse_todo_id, JsonBody};
