pub mod todo;

pub use todo::{NewTodo, Todo, TodoChanges, TodoId, TodoRow, UserId};
