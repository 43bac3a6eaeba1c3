// handlers/mod.rs
//
// Public:    GET /health
// Protected: /todos (JWT required, enforced by middleware in routes.rs)

pub mod health;
pub mod todos;

pub use health::health;
