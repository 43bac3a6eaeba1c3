// handlers/todos.rs - /todos route handlers
//
// Identity is already resolved by the auth middleware. Mutations follow the
// check-then-act flow: ownership is checked first, then the owner-conditional
// store operation runs. A record that vanished in between surfaces as 403,
// the same as a record owned by someone else.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::api::{parse_todo_id, CreateTodoInput, JsonBody, TodoResponse, UpdateTodoInput};
use crate::database::{StoreError, TodoId};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::TodoService;

const NOT_OWNER: &str = "you are not the owner of this todo";

/// GET /todos - List the caller's to-dos
pub async fn list(
    State(service): State<TodoService>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<TodoResponse>>, ApiError> {
    let todos = service
        .get_todos_by_owner(user.user_id)
        .await
        .map_err(|e| ApiError::internal("error while fetching todos", e))?;

    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

/// POST /todos - Create a to-do owned by the caller
pub async fn create(
    State(service): State<TodoService>,
    Extension(user): Extension<AuthUser>,
    JsonBody(input): JsonBody<CreateTodoInput>,
) -> Result<StatusCode, ApiError> {
    service
        .create_todo(user.user_id, input.title, input.content)
        .await
        .map_err(|e| ApiError::internal("error while creating todo", e))?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /todos - Replace title, content and done of an owned to-do
pub async fn update(
    State(service): State<TodoService>,
    Extension(user): Extension<AuthUser>,
    JsonBody(input): JsonBody<UpdateTodoInput>,
) -> Result<StatusCode, ApiError> {
    let (id, changes) = input.into_changes();
    ensure_owner(&service, id, user).await?;

    match service.update_todo_by_id(id, user.user_id, changes).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound(_)) => Err(not_owner(id, user)),
        Err(e) => Err(ApiError::internal("error while updating todo", e)),
    }
}

/// DELETE /todos/:id - Delete an owned to-do
pub async fn delete(
    State(service): State<TodoService>,
    Extension(user): Extension<AuthUser>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_todo_id(&raw_id)?;
    ensure_owner(&service, id, user).await?;

    match service.delete_todo_by_id(id, user.user_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound(_)) => Err(not_owner(id, user)),
        Err(e) => Err(ApiError::internal("error while deleting todo", e)),
    }
}

async fn ensure_owner(service: &TodoService, id: TodoId, user: AuthUser) -> Result<(), ApiError> {
    let is_owner = service
        .is_owner(id, user.user_id)
        .await
        .map_err(|e| ApiError::internal("error while checking ownership", e))?;

    if !is_owner {
        return Err(not_owner(id, user));
    }
    Ok(())
}

fn not_owner(id: TodoId, user: AuthUser) -> ApiError {
    tracing::warn!("User {} denied access to todo {}", user.user_id, id);
    ApiError::forbidden(NOT_OWNER)
}
