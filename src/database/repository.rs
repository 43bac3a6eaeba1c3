use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::models::{NewTodo, Todo, TodoChanges, TodoId, TodoRow, UserId};
use super::{StoreError, TodoStore};

const SELECT_COLUMNS: &str = "id, owner_id, title, content, done, created_at, updated_at";

/// PostgreSQL-backed [`TodoStore`] over the `todos` table.
#[derive(Clone)]
pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// BIGINT columns cannot hold the upper half of u64. Ids in that range can
/// never have been issued, so callers treat them as "no such row".
fn to_db_id(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let owner_id = to_db_id(todo.owner_id).ok_or(StoreError::IdOutOfRange(todo.owner_id))?;

        let sql = format!(
            "INSERT INTO todos (owner_id, title, content, done) VALUES ($1, $2, $3, $4) RETURNING {}",
            SELECT_COLUMNS
        );
        let row: TodoRow = sqlx::query_as(&sql)
            .bind(owner_id)
            .bind(&todo.title)
            .bind(&todo.content)
            .bind(todo.done)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Todo>, StoreError> {
        let Some(owner_id) = to_db_id(owner_id) else {
            return Ok(Vec::new());
        };

        let sql = format!(
            "SELECT {} FROM todos WHERE owner_id = $1 AND deleted_at IS NULL ORDER BY id",
            SELECT_COLUMNS
        );
        let rows: Vec<TodoRow> = sqlx::query_as(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        debug!("Loaded {} todos for owner {}", rows.len(), owner_id);
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn exists_owned(&self, id: TodoId, owner_id: UserId) -> Result<bool, StoreError> {
        let (Some(id), Some(owner_id)) = (to_db_id(id), to_db_id(owner_id)) else {
            return Ok(false);
        };

        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM todos WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    async fn update_owned(
        &self,
        id: TodoId,
        owner_id: UserId,
        changes: &TodoChanges,
    ) -> Result<u64, StoreError> {
        let (Some(id), Some(owner_id)) = (to_db_id(id), to_db_id(owner_id)) else {
            return Ok(0);
        };

        let result = sqlx::query(
            r#"
            UPDATE todos
            SET title = $3, content = $4, done = $5, updated_at = now()
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(changes.done)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_owned(&self, id: TodoId, owner_id: UserId) -> Result<u64, StoreError> {
        let (Some(id), Some(owner_id)) = (to_db_id(id), to_db_id(owner_id)) else {
            return Ok(0);
        };

        let result = sqlx::query(
            r#"
            UPDATE todos
            SET deleted_at = now()
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        super::manager::health_check(&self.pool).await
    }
}
