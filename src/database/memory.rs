use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::models::{NewTodo, Todo, TodoChanges, TodoId, UserId};
use super::{StoreError, TodoStore};

/// In-process [`TodoStore`] with the same soft-delete semantics as the
/// PostgreSQL store. Used by the test suites.
///
/// Every trait call is counted, and the store can be switched into a failing
/// mode to exercise error paths.
#[derive(Debug, Default)]
pub struct InMemoryTodoStore {
    state: RwLock<MemoryState>,
    unavailable: AtomicBool,
    mutation_fault: RwLock<Option<MutationFault>>,
    calls: AtomicUsize,
}

/// Misbehaviour injected into `update_owned` and `delete_owned` only; reads
/// and ownership checks keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationFault {
    /// Mutations fail with [`StoreError::Unavailable`].
    Fail,
    /// Mutations affect no rows, as if the record vanished after the
    /// ownership check.
    Vanish,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: TodoId,
    rows: BTreeMap<TodoId, StoredTodo>,
}

#[derive(Debug, Clone)]
struct StoredTodo {
    todo: Todo,
    deleted_at: Option<DateTime<Utc>>,
}

impl StoredTodo {
    fn is_live_for(&self, owner_id: UserId) -> bool {
        self.deleted_at.is_none() && self.todo.owner_id == owner_id
    }
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Inject `fault` into subsequent mutations; `None` restores normal behaviour.
    pub async fn set_mutation_fault(&self, fault: Option<MutationFault>) {
        *self.mutation_fault.write().await = fault;
    }

    /// Number of [`TodoStore`] calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Look up a live record by id regardless of owner. Not part of the
    /// store contract; lets tests inspect state without going through it.
    pub async fn get(&self, id: TodoId) -> Option<Todo> {
        let state = self.state.read().await;
        state
            .rows
            .get(&id)
            .filter(|stored| stored.deleted_at.is_none())
            .map(|stored| stored.todo.clone())
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store switched off".to_string()));
        }
        Ok(())
    }

    /// Applies the injected mutation fault. `Ok(true)` means the mutation
    /// must report zero affected rows without touching state.
    async fn enter_mutation(&self) -> Result<bool, StoreError> {
        self.enter()?;
        match *self.mutation_fault.read().await {
            Some(MutationFault::Fail) => {
                Err(StoreError::Unavailable("in-memory mutations switched off".to_string()))
            }
            Some(MutationFault::Vanish) => Ok(true),
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        self.enter()?;
        let mut state = self.state.write().await;
        state.last_id += 1;

        let now = Utc::now();
        let created = Todo {
            id: state.last_id,
            owner_id: todo.owner_id,
            title: todo.title,
            content: todo.content,
            done: todo.done,
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(
            created.id,
            StoredTodo {
                todo: created.clone(),
                deleted_at: None,
            },
        );
        Ok(created)
    }

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Todo>, StoreError> {
        self.enter()?;
        let state = self.state.read().await;
        Ok(state
            .rows
            .values()
            .filter(|stored| stored.is_live_for(owner_id))
            .map(|stored| stored.todo.clone())
            .collect())
    }

    async fn exists_owned(&self, id: TodoId, owner_id: UserId) -> Result<bool, StoreError> {
        self.enter()?;
        let state = self.state.read().await;
        Ok(state
            .rows
            .get(&id)
            .is_some_and(|stored| stored.is_live_for(owner_id)))
    }

    async fn update_owned(
        &self,
        id: TodoId,
        owner_id: UserId,
        changes: &TodoChanges,
    ) -> Result<u64, StoreError> {
        if self.enter_mutation().await? {
            return Ok(0);
        }
        let mut state = self.state.write().await;
        match state.rows.get_mut(&id) {
            Some(stored) if stored.is_live_for(owner_id) => {
                stored.todo.title = changes.title.clone();
                stored.todo.content = changes.content.clone();
                stored.todo.done = changes.done;
                stored.todo.updated_at = Utc::now();
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_owned(&self, id: TodoId, owner_id: UserId) -> Result<u64, StoreError> {
        if self.enter_mutation().await? {
            return Ok(0);
        }
        let mut state = self.state.write().await;
        match state.rows.get_mut(&id) {
            Some(stored) if stored.is_live_for(owner_id) => {
                stored.deleted_at = Some(Utc::now());
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.enter()
    }
}
