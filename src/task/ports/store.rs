//! Task store port.
//!
//! Mutations happen inside a unit of work obtained through
//! [`TaskStore::transact`]. The unit sees its own writes, is serialized
//! against every other unit on the same board, and is committed only when the
//! work closure returns `Ok`. The closure is synchronous, so a shift sequence
//! can never be suspended half-applied.

use crate::task::domain::{BoardId, OwnerId, Partition, Shift, Task, TaskId, TaskOrder};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Finds a task by id, filtered by owner in the same read.
    ///
    /// Returns `None` when the task does not exist or belongs to someone else.
    async fn find_one(&self, id: TaskId, owner_id: OwnerId) -> TaskStoreResult<Option<Task>>;

    /// Returns the tasks of one partition sorted by order ascending.
    async fn find_by_partition(&self, partition: Partition) -> TaskStoreResult<Vec<Task>>;

    /// Returns every task on a board sorted by status column, then order.
    async fn find_by_board(&self, board_id: BoardId) -> TaskStoreResult<Vec<Task>>;

    /// Runs `work` as one atomic unit scoped to `board_id`.
    ///
    /// Units on the same board are serialized; units on different boards
    /// may run in parallel. When `work` returns an error nothing it wrote is
    /// kept.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a [`TaskStoreError`]
    /// converted into `E` when the unit cannot be opened or committed.
    async fn transact<F, T, E>(&self, board_id: BoardId, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskStoreError> + Send + 'static;
}

/// Operations available inside a unit of work.
pub trait TaskTransaction {
    /// Finds a task by id and owner, locking it for the rest of the unit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] on storage failure.
    fn find_one(&mut self, id: TaskId, owner_id: OwnerId) -> TaskStoreResult<Option<Task>>;

    /// Returns the tasks of one partition sorted by order ascending.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] on storage failure.
    fn find_by_partition(&mut self, partition: Partition) -> TaskStoreResult<Vec<Task>>;

    /// Returns the number of tasks in a partition.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] on storage failure.
    fn count(&mut self, partition: Partition) -> TaskStoreResult<usize>;

    /// Returns the highest order in a partition, or `None` when it is empty.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] on storage failure.
    fn max_order(&mut self, partition: Partition) -> TaskStoreResult<Option<TaskOrder>>;

    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the id already exists.
    fn insert(&mut self, task: &Task) -> TaskStoreResult<()>;

    /// Persists the status, order, and timestamps of an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    fn update(&mut self, task: &Task) -> TaskStoreResult<()>;

    /// Removes a task and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    fn delete(&mut self, id: TaskId) -> TaskStoreResult<Task>;

    /// Applies `shift` to every matching task in its partition, stamping
    /// `updated_at` with `at`. Returns the number of tasks shifted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] on storage failure or when a
    /// shifted order would leave the persistable range.
    fn bulk_shift(&mut self, shift: &Shift, at: DateTime<Utc>) -> TaskStoreResult<u64>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
