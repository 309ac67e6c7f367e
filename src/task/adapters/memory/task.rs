//! In-memory task store for tests and single-process embedding.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{BoardId, OwnerId, Partition, Shift, Task, TaskId, TaskOrder},
    ports::{TaskStore, TaskStoreError, TaskStoreResult, TaskTransaction},
};

/// Thread-safe in-memory task store.
///
/// Every unit of work holds the store-wide write lock for its whole duration
/// and runs against a working copy of all tasks that replaces the committed
/// state only on success. Units on different boards therefore run one at a
/// time here rather than in parallel.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a task exactly as given, bypassing column maintenance.
    ///
    /// Used to load snapshots, including ones whose columns are not dense.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lock is poisoned.
    pub fn restore(&self, task: Task) -> TaskStoreResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        state.tasks.insert(task.id(), task);
        Ok(())
    }
}

/// Collects tasks sorted by status column, order, creation time, and id.
fn sorted<'a>(tasks: impl Iterator<Item = &'a Task>) -> Vec<Task> {
    let mut collected: Vec<Task> = tasks.cloned().collect();
    collected.sort_by(|left, right| {
        left.status()
            .cmp(&right.status())
            .then_with(|| left.order().cmp(&right.order()))
            .then_with(|| left.created_at().cmp(&right.created_at()))
            .then_with(|| left.id().cmp(&right.id()))
    });
    collected
}

fn find_owned(tasks: &HashMap<TaskId, Task>, id: TaskId, owner_id: OwnerId) -> Option<Task> {
    tasks
        .get(&id)
        .filter(|task| task.owner_id() == owner_id)
        .cloned()
}

fn in_partition(
    tasks: &HashMap<TaskId, Task>,
    partition: Partition,
) -> impl Iterator<Item = &Task> {
    tasks
        .values()
        .filter(move |task| task.partition() == partition)
}

/// Unit of work over a working copy of the task map.
struct InMemoryTransaction<'a> {
    tasks: &'a mut HashMap<TaskId, Task>,
}

impl TaskTransaction for InMemoryTransaction<'_> {
    fn find_one(&mut self, id: TaskId, owner_id: OwnerId) -> TaskStoreResult<Option<Task>> {
        Ok(find_owned(self.tasks, id, owner_id))
    }

    fn find_by_partition(&mut self, partition: Partition) -> TaskStoreResult<Vec<Task>> {
        Ok(sorted(in_partition(self.tasks, partition)))
    }

    fn count(&mut self, partition: Partition) -> TaskStoreResult<usize> {
        Ok(in_partition(self.tasks, partition).count())
    }

    fn max_order(&mut self, partition: Partition) -> TaskStoreResult<Option<TaskOrder>> {
        Ok(in_partition(self.tasks, partition).map(Task::order).max())
    }

    fn insert(&mut self, task: &Task) -> TaskStoreResult<()> {
        if self.tasks.contains_key(&task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }
        self.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    fn update(&mut self, task: &Task) -> TaskStoreResult<()> {
        let stored = self
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskStoreError::NotFound(task.id()))?;
        *stored = task.clone();
        Ok(())
    }

    fn delete(&mut self, id: TaskId) -> TaskStoreResult<Task> {
        self.tasks.remove(&id).ok_or(TaskStoreError::NotFound(id))
    }

    fn bulk_shift(&mut self, shift: &Shift, at: DateTime<Utc>) -> TaskStoreResult<u64> {
        let mut shifted = 0_u64;
        for task in self.tasks.values_mut() {
            if !shift.matches(task.slot()) {
                continue;
            }
            if !task.shift_order(shift.delta, at) {
                return Err(TaskStoreError::persistence(std::io::Error::other(format!(
                    "shifting task {} leaves the persistable order range",
                    task.id()
                ))));
            }
            shifted += 1;
        }
        Ok(shifted)
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn find_one(&self, id: TaskId, owner_id: OwnerId) -> TaskStoreResult<Option<Task>> {
        let state = self.state.read().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(find_owned(&state.tasks, id, owner_id))
    }

    async fn find_by_partition(&self, partition: Partition) -> TaskStoreResult<Vec<Task>> {
        let state = self.state.read().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(sorted(in_partition(&state.tasks, partition)))
    }

    async fn find_by_board(&self, board_id: BoardId) -> TaskStoreResult<Vec<Task>> {
        let state = self.state.read().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(sorted(
            state
                .tasks
                .values()
                .filter(|task| task.board_id() == board_id),
        ))
    }

    async fn transact<F, T, E>(&self, _board_id: BoardId, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskStoreError> + Send + 'static,
    {
        let mut state = self.state.write().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;

        let mut working = state.tasks.clone();
        let mut unit = InMemoryTransaction {
            tasks: &mut working,
        };
        let unit_ref: &mut dyn TaskTransaction = &mut unit;
        let outcome = work(unit_ref);
        if outcome.is_ok() {
            state.tasks = working;
        }
        outcome
    }
}
