//! Service layer for task creation, deletion, and column moves.
//!
//! Every mutating operation runs as a single [`TaskStore::transact`] unit:
//! the task is re-read under the board lock, the [`ColumnIndex`] computes the
//! sibling shifts, and the shifts plus the primary write are applied before
//! the unit commits.

use super::{
    config::TaskBoardConfig,
    error::{TaskLifecycleError, TaskLifecycleResult},
};
use crate::task::{
    domain::{
        BoardId, ColumnIndex, NewTask, OwnerId, Partition, Reassignment, ShiftPlan, Task, TaskId,
        TaskOrder, TaskStatus, TaskTitle, normalize_description,
    },
    ports::{BoardDirectory, TaskStore, TaskTransaction},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Request payload for creating a task at the end of a board's `todo` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    board_id: BoardId,
    owner_id: OwnerId,
    title: String,
    description: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(board_id: BoardId, owner_id: OwnerId, title: impl Into<String>) -> Self {
        Self {
            board_id,
            owner_id,
            title: title.into(),
            description: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Request payload for moving a task to a column and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTaskRequest {
    task_id: TaskId,
    owner_id: OwnerId,
    new_status: String,
    new_order: i64,
}

impl MoveTaskRequest {
    /// Creates a move request.
    ///
    /// `new_status` is parsed when the request is handled; `new_order` is
    /// resolved against the target column by the configured
    /// [`PositionPolicy`](super::PositionPolicy).
    #[must_use]
    pub fn new(
        task_id: TaskId,
        owner_id: OwnerId,
        new_status: impl Into<String>,
        new_order: i64,
    ) -> Self {
        Self {
            task_id,
            owner_id,
            new_status: new_status.into(),
            new_order,
        }
    }
}

/// Confirmation returned by a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDeletion {
    /// The removed task as it was stored.
    pub task: Task,
    /// Number of siblings whose order closed the gap.
    pub siblings_shifted: u64,
}

/// Repairs applied to one column by the reconciliation sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRepair {
    /// Column that was not dense.
    pub partition: Partition,
    /// Order rewrites applied to the column.
    pub reassignments: Vec<Reassignment>,
}

/// Outcome of a reconciliation sweep over one board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Columns that needed repair, in board column order.
    pub repaired: Vec<PartitionRepair>,
}

impl ReconcileReport {
    /// Returns `true` when every column was already dense.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.repaired.is_empty()
    }

    /// Returns the total number of tasks whose order was rewritten.
    #[must_use]
    pub fn tasks_rewritten(&self) -> usize {
        self.repaired
            .iter()
            .map(|repair| repair.reassignments.len())
            .sum()
    }
}

/// Task lifecycle orchestration service.
pub struct TaskLifecycleService<S, B, C>
where
    S: TaskStore,
    B: BoardDirectory,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    boards: Arc<B>,
    clock: Arc<C>,
    config: TaskBoardConfig,
}

impl<S, B, C> Clone for TaskLifecycleService<S, B, C>
where
    S: TaskStore,
    B: BoardDirectory,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            boards: Arc::clone(&self.boards),
            clock: Arc::clone(&self.clock),
            config: self.config,
        }
    }
}

impl<S, B, C> TaskLifecycleService<S, B, C>
where
    S: TaskStore,
    B: BoardDirectory,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new service with the default configuration.
    #[must_use]
    pub fn new(store: Arc<S>, boards: Arc<B>, clock: Arc<C>) -> Self {
        Self {
            store,
            boards,
            clock,
            config: TaskBoardConfig::default(),
        }
    }

    /// Replaces the service configuration.
    #[must_use]
    pub fn with_config(mut self, config: TaskBoardConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &TaskBoardConfig {
        &self.config
    }

    async fn ensure_board(&self, board_id: BoardId, owner_id: OwnerId) -> TaskLifecycleResult<()> {
        if self.boards.exists(board_id, owner_id).await? {
            return Ok(());
        }
        debug!(%board_id, %owner_id, "board missing or not owned by caller");
        Err(TaskLifecycleError::BoardNotFound(board_id))
    }

    async fn locate(&self, task_id: TaskId, owner_id: OwnerId) -> TaskLifecycleResult<Task> {
        if let Some(task) = self.store.find_one(task_id, owner_id).await? {
            return Ok(task);
        }
        debug!(%task_id, %owner_id, "task missing or not owned by caller");
        Err(TaskLifecycleError::TaskNotFound(task_id))
    }

    /// Creates a task at the end of the board's `todo` column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for invalid text fields,
    /// [`TaskLifecycleError::BoardNotFound`] when the caller does not own the
    /// board, or store errors.
    #[instrument(skip_all, fields(board_id = %request.board_id, owner_id = %request.owner_id))]
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let title = TaskTitle::new(request.title, self.config.max_title_length)?;
        let description =
            normalize_description(request.description, self.config.max_description_length)?;
        self.ensure_board(request.board_id, request.owner_id).await?;

        let fields = NewTask {
            board_id: request.board_id,
            owner_id: request.owner_id,
            title,
            description,
        };
        let clock = Arc::clone(&self.clock);
        let task = self
            .store
            .transact(request.board_id, move |tx| -> TaskLifecycleResult<Task> {
                let partition = Partition::new(fields.board_id, TaskStatus::Todo);
                let order = match tx.max_order(partition)? {
                    Some(max) => max.next()?,
                    None => TaskOrder::ZERO,
                };
                let task = Task::new(fields, order, &*clock);
                tx.insert(&task)?;
                Ok(task)
            })
            .await?;

        info!(task_id = %task.id(), order = %task.order(), "task created");
        Ok(task)
    }

    /// Deletes a task and closes the gap it leaves in its column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] when the caller does not
    /// own the task, or store errors.
    #[instrument(skip_all, fields(%task_id, %owner_id))]
    pub async fn delete_task(
        &self,
        task_id: TaskId,
        owner_id: OwnerId,
    ) -> TaskLifecycleResult<TaskDeletion> {
        let located = self.locate(task_id, owner_id).await?;
        let clock = Arc::clone(&self.clock);
        let deletion = self
            .store
            .transact(located.board_id(), move |tx| -> TaskLifecycleResult<TaskDeletion> {
                let task = tx
                    .find_one(task_id, owner_id)?
                    .ok_or(TaskLifecycleError::TaskNotFound(task_id))?;
                let len = occupied_len(tx.count(task.partition())?, task.order());
                let plan = ColumnIndex::removal(task.partition(), task.order(), len)?;

                let removed = tx.delete(task.id())?;
                let siblings_shifted = apply_plan(tx, &plan, clock.utc())?;
                Ok(TaskDeletion {
                    task: removed,
                    siblings_shifted,
                })
            })
            .await?;

        info!(
            slot = %deletion.task.slot(),
            siblings_shifted = deletion.siblings_shifted,
            "task deleted"
        );
        Ok(deletion)
    }

    /// Moves a task to `new_status` at `new_order`, shifting siblings in the
    /// source and target columns.
    ///
    /// Moving a task onto its current slot writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::InvalidStatus`] for unknown columns,
    /// [`TaskLifecycleError::TaskNotFound`] when the caller does not own the
    /// task, [`TaskLifecycleError::InvalidPosition`] when the strict position
    /// policy rejects `new_order`, or store errors.
    #[instrument(
        skip_all,
        fields(
            task_id = %request.task_id,
            new_status = %request.new_status,
            new_order = request.new_order
        )
    )]
    pub async fn move_task(&self, request: MoveTaskRequest) -> TaskLifecycleResult<Task> {
        let new_status = TaskStatus::try_from(request.new_status.as_str())?;
        let MoveTaskRequest {
            task_id,
            owner_id,
            new_order,
            ..
        } = request;
        let located = self.locate(task_id, owner_id).await?;

        let clock = Arc::clone(&self.clock);
        let policy = self.config.position_policy;
        let moved = self
            .store
            .transact(located.board_id(), move |tx| -> TaskLifecycleResult<Task> {
                let mut task = tx
                    .find_one(task_id, owner_id)?
                    .ok_or(TaskLifecycleError::TaskNotFound(task_id))?;
                let from = task.slot();
                let target = Partition::new(task.board_id(), new_status);
                let from_len = occupied_len(tx.count(from.partition)?, from.order);

                let to_len = if target == from.partition {
                    from_len
                } else {
                    tx.count(target)?
                };
                // Within its own column a task can reach the last slot; another
                // column also accepts one slot past its end.
                let max = if target == from.partition {
                    to_len.saturating_sub(1)
                } else {
                    to_len
                };
                let to = target.slot(policy.resolve(
                    target,
                    new_order,
                    u32::try_from(max).unwrap_or(u32::MAX),
                )?);

                if to == from {
                    debug!(slot = %from, "task already in place");
                    return Ok(task);
                }

                let plan = ColumnIndex::relocation(from, to, from_len, to_len)?;
                apply_plan(tx, &plan, clock.utc())?;
                task.relocate(to, &*clock)?;
                tx.update(&task)?;
                Ok(task)
            })
            .await?;

        info!(from = %located.slot(), to = %moved.slot(), "task moved");
        Ok(moved)
    }

    /// Lists every task on a board, sorted by column then order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::BoardNotFound`] when the caller does not
    /// own the board, or store errors.
    #[instrument(skip_all, fields(%board_id, %owner_id))]
    pub async fn list_tasks(
        &self,
        board_id: BoardId,
        owner_id: OwnerId,
    ) -> TaskLifecycleResult<Vec<Task>> {
        self.ensure_board(board_id, owner_id).await?;
        Ok(self.store.find_by_board(board_id).await?)
    }

    /// Rewrites every column of a board to its dense rank.
    ///
    /// Repairs columns left with gaps or duplicates by an interrupted writer.
    /// Ties are broken by creation time, then id. Dense columns are left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::BoardNotFound`] when the caller does not
    /// own the board, or store errors.
    #[instrument(skip_all, fields(%board_id, %owner_id))]
    pub async fn reconcile_board(
        &self,
        board_id: BoardId,
        owner_id: OwnerId,
    ) -> TaskLifecycleResult<ReconcileReport> {
        self.ensure_board(board_id, owner_id).await?;
        let clock = Arc::clone(&self.clock);
        let report = self
            .store
            .transact(board_id, move |tx| -> TaskLifecycleResult<ReconcileReport> {
                let now = clock.utc();
                let mut report = ReconcileReport::default();
                for status in TaskStatus::ALL {
                    let partition = Partition::new(board_id, status);
                    if let Some(repair) = reconcile_partition(tx, partition, now)? {
                        report.repaired.push(repair);
                    }
                }
                Ok(report)
            })
            .await?;

        for repair in &report.repaired {
            warn!(
                partition = %repair.partition,
                rewritten = repair.reassignments.len(),
                "column order repaired"
            );
        }
        Ok(report)
    }
}

/// Column length used to validate positions in the task's own column.
///
/// A column left sparse by an interrupted writer may hold a task whose order
/// is at or past the row count; the task is still allowed to leave it.
fn occupied_len(count: usize, order: TaskOrder) -> usize {
    count.max(order.index().saturating_add(1))
}

fn apply_plan(
    tx: &mut dyn TaskTransaction,
    plan: &ShiftPlan,
    at: DateTime<Utc>,
) -> TaskLifecycleResult<u64> {
    let mut shifted = 0_u64;
    for shift in plan {
        let affected = tx.bulk_shift(shift, at)?;
        debug!(
            partition = %shift.partition,
            start = %shift.range.start(),
            delta = shift.delta.value(),
            affected,
            "siblings shifted"
        );
        shifted = shifted.saturating_add(affected);
    }
    Ok(shifted)
}

fn reconcile_partition(
    tx: &mut dyn TaskTransaction,
    partition: Partition,
    at: DateTime<Utc>,
) -> TaskLifecycleResult<Option<PartitionRepair>> {
    let tasks = tx.find_by_partition(partition)?;
    let reassignments = ColumnIndex::reconciliation(&tasks)?;
    if reassignments.is_empty() {
        return Ok(None);
    }

    let mut by_id: HashMap<TaskId, Task> =
        tasks.into_iter().map(|task| (task.id(), task)).collect();
    for reassignment in &reassignments {
        if let Some(task) = by_id.get_mut(&reassignment.task_id) {
            task.reassign_order(reassignment.to, at);
            tx.update(task)?;
        }
    }
    Ok(Some(PartitionRepair {
        partition,
        reassignments,
    }))
}
