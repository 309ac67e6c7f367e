//! Task aggregate root and its validated text fields.

use super::{
    BoardId, OwnerId, Partition, ShiftDelta, Slot, TaskDomainError, TaskId, TaskOrder, TaskStatus,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Trimmed, non-empty task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a validated title no longer than `max_length` characters.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the trimmed value is empty
    /// and [`TaskDomainError::TitleTooLong`] when it exceeds `max_length`.
    pub fn new(value: impl Into<String>, max_length: usize) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let actual = trimmed.chars().count();
        if actual > max_length {
            return Err(TaskDomainError::TitleTooLong {
                max: max_length,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Trims an optional description, treating blank text as absent.
///
/// # Errors
///
/// Returns [`TaskDomainError::DescriptionTooLong`] when the trimmed text
/// exceeds `max_length` characters.
pub fn normalize_description(
    value: Option<String>,
    max_length: usize,
) -> Result<Option<String>, TaskDomainError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let actual = trimmed.chars().count();
    if actual > max_length {
        return Err(TaskDomainError::DescriptionTooLong {
            max: max_length,
            actual,
        });
    }
    Ok(Some(trimmed.to_owned()))
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    board_id: BoardId,
    owner_id: OwnerId,
    title: TaskTitle,
    description: Option<String>,
    status: TaskStatus,
    order: TaskOrder,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning board.
    pub board_id: BoardId,
    /// Creator and owner.
    pub owner_id: OwnerId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted status column.
    pub status: TaskStatus,
    /// Persisted rank within the column.
    pub order: TaskOrder,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Board the task is added to.
    pub board_id: BoardId,
    /// Creator and owner.
    pub owner_id: OwnerId,
    /// Validated title.
    pub title: TaskTitle,
    /// Normalized description.
    pub description: Option<String>,
}

impl Task {
    /// Creates a task in the `todo` column at `order`.
    #[must_use]
    pub fn new(fields: NewTask, order: TaskOrder, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            board_id: fields.board_id,
            owner_id: fields.owner_id,
            title: fields.title,
            description: fields.description,
            status: TaskStatus::Todo,
            order,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            board_id: data.board_id,
            owner_id: data.owner_id,
            title: data.title,
            description: data.description,
            status: data.status,
            order: data.order,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the task owner.
    #[must_use]
    pub const fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the status column.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the rank within the status column.
    #[must_use]
    pub const fn order(&self) -> TaskOrder {
        self.order
    }

    /// Returns the `(board, status)` partition the task sits in.
    #[must_use]
    pub const fn partition(&self) -> Partition {
        Partition::new(self.board_id, self.status)
    }

    /// Returns the task's current slot.
    #[must_use]
    pub const fn slot(&self) -> Slot {
        self.partition().slot(self.order)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Places the task at `slot`, updating its status and order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::CrossBoardMove`] when `slot` belongs to a
    /// different board.
    pub fn relocate(&mut self, slot: Slot, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if slot.partition.board_id != self.board_id {
            return Err(TaskDomainError::CrossBoardMove { task_id: self.id });
        }
        self.status = slot.partition.status;
        self.order = slot.order;
        self.touch(clock);
        Ok(())
    }

    /// Applies a sibling shift to this task's order.
    ///
    /// Returns `false`, leaving the task untouched, when the shifted order
    /// would leave the persistable range.
    pub(crate) fn shift_order(&mut self, delta: ShiftDelta, at: DateTime<Utc>) -> bool {
        let Some(order) = delta.apply(self.order) else {
            return false;
        };
        self.order = order;
        self.updated_at = at;
        true
    }

    /// Overwrites the order during reconciliation.
    pub(crate) fn reassign_order(&mut self, order: TaskOrder, at: DateTime<Utc>) {
        self.order = order;
        self.updated_at = at;
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
