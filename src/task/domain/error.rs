//! Error types for task domain validation, parsing, and column ordering.

use super::{Partition, TaskId};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the configured length.
    #[error("task title is {actual} characters, limit is {max}")]
    TitleTooLong {
        /// Configured character limit.
        max: usize,
        /// Length of the rejected title.
        actual: usize,
    },

    /// The task description exceeds the configured length.
    #[error("task description is {actual} characters, limit is {max}")]
    DescriptionTooLong {
        /// Configured character limit.
        max: usize,
        /// Length of the rejected description.
        actual: usize,
    },

    /// A task was asked to leave the board it belongs to.
    #[error("task {task_id} cannot move to another board")]
    CrossBoardMove {
        /// Task that was being relocated.
        task_id: TaskId,
    },
}

/// Error returned while parsing task statuses from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Errors raised by the column index maintainer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderingError {
    /// The requested position lies outside the valid range for the column.
    #[error("position {requested} is outside 0..={max} for column {partition}")]
    InvalidPosition {
        /// Column the position was requested in.
        partition: Partition,
        /// Requested position as supplied by the caller.
        requested: i64,
        /// Largest valid position for the operation.
        max: u32,
    },

    /// The requested position refers to an empty column where no task can sit.
    #[error("column {0} holds no task to remove or move")]
    EmptyColumn(Partition),

    /// An order value cannot be represented by the persisted schema.
    #[error("order value {0} cannot be persisted")]
    OrderOutOfRange(i64),
}
