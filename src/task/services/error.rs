//! Service-level errors and their client-facing categories.

use crate::task::{
    domain::{BoardId, OrderingError, ParseTaskStatusError, TaskDomainError, TaskId},
    ports::{BoardDirectoryError, TaskStoreError},
};
use thiserror::Error;

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Column ordering failed.
    ///
    /// Only [`OrderingError::InvalidPosition`] is caused by the request; the
    /// other variants describe stored orders the column cannot extend.
    #[error(transparent)]
    InvalidPosition(#[from] OrderingError),
    /// The target status is not a known column.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),
    /// The task does not exist or is not owned by the caller.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),
    /// The board does not exist or is not owned by the caller.
    #[error("board {0} not found")]
    BoardNotFound(BoardId),
    /// Task store operation failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
    /// Board ownership lookup failed.
    #[error(transparent)]
    Board(#[from] BoardDirectoryError),
}

/// Client-facing failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// The addressed task or board is absent or not owned by the caller.
    NotFound,
    /// The request itself is malformed or out of range.
    InvalidRequest,
    /// Persistence failed; not retried here.
    StoreUnavailable,
}

impl FailureCategory {
    /// Returns the HTTP status code an API layer should answer with.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::InvalidRequest => 400,
            Self::StoreUnavailable => 500,
        }
    }
}

impl TaskLifecycleError {
    /// Classifies the error for the API layer.
    #[must_use]
    pub const fn category(&self) -> FailureCategory {
        match self {
            Self::TaskNotFound(_)
            | Self::BoardNotFound(_)
            | Self::Store(TaskStoreError::NotFound(_)) => FailureCategory::NotFound,
            Self::Domain(_)
            | Self::InvalidPosition(OrderingError::InvalidPosition { .. })
            | Self::InvalidStatus(_) => FailureCategory::InvalidRequest,
            Self::InvalidPosition(
                OrderingError::EmptyColumn(_) | OrderingError::OrderOutOfRange(_),
            )
            | Self::Store(_)
            | Self::Board(_) => FailureCategory::StoreUnavailable,
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;
