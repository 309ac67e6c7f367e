//! Board ownership port.

use crate::task::domain::{BoardId, OwnerId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for board directory lookups.
pub type BoardDirectoryResult<T> = Result<T, BoardDirectoryError>;

/// Read-only view of board ownership.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardDirectory: Send + Sync {
    /// Returns whether `board_id` exists and belongs to `owner_id`.
    ///
    /// The check is a single conditional read filtered by both values.
    async fn exists(&self, board_id: BoardId, owner_id: OwnerId) -> BoardDirectoryResult<bool>;
}

/// Errors returned by board directory implementations.
#[derive(Debug, Clone, Error)]
pub enum BoardDirectoryError {
    /// Persistence-layer failure.
    #[error("board lookup failed: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BoardDirectoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
