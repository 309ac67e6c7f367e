//! In-memory board ownership directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{BoardId, OwnerId},
    ports::{BoardDirectory, BoardDirectoryError, BoardDirectoryResult},
};

/// Thread-safe in-memory map of boards to their owners.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoardDirectory {
    owners: Arc<RwLock<HashMap<BoardId, OwnerId>>>,
}

impl InMemoryBoardDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `owner_id` as the owner of `board_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDirectoryError::Persistence`] when the lock is poisoned.
    pub fn register(&self, board_id: BoardId, owner_id: OwnerId) -> BoardDirectoryResult<()> {
        let mut owners = self.owners.write().map_err(|err| {
            BoardDirectoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        owners.insert(board_id, owner_id);
        Ok(())
    }
}

#[async_trait]
impl BoardDirectory for InMemoryBoardDirectory {
    async fn exists(&self, board_id: BoardId, owner_id: OwnerId) -> BoardDirectoryResult<bool> {
        let owners = self.owners.read().map_err(|err| {
            BoardDirectoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(owners.get(&board_id) == Some(&owner_id))
    }
}
