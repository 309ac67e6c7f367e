//! `PostgreSQL` board ownership directory.

use super::{schema::boards, store::TaskPgPool};
use crate::task::{
    domain::{BoardId, OwnerId},
    ports::{BoardDirectory, BoardDirectoryError, BoardDirectoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;

/// Board ownership lookups against the `boards` table.
#[derive(Debug, Clone)]
pub struct PostgresBoardDirectory {
    pool: TaskPgPool,
}

impl PostgresBoardDirectory {
    /// Creates a new directory from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BoardDirectory for PostgresBoardDirectory {
    async fn exists(&self, board_id: BoardId, owner_id: OwnerId) -> BoardDirectoryResult<bool> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(BoardDirectoryError::persistence)?;
            diesel::select(diesel::dsl::exists(
                boards::table
                    .filter(boards::id.eq(board_id.into_inner()))
                    .filter(boards::owner_id.eq(owner_id.into_inner())),
            ))
            .get_result::<bool>(&mut connection)
            .map_err(BoardDirectoryError::persistence)
        })
        .await
        .map_err(BoardDirectoryError::persistence)?
    }
}
