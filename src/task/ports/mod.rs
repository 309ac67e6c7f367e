//! Port contracts for task persistence and board ownership.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod board;
pub mod store;

pub use board::{BoardDirectory, BoardDirectoryError, BoardDirectoryResult};
pub use store::{TaskStore, TaskStoreError, TaskStoreResult, TaskTransaction};

#[cfg(test)]
pub use board::MockBoardDirectory;
