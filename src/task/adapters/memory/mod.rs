//! In-memory adapters for tests and embedding.

mod board;
mod task;

pub use board::InMemoryBoardDirectory;
pub use task::InMemoryTaskStore;
