//! `PostgreSQL` adapters for task persistence and board ownership.

mod board;
mod models;
mod schema;
mod store;

pub use board::PostgresBoardDirectory;
pub use store::{PostgresTaskStore, TaskPgPool};
