//! Taskboard: ordered task columns for multi-user Kanban boards.
//!
//! This crate maintains the per-column ordering of board tasks across
//! create, delete, and move operations, keeping every column dense
//! (`0..n` with no gaps or duplicates).
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle, column index maintenance, and persistence

pub mod task;
