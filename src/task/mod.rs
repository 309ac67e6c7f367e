//! Board task lifecycle and column ordering.
//!
//! Tasks are created at the end of a board's `todo` column, deleted, and
//! moved within or across status columns while every `(board, status)`
//! column keeps a dense zero-based order. The module follows hexagonal
//! architecture:
//!
//! - Domain types and the column index maintainer in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
