//! Application services for task lifecycle orchestration.

mod config;
mod error;
mod lifecycle;

pub use config::{PositionPolicy, TaskBoardConfig};
pub use error::{FailureCategory, TaskLifecycleError, TaskLifecycleResult};
pub use lifecycle::{
    CreateTaskRequest, MoveTaskRequest, PartitionRepair, ReconcileReport, TaskDeletion,
    TaskLifecycleService,
};
