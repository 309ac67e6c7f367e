//! Domain model for board tasks and their column ordering.
//!
//! Tasks live in `(board, status)` partitions and carry a dense zero-based
//! `order` within their partition. The [`ColumnIndex`] computes the sibling
//! shifts that keep each partition dense; persistence stays outside the
//! domain boundary.

mod column_index;
mod error;
mod ids;
mod position;
mod status;
mod task;

pub use column_index::{ColumnIndex, OrderRange, Reassignment, Shift, ShiftDelta, ShiftPlan};
pub use error::{OrderingError, ParseTaskStatusError, TaskDomainError};
pub use ids::{BoardId, OwnerId, TaskId};
pub use position::{Partition, Slot, TaskOrder};
pub use status::TaskStatus;
pub use task::{NewTask, PersistedTaskData, Task, TaskTitle, normalize_description};
