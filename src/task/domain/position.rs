//! Column coordinates: partitions, order values, and task slots.

use super::{BoardId, OrderingError, TaskStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based rank of a task within its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskOrder(u32);

impl TaskOrder {
    /// First position in a column.
    pub const ZERO: Self = Self(0);

    /// Largest order representable in the `PostgreSQL` `INTEGER` column.
    pub const MAX_PERSISTED_VALUE: u32 = i32::MAX as u32;

    /// Creates a validated order value.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::OrderOutOfRange`] when the value exceeds
    /// [`Self::MAX_PERSISTED_VALUE`].
    pub const fn new(value: u32) -> Result<Self, OrderingError> {
        if value > Self::MAX_PERSISTED_VALUE {
            return Err(OrderingError::OrderOutOfRange(value as i64));
        }
        Ok(Self(value))
    }

    /// Converts a column length or slice index into an order value.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::OrderOutOfRange`] when the index cannot be
    /// persisted.
    pub fn from_index(index: usize) -> Result<Self, OrderingError> {
        let value = u32::try_from(index)
            .map_err(|_| OrderingError::OrderOutOfRange(i64::try_from(index).unwrap_or(i64::MAX)))?;
        Self::new(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the order as a slice index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the position directly after this one.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::OrderOutOfRange`] when the column is full.
    pub const fn next(self) -> Result<Self, OrderingError> {
        Self::new(self.0.saturating_add(1))
    }

    /// Returns the position directly before this one, or `None` at zero.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self.0.checked_sub(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl fmt::Display for TaskOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The set of tasks sharing a board and a status; the unit of density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Partition {
    /// Owning board.
    pub board_id: BoardId,
    /// Column within the board.
    pub status: TaskStatus,
}

impl Partition {
    /// Creates a partition reference.
    #[must_use]
    pub const fn new(board_id: BoardId, status: TaskStatus) -> Self {
        Self { board_id, status }
    }

    /// Returns the slot at `order` within this partition.
    #[must_use]
    pub const fn slot(self, order: TaskOrder) -> Slot {
        Slot {
            partition: self,
            order,
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.board_id, self.status)
    }
}

/// A concrete position: a partition plus an order within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    /// Column the slot belongs to.
    pub partition: Partition,
    /// Rank within the column.
    pub order: TaskOrder,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.partition, self.order)
    }
}
