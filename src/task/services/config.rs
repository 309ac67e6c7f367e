//! Configuration for task lifecycle operations.

use crate::task::domain::{OrderingError, Partition, TaskOrder};

/// How a requested target order outside the column's valid range is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionPolicy {
    /// Reject the request with [`OrderingError::InvalidPosition`].
    #[default]
    Strict,
    /// Snap the request to the nearest valid position.
    Clamp,
}

impl PositionPolicy {
    /// Resolves a caller-supplied order against the inclusive range
    /// `0..=max` of `partition`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::InvalidPosition`] under [`Self::Strict`] when
    /// `requested` falls outside the range.
    pub fn resolve(
        self,
        partition: Partition,
        requested: i64,
        max: u32,
    ) -> Result<TaskOrder, OrderingError> {
        let in_range = u32::try_from(requested)
            .ok()
            .filter(|value| *value <= max);
        let value = match (self, in_range) {
            (_, Some(value)) => value,
            (Self::Clamp, None) if requested < 0 => 0,
            (Self::Clamp, None) => max,
            (Self::Strict, None) => {
                return Err(OrderingError::InvalidPosition {
                    partition,
                    requested,
                    max,
                });
            }
        };
        TaskOrder::new(value)
    }
}

/// Configuration for the task lifecycle service.
///
/// # Examples
///
/// ```
/// use taskboard::task::services::{PositionPolicy, TaskBoardConfig};
///
/// let config = TaskBoardConfig::default();
/// assert_eq!(config.position_policy, PositionPolicy::Strict);
///
/// let lenient = TaskBoardConfig::lenient();
/// assert_eq!(lenient.position_policy, PositionPolicy::Clamp);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskBoardConfig {
    /// Handling of out-of-range move targets.
    pub position_policy: PositionPolicy,
    /// Maximum title length in characters.
    pub max_title_length: usize,
    /// Maximum description length in characters.
    pub max_description_length: usize,
}

impl Default for TaskBoardConfig {
    fn default() -> Self {
        Self {
            position_policy: PositionPolicy::Strict,
            max_title_length: 200,
            max_description_length: 5_000,
        }
    }
}

impl TaskBoardConfig {
    /// Creates a configuration that clamps out-of-range move targets.
    ///
    /// Suits drag-and-drop clients that may report a drop index past the
    /// end of a column.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            position_policy: PositionPolicy::Clamp,
            ..Default::default()
        }
    }
}
