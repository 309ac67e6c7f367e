//! Column index maintainer.
//!
//! Computes the sibling order shifts that keep every partition dense
//! (`{0, 1, ..., n-1}`) when a task is inserted, removed, or relocated. The
//! maintainer owns no data: it works from partition lengths and order values
//! and returns range-based [`Shift`]s that a store applies as batched updates.

use super::{OrderingError, Partition, Slot, Task, TaskId, TaskOrder};
use std::cmp::Ordering;

/// Inclusive range of order values matched by a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderRange {
    start: TaskOrder,
    end: Option<TaskOrder>,
}

impl OrderRange {
    /// Matches every order greater than or equal to `start`.
    #[must_use]
    pub const fn at_or_above(start: TaskOrder) -> Self {
        Self { start, end: None }
    }

    /// Matches every order strictly greater than `order`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::OrderOutOfRange`] when `order` is the largest
    /// persistable value.
    pub const fn above(order: TaskOrder) -> Result<Self, OrderingError> {
        match order.next() {
            Ok(start) => Ok(Self::at_or_above(start)),
            Err(err) => Err(err),
        }
    }

    /// Matches every order in `start..=end`.
    #[must_use]
    pub const fn between(start: TaskOrder, end: TaskOrder) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Returns the smallest matched order.
    #[must_use]
    pub const fn start(self) -> TaskOrder {
        self.start
    }

    /// Returns the largest matched order, or `None` when unbounded.
    #[must_use]
    pub const fn end(self) -> Option<TaskOrder> {
        self.end
    }

    /// Returns whether `order` falls inside the range.
    #[must_use]
    pub const fn contains(self, order: TaskOrder) -> bool {
        let above_start = order.value() >= self.start.value();
        match self.end {
            Some(end) => above_start && order.value() <= end.value(),
            None => above_start,
        }
    }
}

/// Direction of a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftDelta {
    /// `order += 1`
    Increment,
    /// `order -= 1`
    Decrement,
}

impl ShiftDelta {
    /// Returns the signed delta applied to matched orders.
    #[must_use]
    pub const fn value(self) -> i32 {
        match self {
            Self::Increment => 1,
            Self::Decrement => -1,
        }
    }

    /// Applies the delta to a single order value.
    ///
    /// Returns `None` when the result would leave the persistable range.
    #[must_use]
    pub const fn apply(self, order: TaskOrder) -> Option<TaskOrder> {
        match self {
            Self::Increment => match order.next() {
                Ok(next) => Some(next),
                Err(_) => None,
            },
            Self::Decrement => order.previous(),
        }
    }
}

/// A `±1` adjustment of every order in a partition matching a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shift {
    /// Column the shift applies to.
    pub partition: Partition,
    /// Orders affected by the shift.
    pub range: OrderRange,
    /// Adjustment applied to each affected order.
    pub delta: ShiftDelta,
}

impl Shift {
    /// Returns whether a task sitting at `slot` is moved by this shift.
    #[must_use]
    pub fn matches(&self, slot: Slot) -> bool {
        self.partition == slot.partition && self.range.contains(slot.order)
    }
}

/// Ordered set of shifts restoring density after one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftPlan {
    shifts: Vec<Shift>,
}

impl ShiftPlan {
    /// Returns the shifts in application order.
    #[must_use]
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    /// Returns `true` when no sibling needs to move.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    /// Adds `shift` unless it cannot match any task in a column of `len`.
    fn push(&mut self, shift: Shift, len: usize) {
        if shift.range.start().index() < len {
            self.shifts.push(shift);
        }
    }

    fn extend(&mut self, other: Self) {
        self.shifts.extend(other.shifts);
    }
}

impl IntoIterator for ShiftPlan {
    type Item = Shift;
    type IntoIter = std::vec::IntoIter<Shift>;

    fn into_iter(self) -> Self::IntoIter {
        self.shifts.into_iter()
    }
}

impl<'a> IntoIterator for &'a ShiftPlan {
    type Item = &'a Shift;
    type IntoIter = std::slice::Iter<'a, Shift>;

    fn into_iter(self) -> Self::IntoIter {
        self.shifts.iter()
    }
}

/// New order assigned to a task by the reconciliation sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reassignment {
    /// Task whose order changes.
    pub task_id: TaskId,
    /// Order before the sweep.
    pub from: TaskOrder,
    /// Dense rank assigned by the sweep.
    pub to: TaskOrder,
}

/// Stateless calculator for partition order shifts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnIndex;

impl ColumnIndex {
    /// Shifts needed to insert a task at `position` in a column of `len` tasks.
    ///
    /// Every task at or above `position` moves up by one.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::InvalidPosition`] when `position > len`.
    pub fn insertion(
        partition: Partition,
        position: TaskOrder,
        len: usize,
    ) -> Result<ShiftPlan, OrderingError> {
        if position.index() > len {
            return Err(invalid_position(partition, position, clamp_to_u32(len)));
        }

        let mut plan = ShiftPlan::default();
        plan.push(
            Shift {
                partition,
                range: OrderRange::at_or_above(position),
                delta: ShiftDelta::Increment,
            },
            len,
        );
        Ok(plan)
    }

    /// Shifts needed after removing the task at `position` from a column that
    /// held `len` tasks before the removal.
    ///
    /// Every task above `position` moves down by one.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::EmptyColumn`] when `len` is zero and
    /// [`OrderingError::InvalidPosition`] when `position >= len`.
    pub fn removal(
        partition: Partition,
        position: TaskOrder,
        len: usize,
    ) -> Result<ShiftPlan, OrderingError> {
        let last = last_position(partition, len)?;
        if position > last {
            return Err(invalid_position(partition, position, last.value()));
        }

        let mut plan = ShiftPlan::default();
        plan.push(
            Shift {
                partition,
                range: OrderRange::above(position)?,
                delta: ShiftDelta::Decrement,
            },
            len,
        );
        Ok(plan)
    }

    /// Shifts needed to move a task from `from` to `to` inside one column of
    /// `len` tasks.
    ///
    /// Moving down the column pulls `(from, to]` up by one; moving up pushes
    /// `[to, from)` down by one. Equal positions need no shift.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::EmptyColumn`] for an empty column and
    /// [`OrderingError::InvalidPosition`] when either position is `>= len`.
    pub fn reorder(
        partition: Partition,
        from: TaskOrder,
        to: TaskOrder,
        len: usize,
    ) -> Result<ShiftPlan, OrderingError> {
        let last = last_position(partition, len)?;
        for position in [from, to] {
            if position > last {
                return Err(invalid_position(partition, position, last.value()));
            }
        }

        let mut plan = ShiftPlan::default();
        match from.cmp(&to) {
            Ordering::Less => plan.push(
                Shift {
                    partition,
                    range: OrderRange::between(from.next()?, to),
                    delta: ShiftDelta::Decrement,
                },
                len,
            ),
            Ordering::Greater => {
                if let Some(end) = from.previous() {
                    plan.push(
                        Shift {
                            partition,
                            range: OrderRange::between(to, end),
                            delta: ShiftDelta::Increment,
                        },
                        len,
                    );
                }
            }
            Ordering::Equal => {}
        }
        Ok(plan)
    }

    /// Shifts needed to move a task between two different columns.
    ///
    /// Treated as a removal from `from.partition` (holding `from_len` tasks)
    /// followed by an insertion into `to.partition` (holding `to_len` tasks).
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Self::removal`] and [`Self::insertion`].
    pub fn transfer(
        from: Slot,
        to: Slot,
        from_len: usize,
        to_len: usize,
    ) -> Result<ShiftPlan, OrderingError> {
        let mut plan = Self::removal(from.partition, from.order, from_len)?;
        plan.extend(Self::insertion(to.partition, to.order, to_len)?);
        Ok(plan)
    }

    /// Shifts needed to relocate a task, dispatching on whether the source
    /// and target columns coincide.
    ///
    /// `to_len` is ignored for moves within one column.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Self::reorder`] and [`Self::transfer`].
    pub fn relocation(
        from: Slot,
        to: Slot,
        from_len: usize,
        to_len: usize,
    ) -> Result<ShiftPlan, OrderingError> {
        if from.partition == to.partition {
            Self::reorder(from.partition, from.order, to.order, from_len)
        } else {
            Self::transfer(from, to, from_len, to_len)
        }
    }

    /// Returns whether `orders` is exactly `{0, 1, ..., n-1}`.
    #[must_use]
    pub fn is_dense(orders: impl IntoIterator<Item = TaskOrder>) -> bool {
        let mut values: Vec<u32> = orders.into_iter().map(TaskOrder::value).collect();
        values.sort_unstable();
        values
            .iter()
            .enumerate()
            .all(|(rank, value)| u32::try_from(rank).is_ok_and(|expected| expected == *value))
    }

    /// Dense ranks for the tasks of one partition.
    ///
    /// Tasks are ranked by current order, then creation time, then id. Only
    /// tasks whose order changes are returned.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::OrderOutOfRange`] when the partition holds
    /// more tasks than an order can represent.
    pub fn reconciliation(tasks: &[Task]) -> Result<Vec<Reassignment>, OrderingError> {
        let mut ranked: Vec<&Task> = tasks.iter().collect();
        ranked.sort_by(|left, right| {
            left.order()
                .cmp(&right.order())
                .then_with(|| left.created_at().cmp(&right.created_at()))
                .then_with(|| left.id().cmp(&right.id()))
        });

        let mut reassignments = Vec::new();
        for (rank, task) in ranked.into_iter().enumerate() {
            let dense = TaskOrder::from_index(rank)?;
            if task.order() != dense {
                reassignments.push(Reassignment {
                    task_id: task.id(),
                    from: task.order(),
                    to: dense,
                });
            }
        }
        Ok(reassignments)
    }
}

fn last_position(partition: Partition, len: usize) -> Result<TaskOrder, OrderingError> {
    let last = len
        .checked_sub(1)
        .ok_or(OrderingError::EmptyColumn(partition))?;
    TaskOrder::from_index(last)
}

fn invalid_position(partition: Partition, position: TaskOrder, max: u32) -> OrderingError {
    OrderingError::InvalidPosition {
        partition,
        requested: i64::from(position.value()),
        max,
    }
}

fn clamp_to_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
