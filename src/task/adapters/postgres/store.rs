//! `PostgreSQL` task store.
//!
//! Each unit of work runs in one database transaction that starts by taking
//! a transaction-scoped advisory lock keyed on the board. Units on the same
//! board therefore serialize, and the lock is released on commit or rollback.

use super::{
    models::{NewTaskRow, TaskPlacementChangeset, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{
        BoardId, OwnerId, Partition, PersistedTaskData, Shift, Task, TaskId, TaskOrder,
        TaskStatus, TaskTitle,
    },
    ports::{TaskStore, TaskStoreError, TaskStoreResult, TaskTransaction},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Titles are bounded by service configuration, not by the schema.
const UNBOUNDED_TITLE_LENGTH: usize = usize::MAX;

/// `PostgreSQL`-backed task store.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }
}

/// Error raised inside a Diesel transaction closure.
enum UnitError<E> {
    Database(DieselError),
    Work(E),
}

impl<E> From<DieselError> for UnitError<E> {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

impl<E: From<TaskStoreError>> UnitError<E> {
    fn into_caller(self) -> E {
        match self {
            Self::Database(err) => E::from(TaskStoreError::persistence(err)),
            Self::Work(err) => err,
        }
    }
}

/// Unit of work bound to an open transaction.
struct PgTaskTransaction<'a> {
    connection: &'a mut PgConnection,
}

impl TaskTransaction for PgTaskTransaction<'_> {
    fn find_one(&mut self, id: TaskId, owner_id: OwnerId) -> TaskStoreResult<Option<Task>> {
        let rows = tasks::table
            .filter(tasks::id.eq(id.into_inner()))
            .filter(tasks::owner_id.eq(owner_id.into_inner()))
            .select(TaskRow::as_select())
            .for_update()
            .load::<TaskRow>(self.connection)
            .map_err(TaskStoreError::persistence)?;
        rows.into_iter().next().map(row_to_task).transpose()
    }

    fn find_by_partition(&mut self, partition: Partition) -> TaskStoreResult<Vec<Task>> {
        load_partition(self.connection, partition)
    }

    fn count(&mut self, partition: Partition) -> TaskStoreResult<usize> {
        let total: i64 = tasks::table
            .filter(tasks::board_id.eq(partition.board_id.into_inner()))
            .filter(tasks::status.eq(partition.status.as_str()))
            .count()
            .get_result(self.connection)
            .map_err(TaskStoreError::persistence)?;
        usize::try_from(total).map_err(TaskStoreError::persistence)
    }

    fn max_order(&mut self, partition: Partition) -> TaskStoreResult<Option<TaskOrder>> {
        let max: Option<i32> = tasks::table
            .filter(tasks::board_id.eq(partition.board_id.into_inner()))
            .filter(tasks::status.eq(partition.status.as_str()))
            .select(diesel::dsl::max(tasks::position))
            .first(self.connection)
            .map_err(TaskStoreError::persistence)?;
        max.map(position_to_order).transpose()
    }

    fn insert(&mut self, task: &Task) -> TaskStoreResult<()> {
        let task_id = task.id();
        diesel::insert_into(tasks::table)
            .values(&to_new_row(task))
            .execute(self.connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    TaskStoreError::DuplicateTask(task_id)
                }
                _ => TaskStoreError::persistence(err),
            })?;
        Ok(())
    }

    fn update(&mut self, task: &Task) -> TaskStoreResult<()> {
        let changeset = TaskPlacementChangeset {
            status: task.status().as_str().to_owned(),
            position: order_to_position(task.order()),
            updated_at: task.updated_at(),
        };
        let updated = diesel::update(tasks::table.find(task.id().into_inner()))
            .set(&changeset)
            .execute(self.connection)
            .map_err(TaskStoreError::persistence)?;
        if updated == 0 {
            return Err(TaskStoreError::NotFound(task.id()));
        }
        Ok(())
    }

    fn delete(&mut self, id: TaskId) -> TaskStoreResult<Task> {
        let row = diesel::delete(tasks::table.find(id.into_inner()))
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(self.connection)
            .optional()
            .map_err(TaskStoreError::persistence)?;
        row.map(row_to_task)
            .transpose()?
            .ok_or(TaskStoreError::NotFound(id))
    }

    fn bulk_shift(&mut self, shift: &Shift, at: DateTime<Utc>) -> TaskStoreResult<u64> {
        let start = order_to_position(shift.range.start());
        let end = shift
            .range
            .end()
            .map_or(i32::MAX, order_to_position);
        let delta = shift.delta.value();

        let shifted = diesel::update(
            tasks::table
                .filter(tasks::board_id.eq(shift.partition.board_id.into_inner()))
                .filter(tasks::status.eq(shift.partition.status.as_str()))
                .filter(tasks::position.between(start, end)),
        )
        .set((
            tasks::position.eq(tasks::position + delta),
            tasks::updated_at.eq(at),
        ))
        .execute(self.connection)
        .map_err(TaskStoreError::persistence)?;
        u64::try_from(shifted).map_err(TaskStoreError::persistence)
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn find_one(&self, id: TaskId, owner_id: OwnerId) -> TaskStoreResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .filter(tasks::owner_id.eq(owner_id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskStoreError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_partition(&self, partition: Partition) -> TaskStoreResult<Vec<Task>> {
        self.run_blocking(move |connection| load_partition(connection, partition))
            .await
    }

    async fn find_by_board(&self, board_id: BoardId) -> TaskStoreResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::board_id.eq(board_id.into_inner()))
                .order((tasks::position.asc(), tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            let mut loaded = rows
                .into_iter()
                .map(row_to_task)
                .collect::<TaskStoreResult<Vec<_>>>()?;
            // Column order lives in the domain enum, not in the stored text.
            loaded.sort_by_key(Task::status);
            Ok(loaded)
        })
        .await
    }

    async fn transact<F, T, E>(&self, board_id: BoardId, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn TaskTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<TaskStoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            connection
                .transaction::<T, UnitError<E>, _>(|tx_connection| {
                    lock_board(tx_connection, board_id)?;
                    let mut unit = PgTaskTransaction {
                        connection: tx_connection,
                    };
                    let unit_ref: &mut dyn TaskTransaction = &mut unit;
                    work(unit_ref).map_err(UnitError::Work)
                })
                .map_err(UnitError::into_caller)
        })
        .await
        .map_err(|err| E::from(TaskStoreError::persistence(err)))?
    }
}

fn lock_board(connection: &mut PgConnection, board_id: BoardId) -> QueryResult<()> {
    diesel::sql_query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind::<diesel::sql_types::Text, _>(board_id.to_string())
        .execute(connection)?;
    Ok(())
}

fn load_partition(
    connection: &mut PgConnection,
    partition: Partition,
) -> TaskStoreResult<Vec<Task>> {
    let rows = tasks::table
        .filter(tasks::board_id.eq(partition.board_id.into_inner()))
        .filter(tasks::status.eq(partition.status.as_str()))
        .order((tasks::position.asc(), tasks::created_at.asc(), tasks::id.asc()))
        .select(TaskRow::as_select())
        .load::<TaskRow>(connection)
        .map_err(TaskStoreError::persistence)?;
    rows.into_iter().map(row_to_task).collect()
}

fn order_to_position(order: TaskOrder) -> i32 {
    // `TaskOrder` is capped at `i32::MAX` on construction.
    i32::try_from(order.value()).unwrap_or(i32::MAX)
}

fn position_to_order(position: i32) -> TaskStoreResult<TaskOrder> {
    let value = u32::try_from(position).map_err(TaskStoreError::persistence)?;
    TaskOrder::new(value).map_err(TaskStoreError::persistence)
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        board_id: task.board_id().into_inner(),
        owner_id: task.owner_id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        status: task.status().as_str().to_owned(),
        position: order_to_position(task.order()),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskStoreResult<Task> {
    let TaskRow {
        id,
        board_id,
        owner_id,
        title: persisted_title,
        description,
        status: persisted_status,
        position,
        created_at,
        updated_at,
    } = row;

    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(TaskStoreError::persistence)?;
    let title = TaskTitle::new(persisted_title, UNBOUNDED_TITLE_LENGTH)
        .map_err(TaskStoreError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        board_id: BoardId::from_uuid(board_id),
        owner_id: OwnerId::from_uuid(owner_id),
        title,
        description,
        status,
        order: position_to_order(position)?,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}
