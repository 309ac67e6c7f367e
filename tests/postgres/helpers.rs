//! Shared helpers for `PostgreSQL` integration tests.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use taskboard::task::{
    adapters::postgres::{PostgresBoardDirectory, PostgresTaskStore, TaskPgPool},
    domain::{BoardId, OwnerId},
    services::TaskLifecycleService,
};

/// Environment variable naming the disposable test database.
pub const DATABASE_URL_VAR: &str = "TASKBOARD_TEST_DATABASE_URL";

/// SQL to drop the schema.
pub const DROP_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_boards_and_tasks/down.sql");

/// SQL to create the schema.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_boards_and_tasks/up.sql");

static SCHEMA_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Service wired to `PostgreSQL` adapters.
pub type PostgresService =
    TaskLifecycleService<PostgresTaskStore, PostgresBoardDirectory, DefaultClock>;

/// A freshly migrated database with one board registered.
pub struct PreparedBoard {
    /// Service under test.
    pub service: PostgresService,
    /// Board every test operates on.
    pub board_id: BoardId,
    /// Owner of `board_id`.
    pub owner_id: OwnerId,
    _schema: MutexGuard<'static, ()>,
}

/// Resolves the test database URL from the value of [`DATABASE_URL_VAR`].
///
/// # Errors
///
/// Returns an error when the variable is unset or blank.
pub fn database_url(value: Option<String>) -> Result<String, eyre::Report> {
    value
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| eyre::eyre!("{DATABASE_URL_VAR} must name a disposable test database"))
}

/// Recreates the schema and registers a board.
///
/// The returned board holds a process-wide lock so tests in this binary do
/// not drop each other's tables.
///
/// # Errors
///
/// Returns an error if no database is configured, or if it cannot be reached
/// or migrated.
pub fn prepare_board(pool_size: u32) -> Result<PreparedBoard, eyre::Report> {
    let url = database_url(std::env::var(DATABASE_URL_VAR).ok())?;
    let schema = SCHEMA_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);

    let mut connection = PgConnection::establish(&url)?;
    connection.batch_execute(DROP_SCHEMA_SQL)?;
    connection.batch_execute(CREATE_SCHEMA_SQL)?;

    let board_id = BoardId::new();
    let owner_id = OwnerId::new();
    diesel::sql_query("INSERT INTO boards (id, owner_id, name) VALUES ($1, $2, $3)")
        .bind::<diesel::sql_types::Uuid, _>(board_id.into_inner())
        .bind::<diesel::sql_types::Uuid, _>(owner_id.into_inner())
        .bind::<diesel::sql_types::Text, _>("integration")
        .execute(&mut connection)?;

    let pool: TaskPgPool = Pool::builder()
        .max_size(pool_size)
        .build(ConnectionManager::<PgConnection>::new(url))?;
    let service = TaskLifecycleService::new(
        Arc::new(PostgresTaskStore::new(pool.clone())),
        Arc::new(PostgresBoardDirectory::new(pool)),
        Arc::new(DefaultClock),
    );
    Ok(PreparedBoard {
        service,
        board_id,
        owner_id,
        _schema: schema,
    })
}
