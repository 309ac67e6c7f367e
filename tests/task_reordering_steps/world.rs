//! Shared world state for task reordering BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::task::{
    adapters::memory::{InMemoryBoardDirectory, InMemoryTaskStore},
    domain::{BoardId, OwnerId, Task, TaskId, TaskStatus},
    services::{TaskLifecycleError, TaskLifecycleService},
};

/// Service type used by the BDD world.
pub type TestTaskService =
    TaskLifecycleService<InMemoryTaskStore, InMemoryBoardDirectory, DefaultClock>;

/// Scenario world for task reordering behaviour tests.
pub struct TaskBoardWorld {
    pub service: TestTaskService,
    pub boards: Arc<InMemoryBoardDirectory>,
    pub board_id: BoardId,
    pub owner_id: OwnerId,
    pub tasks_by_title: HashMap<String, TaskId>,
    pub last_move_result: Option<Result<Task, TaskLifecycleError>>,
}

impl TaskBoardWorld {
    /// Creates a world with no registered board.
    #[must_use]
    pub fn new() -> Self {
        let boards = Arc::new(InMemoryBoardDirectory::new());
        let service = TaskLifecycleService::new(
            Arc::new(InMemoryTaskStore::new()),
            Arc::clone(&boards),
            Arc::new(DefaultClock),
        );

        Self {
            service,
            boards,
            board_id: BoardId::new(),
            owner_id: OwnerId::new(),
            tasks_by_title: HashMap::new(),
            last_move_result: None,
        }
    }

    /// Resolves a task seeded by title.
    ///
    /// # Errors
    ///
    /// Returns an error if no task with `title` was seeded.
    pub fn task_id(&self, title: &str) -> Result<TaskId, eyre::Report> {
        self.tasks_by_title
            .get(title)
            .copied()
            .ok_or_else(|| eyre::eyre!("no task titled {title} in scenario world"))
    }

    /// Returns the titles of one column in order.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails.
    pub fn column_titles(&self, status: TaskStatus) -> Result<Vec<String>, eyre::Report> {
        let tasks = run_async(self.service.list_tasks(self.board_id, self.owner_id))?;
        Ok(tasks
            .into_iter()
            .filter(|task| task.status() == status)
            .map(|task| task.title().as_str().to_owned())
            .collect())
    }
}

impl Default for TaskBoardWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskBoardWorld {
    TaskBoardWorld::default()
}

/// Parses a status named in a feature file.
///
/// # Errors
///
/// Returns an error if `status` is not a known column.
pub fn parse_status(status: &str) -> Result<TaskStatus, eyre::Report> {
    TaskStatus::try_from(status).map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))
}

/// Splits a comma-separated title list from a feature file.
pub fn split_titles(titles: &str) -> Vec<String> {
    titles
        .split(',')
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
