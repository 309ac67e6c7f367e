//! In-memory integration tests for task lifecycle operations.

use chrono::{Duration, Utc};
use rstest::rstest;
use taskboard::task::{
    domain::{
        BoardId, OwnerId, PersistedTaskData, Task, TaskId, TaskOrder, TaskStatus, TaskTitle,
    },
    services::{
        CreateTaskRequest, FailureCategory, MoveTaskRequest, TaskBoardConfig, TaskLifecycleError,
    },
};

use super::helpers::{BoardContext, board_context, context};

fn task_at(tasks: &[Task], index: usize) -> Result<&Task, eyre::Report> {
    tasks
        .get(index)
        .ok_or_else(|| eyre::eyre!("no seeded task at index {index}"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reorder_within_column(
    context: Result<BoardContext, eyre::Report>,
) -> Result<(), eyre::Report> {
    let board = context?;
    let tasks = board.seed("ABCD").await?;

    board.move_to(task_at(&tasks, 1)?, "todo", 3).await?;

    assert_eq!(board.column(TaskStatus::Todo).await?, "ACDB");
    board.ensure_dense().await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_from_middle(
    context: Result<BoardContext, eyre::Report>,
) -> Result<(), eyre::Report> {
    let board = context?;
    let tasks = board.seed("ABC").await?;

    board
        .service
        .delete_task(task_at(&tasks, 1)?.id(), board.owner_id)
        .await?;

    assert_eq!(board.column(TaskStatus::Todo).await?, "AC");
    board.ensure_dense().await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cross_column_move_to_head(
    context: Result<BoardContext, eyre::Report>,
) -> Result<(), eyre::Report> {
    let board = context?;
    let tasks = board.seed("ABCX").await?;
    board.move_to(task_at(&tasks, 3)?, "in_progress", 0).await?;

    board.move_to(task_at(&tasks, 0)?, "in_progress", 0).await?;

    assert_eq!(board.column(TaskStatus::Todo).await?, "BC");
    assert_eq!(board.column(TaskStatus::InProgress).await?, "AX");
    board.ensure_dense().await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_round_trips_through_every_column(
    context: Result<BoardContext, eyre::Report>,
) -> Result<(), eyre::Report> {
    let board = context?;
    let tasks = board.seed("ABC").await?;
    let traveller = task_at(&tasks, 0)?;

    for status in ["in_progress", "completed", "blocked", "todo"] {
        board.move_to(traveller, status, 0).await?;
        board.ensure_dense().await?;
    }

    assert_eq!(board.column(TaskStatus::Todo).await?, "ABC");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn boards_do_not_share_columns(
    context: Result<BoardContext, eyre::Report>,
) -> Result<(), eyre::Report> {
    let board = context?;
    let other_board = BoardId::new();
    board.boards.register(other_board, board.owner_id)?;
    board.seed("AB").await?;

    let elsewhere = board
        .service
        .create_task(CreateTaskRequest::new(other_board, board.owner_id, "Z"))
        .await?;

    assert_eq!(elsewhere.order(), TaskOrder::ZERO);
    assert_eq!(board.column(TaskStatus::Todo).await?, "AB");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_move_leaves_board_untouched(
    context: Result<BoardContext, eyre::Report>,
) -> Result<(), eyre::Report> {
    let board = context?;
    let tasks = board.seed("ABC").await?;

    let result = board
        .service
        .move_task(MoveTaskRequest::new(
            task_at(&tasks, 0)?.id(),
            board.owner_id,
            "completed",
            5,
        ))
        .await;

    let error = result.err().ok_or_else(|| eyre::eyre!("move should be rejected"))?;
    assert!(matches!(error, TaskLifecycleError::InvalidPosition(_)));
    assert_eq!(error.category().http_status(), 400);
    assert_eq!(board.column(TaskStatus::Todo).await?, "ABC");
    assert_eq!(board.column(TaskStatus::Completed).await?, "");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lenient_board_clamps_past_end() -> Result<(), eyre::Report> {
    let board = board_context(TaskBoardConfig::lenient())?;
    let tasks = board.seed("ABC").await?;

    let moved = board.move_to(task_at(&tasks, 0)?, "completed", 5).await?;

    assert_eq!(moved.order(), TaskOrder::ZERO);
    board.ensure_dense().await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn foreign_owner_sees_not_found(
    context: Result<BoardContext, eyre::Report>,
) -> Result<(), eyre::Report> {
    let board = context?;
    let tasks = board.seed("A").await?;

    let result = board
        .service
        .delete_task(task_at(&tasks, 0)?.id(), OwnerId::new())
        .await;

    let error = result.err().ok_or_else(|| eyre::eyre!("delete should be rejected"))?;
    assert_eq!(error.category(), FailureCategory::NotFound);
    assert_eq!(board.column(TaskStatus::Todo).await?, "A");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reconcile_collapses_duplicate_orders(
    context: Result<BoardContext, eyre::Report>,
) -> Result<(), eyre::Report> {
    let board = context?;
    let base = Utc::now();
    for (title, order, age) in [("A", 0, 0), ("B", 1, 1), ("C", 1, 2)] {
        board.store.restore(Task::from_persisted(PersistedTaskData {
            id: TaskId::new(),
            board_id: board.board_id,
            owner_id: board.owner_id,
            title: TaskTitle::new(title, 200)?,
            description: None,
            status: TaskStatus::Completed,
            order: TaskOrder::new(order)?,
            created_at: base + Duration::seconds(age),
            updated_at: base + Duration::seconds(age),
        }))?;
    }

    let report = board
        .service
        .reconcile_board(board.board_id, board.owner_id)
        .await?;

    assert_eq!(report.tasks_rewritten(), 1);
    assert_eq!(board.column(TaskStatus::Completed).await?, "ABC");
    board.ensure_dense().await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_operations_keep_columns_dense(
    context: Result<BoardContext, eyre::Report>,
) -> Result<(), eyre::Report> {
    let board = context?;
    let tasks = board.seed("ABCDEFGHIJKL").await?;
    let (doomed, movers) = tasks.split_at(4);

    let mut handles = Vec::new();
    for task in doomed {
        let service = board.service.clone();
        let (task_id, owner_id) = (task.id(), board.owner_id);
        handles.push(tokio::spawn(async move {
            service.delete_task(task_id, owner_id).await.map(|_| ())
        }));
    }
    let targets = TaskStatus::ALL.iter().cycle().zip([0_i64, 1, 2].iter().cycle());
    for (task, (status, order)) in movers.iter().cycle().take(24).zip(targets) {
        let service = board.service.clone();
        let request = MoveTaskRequest::new(task.id(), board.owner_id, status.as_str(), *order);
        handles.push(tokio::spawn(async move {
            service.move_task(request).await.map(|_| ())
        }));
    }
    for title in ["M", "N", "O", "P"] {
        let service = board.service.clone();
        let request = CreateTaskRequest::new(board.board_id, board.owner_id, title);
        handles.push(tokio::spawn(async move {
            service.create_task(request).await.map(|_| ())
        }));
    }
    for handle in handles {
        match handle.await? {
            Ok(()) | Err(TaskLifecycleError::InvalidPosition(_)) => {}
            Err(err) => return Err(err.into()),
        }
    }

    let report = board
        .service
        .reconcile_board(board.board_id, board.owner_id)
        .await?;
    assert!(report.is_clean(), "columns needed repair: {report:?}");
    board.ensure_dense().await
}
