//! When steps for task reordering BDD scenarios.

use super::world::{TaskBoardWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskboard::task::services::MoveTaskRequest;

#[when(r#""{title}" is moved to "{status}" at position {position:i64}"#)]
fn task_is_moved(
    world: &mut TaskBoardWorld,
    title: String,
    status: String,
    position: i64,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&title)?;
    let result = run_async(world.service.move_task(MoveTaskRequest::new(
        task_id,
        world.owner_id,
        status,
        position,
    )));
    world.last_move_result = Some(result);
    Ok(())
}

#[when(r#""{title}" is deleted"#)]
fn task_is_deleted(world: &mut TaskBoardWorld, title: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&title)?;
    run_async(world.service.delete_task(task_id, world.owner_id))
        .wrap_err_with(|| format!("delete task {title}"))?;
    world.tasks_by_title.remove(&title);
    Ok(())
}
