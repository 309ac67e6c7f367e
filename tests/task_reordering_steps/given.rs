//! Given steps for task reordering BDD scenarios.

use super::world::{TaskBoardWorld, parse_status, run_async, split_titles};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::task::{
    domain::TaskStatus,
    services::{CreateTaskRequest, MoveTaskRequest},
};

#[given("a board owned by the caller")]
fn board_owned_by_caller(world: &mut TaskBoardWorld) -> Result<(), eyre::Report> {
    world
        .boards
        .register(world.board_id, world.owner_id)
        .wrap_err("register scenario board")?;
    Ok(())
}

#[given(r#"the "{status}" column holds "{titles}""#)]
fn column_holds(
    world: &mut TaskBoardWorld,
    status: String,
    titles: String,
) -> Result<(), eyre::Report> {
    let target = parse_status(&status)?;
    for (position, title) in split_titles(&titles).into_iter().enumerate() {
        let created = run_async(world.service.create_task(CreateTaskRequest::new(
            world.board_id,
            world.owner_id,
            title.clone(),
        )))
        .wrap_err_with(|| format!("create task {title}"))?;

        if target != TaskStatus::Todo {
            let order = i64::try_from(position)?;
            run_async(world.service.move_task(MoveTaskRequest::new(
                created.id(),
                world.owner_id,
                status.clone(),
                order,
            )))
            .wrap_err_with(|| format!("place task {title} in {status}"))?;
        }
        world.tasks_by_title.insert(title, created.id());
    }
    Ok(())
}
