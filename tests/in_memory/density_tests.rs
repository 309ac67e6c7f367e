//! Randomized operation sequences must leave every column dense.

use proptest::prelude::*;
use taskboard::task::{
    domain::{Task, TaskStatus},
    services::TaskBoardConfig,
};
use tokio::runtime::Runtime;

use super::helpers::board_context;

#[derive(Debug, Clone)]
enum Op {
    Create,
    Move { pick: usize, status: usize, order: i64 },
    Delete { pick: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Create),
        4 => (any::<usize>(), 0..TaskStatus::ALL.len(), -2_i64..8)
            .prop_map(|(pick, status, order)| Op::Move { pick, status, order }),
        1 => any::<usize>().prop_map(|pick| Op::Delete { pick }),
    ]
}

fn pick(tasks: &[Task], seed: usize) -> Option<&Task> {
    tasks.get(seed.checked_rem(tasks.len())?)
}

async fn run_sequence(ops: Vec<Op>) -> Result<(), eyre::Report> {
    let board = board_context(TaskBoardConfig::lenient())?;
    for step in ops {
        let tasks = board
            .service
            .list_tasks(board.board_id, board.owner_id)
            .await?;
        match step {
            Op::Create => {
                board.seed("T").await?;
            }
            Op::Move {
                pick: index,
                status,
                order,
            } => {
                let Some(task) = pick(&tasks, index) else {
                    continue;
                };
                let target = TaskStatus::ALL
                    .get(status)
                    .ok_or_else(|| eyre::eyre!("status index {status} out of range"))?;
                board.move_to(task, target.as_str(), order).await?;
            }
            Op::Delete { pick: index } => {
                let Some(task) = pick(&tasks, index) else {
                    continue;
                };
                board.service.delete_task(task.id(), board.owner_id).await?;
            }
        }
        board.ensure_dense().await?;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn columns_stay_dense(ops in prop::collection::vec(op(), 1..40)) {
        let runtime = Runtime::new().map_err(|err| TestCaseError::fail(err.to_string()))?;
        runtime
            .block_on(run_sequence(ops))
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
    }
}
