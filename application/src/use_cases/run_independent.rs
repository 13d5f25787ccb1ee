//! Run Independent use case
//!
//! Runs unrelated unit trees in parallel. Each tree moves into its own tokio
//! task and comes back with its result, so callers keep the transcripts.

use crate::task::{RunContext, RunError, Task};
use taskweave_domain::Message;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// One finished tree and what its run produced
#[derive(Debug)]
pub struct IndependentRun {
    pub task: Task,
    pub result: Result<Message, RunError>,
}

/// Use case for running sibling trees that share no mutable state
pub struct RunIndependentUseCase {
    ctx: RunContext,
}

impl RunIndependentUseCase {
    /// Every run shares `ctx`, so one cancel stops them all.
    pub fn new(ctx: RunContext) -> Self {
        Self { ctx }
    }

    /// Run each `(task, input)` pair concurrently.
    ///
    /// Results come back in input order. A task that panicked is logged and
    /// left out.
    pub async fn execute(&self, jobs: Vec<(Task, Message)>) -> Vec<IndependentRun> {
        info!("Running {} independent units", jobs.len());
        let mut join_set = JoinSet::new();

        for (index, (mut task, input)) in jobs.into_iter().enumerate() {
            let ctx = self.ctx.clone();
            join_set.spawn(async move {
                let result = task.run_async(input, &ctx).await;
                (index, task, result)
            });
        }

        let mut finished = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, task, result)) => {
                    if let Err(e) = &result {
                        warn!("Unit {} failed: {}", task.name(), e);
                    }
                    finished.push((index, IndependentRun { task, result }));
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        finished.sort_by_key(|(index, _)| *index);
        finished.into_iter().map(|(_, run)| run).collect()
    }
}
