//! Evaluation Strategies
//!
//! A strategy decides how the children of a calculated node are evaluated.
//! It receives the child handles in declaration order and a callback that
//! evaluates one child, and must return the child values in the same order.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::info;

use crate::error::Result;
use crate::graph::NodeId;

/// Produces the ordered input sequence of a combining function.
pub trait EvaluationStrategy<T>: Send + Sync {
    /// Short name used in log events.
    fn name(&self) -> &'static str;

    /// Evaluate every child and return the values in the order of `children`.
    fn fan_out(&self, children: &[NodeId], evaluate: &(dyn Fn(NodeId) -> T + Sync)) -> Vec<T>;
}

/// Evaluate children one at a time on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl<T> EvaluationStrategy<T> for Sequential {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn fan_out(&self, children: &[NodeId], evaluate: &(dyn Fn(NodeId) -> T + Sync)) -> Vec<T> {
        children.iter().map(|&child| evaluate(child)).collect()
    }
}

/// Stack reserved for each pool worker. A worker may run the nested fan-out
/// of a whole [`MAX_DEPTH`](crate::graph::MAX_DEPTH) chain, plus whatever it
/// steals while waiting on a join.
const WORKER_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Evaluate children as tasks on a fixed-size worker pool.
///
/// Nested fan-out from inside a task runs on the same pool, so the pool size
/// bounds the total number of concurrently evaluating nodes across all
/// levels of the tree.
#[derive(Debug)]
pub struct BoundedParallel {
    pool: ThreadPool,
}

impl BoundedParallel {
    /// Build the worker pool. `None` uses one worker per available CPU.
    pub fn new(pool_size: Option<usize>) -> Result<Self> {
        let mut builder = ThreadPoolBuilder::new()
            .thread_name(|index| format!("aggtree-worker-{index}"))
            .stack_size(WORKER_STACK_SIZE);
        if let Some(workers) = pool_size {
            builder = builder.num_threads(workers);
        }
        let pool = builder.build()?;
        info!(workers = pool.current_num_threads(), "built evaluation worker pool");
        Ok(Self { pool })
    }
}

impl<T: Send> EvaluationStrategy<T> for BoundedParallel {
    fn name(&self) -> &'static str {
        "bounded-parallel"
    }

    fn fan_out(&self, children: &[NodeId], evaluate: &(dyn Fn(NodeId) -> T + Sync)) -> Vec<T> {
        // Indexed collect keeps declaration order regardless of completion order.
        self.pool
            .install(|| children.par_iter().map(|&child| evaluate(child)).collect())
    }
}
