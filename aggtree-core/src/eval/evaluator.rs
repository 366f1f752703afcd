//! Evaluator
//!
//! Pulls values bottom-up. A calculated node with a cached value answers
//! from the cache; a dirty one asks its strategy for the child values,
//! applies its combining function once, and stores the result.
//!
//! Evaluation recurses once per tree level. Trees never exceed
//! [`MAX_DEPTH`](crate::graph::MAX_DEPTH) levels, which keeps the recursion
//! within a thread's stack.
//!
//! Concurrent readers of the same dirty node may both recompute it. Both
//! compute the same value from the same inputs, so the second store is
//! redundant but harmless; writers are excluded by `&mut` access to the
//! owning space.

use tracing::{debug, trace};

use super::strategy::EvaluationStrategy;
use crate::error::Result;
use crate::graph::{NodeArena, NodeId, NodeKind, Parameter};
use crate::space::VariableStore;

pub(crate) struct Evaluator<'a, T> {
    arena: &'a NodeArena<T>,
    variables: &'a VariableStore<T>,
    strategy: &'a dyn EvaluationStrategy<T>,
}

impl<'a, T> Evaluator<'a, T>
where
    T: Clone + Send + Sync,
{
    pub(crate) fn new(
        arena: &'a NodeArena<T>,
        variables: &'a VariableStore<T>,
        strategy: &'a dyn EvaluationStrategy<T>,
    ) -> Self {
        Self {
            arena,
            variables,
            strategy,
        }
    }

    /// Current value of `id`, computing and caching dirty ancestors of its
    /// inputs as needed.
    pub(crate) fn value(&self, id: NodeId) -> Result<T> {
        self.arena.get(id)?;
        Ok(self.evaluate(id))
    }

    /// Current values of the children of `id`, in declaration order.
    pub(crate) fn children_values(&self, id: NodeId) -> Result<Vec<T>> {
        let node = self.arena.get(id)?;
        Ok(self.fan_out(node.children()))
    }

    fn fan_out(&self, children: &[NodeId]) -> Vec<T> {
        self.strategy.fan_out(children, &|child| self.evaluate(child))
    }

    fn evaluate(&self, id: NodeId) -> T {
        let node = &self.arena[id];
        match node.kind() {
            NodeKind::FreeParameter(Parameter::Value(value)) => value.clone(),
            NodeKind::FreeParameter(Parameter::Variable(handle)) => {
                self.variables.value_of(handle).clone()
            }
            NodeKind::Calculated(calc) => {
                if let Some(value) = calc.cached() {
                    trace!(node = node.name(), "cache hit");
                    return value;
                }
                let inputs = self.fan_out(node.children());
                let value = calc.combine(&inputs);
                calc.store(value.clone());
                debug!(
                    node = node.name(),
                    children = inputs.len(),
                    strategy = self.strategy.name(),
                    "recomputed node"
                );
                value
            }
        }
    }
}
