//! Variable Space
//!
//! A variable space owns shared variables, the trees ("seeds") built on top of
//! them, and the table linking each variable to the free parameters that read
//! it.
//!
//! # How Updates Work
//!
//! 1. `update_variable` stores the new value.
//!
//! 2. For every subscribed free parameter, the parent's cached value is
//!    cleared, and so on up the tree until an ancestor is already dirty.
//!
//! 3. The next read of any cleared node recomputes it. Nodes off those paths
//!    keep their caches.
//!
//! # Thread Safety
//!
//! Reads take `&self` and may run on many threads at once. Every operation
//! that changes values or structure takes `&mut self`, so writes never race
//! with reads or with each other.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::variable::{SharedVariable, VariableHandle, VariableStore};
use crate::error::{AggTreeError, KeyKind, Result};
use crate::eval::{EvalConfig, EvaluationStrategy, Evaluator, Sequential};
use crate::graph::{
    CombineFn, InvalidationPropagator, Node, NodeArena, NodeId, NodeKind, Parameter,
};

pub struct VariableSpace<T> {
    arena: NodeArena<T>,
    variables: VariableStore<T>,
    seeds: IndexMap<String, NodeId>,
    strategy: Arc<dyn EvaluationStrategy<T>>,
}

impl<T> VariableSpace<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty space that evaluates sequentially.
    pub fn new() -> Self {
        Self::with_strategy(Arc::new(Sequential))
    }

    pub fn with_config(config: &EvalConfig) -> Result<Self> {
        Ok(Self::with_strategy(config.build_strategy()?))
    }

    pub fn with_strategy(strategy: Arc<dyn EvaluationStrategy<T>>) -> Self {
        let arena = NodeArena::new();
        let variables = VariableStore::new(arena.id());
        Self {
            arena,
            variables,
            seeds: IndexMap::new(),
            strategy,
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    // ------------------------------------------------------------------------
    // Seeds
    // ------------------------------------------------------------------------

    /// Create a root calculated node owned by this space.
    ///
    /// Seed names are unique: reusing one fails with
    /// [`AggTreeError::DuplicateKey`] and leaves the existing seed bound to
    /// the name, rather than rebinding it to the new root.
    pub fn add_seed_node<F>(&mut self, name: &str, combine: F) -> Result<NodeId>
    where
        F: Fn(&[T]) -> T + Send + Sync + 'static,
    {
        if self.seeds.contains_key(name) {
            return Err(AggTreeError::duplicate(KeyKind::Seed, name));
        }
        let root = self.insert_root(name, Arc::new(combine));
        self.seeds.insert(name.to_string(), root);
        Ok(root)
    }

    pub(super) fn insert_root(&mut self, name: &str, combine: CombineFn<T>) -> NodeId {
        self.arena.insert_root(name, combine)
    }

    pub fn seed(&self, name: &str) -> Result<NodeId> {
        self.seeds
            .get(name)
            .copied()
            .ok_or_else(|| AggTreeError::not_found(KeyKind::Seed, name))
    }

    /// Seeds in creation order.
    pub fn seeds(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.seeds.iter().map(|(name, &id)| (name.as_str(), id))
    }

    // ------------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------------

    pub fn add_variable(&mut self, name: &str, value: T) -> Result<VariableHandle> {
        let handle = self.variables.insert(name, value)?;
        debug!(variable = name, "added variable");
        Ok(handle)
    }

    /// Handle for binding free parameters to the variable `name`.
    pub fn get_variable(&self, name: &str) -> Result<VariableHandle> {
        self.variables.handle(name)
    }

    /// Replace the value of `name` and invalidate every cache that depends
    /// on it.
    pub fn update_variable(&mut self, name: &str, value: T) -> Result<()> {
        let subscribers = self.variables.set(name, value)?;
        let cleared = InvalidationPropagator::new(&self.arena).invalidate_inputs(subscribers);
        debug!(
            variable = name,
            subscribers = subscribers.len(),
            cleared,
            "updated variable"
        );
        Ok(())
    }

    pub fn variable_value(&self, name: &str) -> Result<&T> {
        Ok(self.variables.get(name)?.value())
    }

    /// Free parameters currently reading `name`.
    pub fn subscribers(&self, name: &str) -> Result<&[NodeId]> {
        self.variables.subscribers(name)
    }

    /// Variables in registration order.
    pub fn variables(&self) -> impl Iterator<Item = &SharedVariable<T>> {
        self.variables.iter()
    }

    // ------------------------------------------------------------------------
    // Tree construction
    // ------------------------------------------------------------------------

    /// Append a child to `parent`.
    ///
    /// Exactly one of `combine` (calculated child) and `value` (free
    /// parameter) must be given. A parameter bound to a variable handle is
    /// subscribed to that variable.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: &str,
        combine: Option<CombineFn<T>>,
        value: Option<Parameter<T>>,
    ) -> Result<NodeId> {
        let kind = NodeKind::from_parts(name, combine, value)?;
        if let NodeKind::FreeParameter(Parameter::Variable(handle)) = &kind {
            self.variables.resolve(handle)?;
        }

        let child = self.arena.insert_child(parent, name, kind)?;
        if let NodeKind::FreeParameter(Parameter::Variable(handle)) = self.arena[child].kind() {
            self.variables.subscribe(handle, child);
        }
        // The parent gained an input, so its cached value no longer applies.
        InvalidationPropagator::new(&self.arena).mark_dirty(parent);
        Ok(child)
    }

    pub fn add_calculated<F>(&mut self, parent: NodeId, name: &str, combine: F) -> Result<NodeId>
    where
        F: Fn(&[T]) -> T + Send + Sync + 'static,
    {
        let combine: CombineFn<T> = Arc::new(combine);
        self.add_child(parent, name, Some(combine), None)
    }

    pub fn add_parameter(
        &mut self,
        parent: NodeId,
        name: &str,
        value: impl Into<Parameter<T>>,
    ) -> Result<NodeId> {
        self.add_child(parent, name, None, Some(value.into()))
    }

    /// Replace the value of a free parameter that holds its own value.
    pub fn set_parameter(&mut self, id: NodeId, value: T) -> Result<()> {
        let node = self.arena.get(id)?;
        match node.kind() {
            NodeKind::FreeParameter(Parameter::Value(_)) => {}
            NodeKind::FreeParameter(Parameter::Variable(_)) => {
                return Err(AggTreeError::Configuration {
                    node: node.name().to_string(),
                    reason: "parameter is bound to a shared variable; update the variable instead",
                });
            }
            NodeKind::Calculated(_) => {
                return Err(AggTreeError::invalid_node(id, "calculated nodes have no settable value"));
            }
        }
        let parent = node.parent();

        if let NodeKind::FreeParameter(Parameter::Value(current)) = self.arena.get_mut(id)?.kind_mut()
        {
            *current = value;
        }
        if let Some(parent) = parent {
            InvalidationPropagator::new(&self.arena).mark_dirty(parent);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Reads and invalidation
    // ------------------------------------------------------------------------

    /// Current value of a node.
    pub fn value(&self, id: NodeId) -> Result<T> {
        self.evaluator().value(id)
    }

    /// Current values of a node's children, in declaration order.
    pub fn children_values(&self, id: NodeId) -> Result<Vec<T>> {
        self.evaluator().children_values(id)
    }

    /// Clear the cached value of `id` and of its cached ancestors.
    ///
    /// Returns the number of caches cleared.
    pub fn mark_dirty(&mut self, id: NodeId) -> Result<usize> {
        self.arena.get(id)?;
        Ok(InvalidationPropagator::new(&self.arena).mark_dirty(id))
    }

    pub fn node(&self, id: NodeId) -> Result<&Node<T>> {
        self.arena.get(id)
    }

    /// All nodes of all trees in this space, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<T>> {
        self.arena.iter()
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    fn evaluator(&self) -> Evaluator<'_, T> {
        Evaluator::new(&self.arena, &self.variables, self.strategy.as_ref())
    }
}

impl<T> Default for VariableSpace<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for VariableSpace<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableSpace")
            .field("nodes", &self.arena.len())
            .field("variables", &self.variables.len())
            .field("seeds", &self.seeds.keys().collect::<Vec<_>>())
            .field("strategy", &self.strategy.name())
            .finish()
    }
}
