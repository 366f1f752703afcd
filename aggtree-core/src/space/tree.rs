//! Standalone trees.
//!
//! A [`Tree`] is a single calculated root owned by the caller, with no
//! variable namespace. It memoizes and invalidates exactly like a seed in a
//! [`VariableSpace`], but its free parameters can only hold direct values.

use std::fmt;
use std::sync::Arc;

use super::variable_space::VariableSpace;
use crate::error::Result;
use crate::eval::EvalConfig;
use crate::graph::{CombineFn, Node, NodeId, Parameter};

pub struct Tree<T> {
    space: VariableSpace<T>,
    root: NodeId,
}

impl<T> Tree<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a tree whose root applies `combine` to its children.
    pub fn new<F>(root_name: &str, combine: F) -> Self
    where
        F: Fn(&[T]) -> T + Send + Sync + 'static,
    {
        Self::with_space(VariableSpace::new(), root_name, Arc::new(combine))
    }

    pub fn with_config<F>(root_name: &str, combine: F, config: &EvalConfig) -> Result<Self>
    where
        F: Fn(&[T]) -> T + Send + Sync + 'static,
    {
        let space = VariableSpace::with_config(config)?;
        Ok(Self::with_space(space, root_name, Arc::new(combine)))
    }

    fn with_space(mut space: VariableSpace<T>, root_name: &str, combine: CombineFn<T>) -> Self {
        let root = space.insert_root(root_name, combine);
        Self { space, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Value of the root.
    pub fn value(&self) -> Result<T> {
        self.space.value(self.root)
    }

    pub fn value_of(&self, id: NodeId) -> Result<T> {
        self.space.value(id)
    }

    pub fn children_values(&self, id: NodeId) -> Result<Vec<T>> {
        self.space.children_values(id)
    }

    /// See [`VariableSpace::add_child`]. Variable handles are rejected with
    /// `NotFound`, since a tree has no variables.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: &str,
        combine: Option<CombineFn<T>>,
        value: Option<Parameter<T>>,
    ) -> Result<NodeId> {
        self.space.add_child(parent, name, combine, value)
    }

    pub fn add_calculated<F>(&mut self, parent: NodeId, name: &str, combine: F) -> Result<NodeId>
    where
        F: Fn(&[T]) -> T + Send + Sync + 'static,
    {
        self.space.add_calculated(parent, name, combine)
    }

    pub fn add_parameter(&mut self, parent: NodeId, name: &str, value: T) -> Result<NodeId> {
        self.space.add_parameter(parent, name, Parameter::Value(value))
    }

    pub fn set_parameter(&mut self, id: NodeId, value: T) -> Result<()> {
        self.space.set_parameter(id, value)
    }

    pub fn mark_dirty(&mut self, id: NodeId) -> Result<usize> {
        self.space.mark_dirty(id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node<T>> {
        self.space.node(id)
    }

    pub fn node_count(&self) -> usize {
        self.space.node_count()
    }
}

impl<T> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root)
            .field("space", &self.space)
            .finish()
    }
}
