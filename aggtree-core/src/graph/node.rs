//! Tree Nodes
//!
//! This module defines the node types that live in a [`NodeArena`](super::NodeArena).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::error::{AggTreeError, Result};
use crate::space::VariableHandle;

/// Identifies the arena (and therefore the space or tree) a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaId(u64);

impl ArenaId {
    /// Generate a new unique arena ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ArenaId {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable handle to a node. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    arena: ArenaId,
    index: usize,
}

impl NodeId {
    pub(crate) fn new(arena: ArenaId, index: usize) -> Self {
        Self { arena, index }
    }

    /// The arena this node lives in.
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// Position of the node in its arena, in creation order.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.arena.raw(), self.index)
    }
}

/// Combining function of a calculated node: ordered child values in, one
/// aggregate value out.
pub type CombineFn<T> = Arc<dyn Fn(&[T]) -> T + Send + Sync>;

/// Value held by a free parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter<T> {
    /// A value owned by the node itself.
    Value(T),
    /// A live reference to a shared variable of the owning space.
    Variable(VariableHandle),
}

impl<T> From<VariableHandle> for Parameter<T> {
    fn from(handle: VariableHandle) -> Self {
        Self::Variable(handle)
    }
}

impl<T> From<&VariableHandle> for Parameter<T> {
    fn from(handle: &VariableHandle) -> Self {
        Self::Variable(handle.clone())
    }
}

/// Cache state of a calculated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// No cached value; the next read recomputes.
    Dirty,

    /// The cached value reflects the current inputs.
    Cached,
}

/// Payload of a calculated node: its combining function and memoized result.
pub struct Calculation<T> {
    combine: CombineFn<T>,
    cache: RwLock<Option<T>>,
}

impl<T> Calculation<T> {
    fn new(combine: CombineFn<T>) -> Self {
        Self {
            combine,
            cache: RwLock::new(None),
        }
    }

    pub fn state(&self) -> NodeState {
        if self.cache.read().is_some() {
            NodeState::Cached
        } else {
            NodeState::Dirty
        }
    }

    /// Apply the combining function to a fully resolved input slice.
    pub(crate) fn combine(&self, inputs: &[T]) -> T {
        (self.combine)(inputs)
    }

    pub(crate) fn store(&self, value: T) {
        *self.cache.write() = Some(value);
    }

    /// Drop the cached value. Returns whether one was present.
    pub(crate) fn clear(&self) -> bool {
        self.cache.write().take().is_some()
    }
}

impl<T: Clone> Calculation<T> {
    /// The memoized value, if the node is not dirty.
    pub fn cached(&self) -> Option<T> {
        self.cache.read().clone()
    }
}

/// Per-variant payload of a node.
pub enum NodeKind<T> {
    FreeParameter(Parameter<T>),
    Calculated(Calculation<T>),
}

impl<T> NodeKind<T> {
    /// Build a payload from the optional halves accepted by `add_child`.
    ///
    /// Exactly one of `combine` and `value` must be given.
    pub(crate) fn from_parts(
        name: &str,
        combine: Option<CombineFn<T>>,
        value: Option<Parameter<T>>,
    ) -> Result<Self> {
        match (combine, value) {
            (Some(combine), None) => Ok(Self::calculated(combine)),
            (None, Some(value)) => Ok(Self::FreeParameter(value)),
            (Some(_), Some(_)) => Err(AggTreeError::Configuration {
                node: name.to_string(),
                reason: "both a combining function and a value were given",
            }),
            (None, None) => Err(AggTreeError::Configuration {
                node: name.to_string(),
                reason: "either a combining function or a value is required",
            }),
        }
    }

    pub(crate) fn calculated(combine: CombineFn<T>) -> Self {
        Self::Calculated(Calculation::new(combine))
    }

    fn label(&self) -> &'static str {
        match self {
            Self::FreeParameter(_) => "FreeParameter",
            Self::Calculated(_) => "Calculated",
        }
    }
}

/// A node in an aggregation tree.
pub struct Node<T> {
    id: NodeId,
    name: String,
    parent: Option<NodeId>,
    depth: usize,
    children: SmallVec<[NodeId; 4]>,
    kind: NodeKind<T>,
}

impl<T> Node<T> {
    pub(crate) fn new(
        id: NodeId,
        name: String,
        parent: Option<NodeId>,
        depth: usize,
        kind: NodeKind<T>,
    ) -> Self {
        Self {
            id,
            name,
            parent,
            depth,
            children: SmallVec::new(),
            kind,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning node, `None` for roots.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in declaration order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind<T> {
        &self.kind
    }

    /// Number of edges between this node and its root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_calculated(&self) -> bool {
        matches!(self.kind, NodeKind::Calculated(_))
    }

    /// Cache state, `None` for free parameters (they are never cached).
    pub fn state(&self) -> Option<NodeState> {
        match &self.kind {
            NodeKind::Calculated(calc) => Some(calc.state()),
            NodeKind::FreeParameter(_) => None,
        }
    }

    pub(crate) fn kind_mut(&mut self) -> &mut NodeKind<T> {
        &mut self.kind
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }
}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind.label())
            .field("state", &self.state())
            .field("parent", &self.parent)
            .field("depth", &self.depth)
            .field("children", &self.children.len())
            .finish()
    }
}

impl<T> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.name)
    }
}
