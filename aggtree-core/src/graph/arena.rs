//! Node Arena
//!
//! All nodes of a space (or standalone tree) live in one arena, indexed by
//! [`NodeId`]. Parent links and child lists are stored as handles, so the tree
//! never owns itself cyclically.

use std::ops::Index;

use super::node::{ArenaId, CombineFn, Node, NodeId, NodeKind};
use crate::error::{AggTreeError, Result};

/// Deepest allowed node, counted in edges from its root.
///
/// Evaluation recurses once per level, so the limit keeps a read of any
/// valid tree within a thread's stack.
pub const MAX_DEPTH: usize = 256;

/// Append-only storage for the nodes of one or more trees.
pub struct NodeArena<T> {
    id: ArenaId,
    nodes: Vec<Node<T>>,
}

impl<T> NodeArena<T> {
    /// Create a new empty arena.
    pub fn new() -> Self {
        Self {
            id: ArenaId::new(),
            nodes: Vec::new(),
        }
    }

    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// Add a root calculated node.
    pub fn insert_root(&mut self, name: impl Into<String>, combine: CombineFn<T>) -> NodeId {
        self.push(name.into(), None, 0, NodeKind::calculated(combine))
    }

    /// Append a child to `parent`, after all of its existing children.
    ///
    /// Only calculated nodes can have children, and no child may sit deeper
    /// than [`MAX_DEPTH`].
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        kind: NodeKind<T>,
    ) -> Result<NodeId> {
        let owner = self.get(parent)?;
        if !owner.is_calculated() {
            return Err(AggTreeError::invalid_node(
                parent,
                "free parameters cannot have children",
            ));
        }
        if owner.depth() >= MAX_DEPTH {
            return Err(AggTreeError::TooDeep {
                parent,
                limit: MAX_DEPTH,
            });
        }
        let depth = owner.depth() + 1;
        let child = self.push(name.into(), Some(parent), depth, kind);
        self.nodes[parent.index()].push_child(child);
        Ok(child)
    }

    fn push(
        &mut self,
        name: String,
        parent: Option<NodeId>,
        depth: usize,
        kind: NodeKind<T>,
    ) -> NodeId {
        let id = NodeId::new(self.id, self.nodes.len());
        self.nodes.push(Node::new(id, name, parent, depth, kind));
        id
    }

    /// Get a node, checking that the handle belongs to this arena.
    pub fn get(&self, id: NodeId) -> Result<&Node<T>> {
        if id.arena() != self.id {
            return Err(AggTreeError::invalid_node(id, "node belongs to another tree"));
        }
        self.nodes
            .get(id.index())
            .ok_or_else(|| AggTreeError::invalid_node(id, "node does not exist"))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut Node<T>> {
        self.get(id)?;
        Ok(&mut self.nodes[id.index()])
    }

    /// All nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Node<T>> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Unchecked lookup for handles the arena handed out itself (parent and child
/// links). Public entry points go through [`NodeArena::get`].
impl<T> Index<NodeId> for NodeArena<T> {
    type Output = Node<T>;

    fn index(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::Parameter;
    use std::sync::Arc;

    fn sum() -> CombineFn<i64> {
        Arc::new(|values: &[i64]| values.iter().sum())
    }

    #[test]
    fn children_keep_declaration_order() {
        let mut arena = NodeArena::new();
        let root = arena.insert_root("root", sum());
        let a = arena
            .insert_child(root, "a", NodeKind::FreeParameter(Parameter::Value(1)))
            .unwrap();
        let b = arena.insert_child(root, "b", NodeKind::calculated(sum())).unwrap();
        let c = arena
            .insert_child(root, "c", NodeKind::FreeParameter(Parameter::Value(3)))
            .unwrap();

        assert_eq!(arena.len(), 4);
        assert_eq!(arena.get(root).unwrap().children(), &[a, b, c]);
        assert_eq!(arena.get(b).unwrap().parent(), Some(root));
        assert_eq!(arena.get(root).unwrap().parent(), None);
    }

    #[test]
    fn leaves_reject_children() {
        let mut arena = NodeArena::new();
        let root = arena.insert_root("root", sum());
        let leaf = arena
            .insert_child(root, "leaf", NodeKind::FreeParameter(Parameter::Value(1)))
            .unwrap();

        let err = arena
            .insert_child(leaf, "nope", NodeKind::FreeParameter(Parameter::Value(2)))
            .unwrap_err();
        assert!(matches!(err, AggTreeError::InvalidNode { .. }));
        assert_eq!(arena.len(), 2);
        assert!(arena.get(leaf).unwrap().children().is_empty());
    }

    #[test]
    fn foreign_handles_are_rejected() {
        let mut first = NodeArena::<i64>::new();
        let mut second = NodeArena::<i64>::new();
        let root = first.insert_root("root", sum());
        second.insert_root("other", sum());

        assert!(first.get(root).is_ok());
        assert!(matches!(
            second.get(root),
            Err(AggTreeError::InvalidNode { .. })
        ));
    }

    #[test]
    fn depth_counts_edges_from_root() {
        let mut arena = NodeArena::new();
        let root = arena.insert_root("root", sum());
        let mid = arena.insert_child(root, "mid", NodeKind::calculated(sum())).unwrap();
        let leaf = arena
            .insert_child(mid, "leaf", NodeKind::FreeParameter(Parameter::Value(1)))
            .unwrap();

        let depths: Vec<_> = [root, mid, leaf]
            .iter()
            .map(|&id| arena.get(id).unwrap().depth())
            .collect();
        assert_eq!(depths, vec![0, 1, 2]);
    }

    #[test]
    fn children_below_max_depth_are_rejected() {
        let mut arena = NodeArena::new();
        let mut bottom = arena.insert_root("root", sum());
        for level in 0..MAX_DEPTH {
            bottom = arena
                .insert_child(bottom, format!("level-{level}"), NodeKind::calculated(sum()))
                .unwrap();
        }
        assert_eq!(arena.get(bottom).unwrap().depth(), MAX_DEPTH);

        let err = arena
            .insert_child(bottom, "too-deep", NodeKind::FreeParameter(Parameter::Value(1)))
            .unwrap_err();
        assert!(matches!(
            err,
            AggTreeError::TooDeep { parent, limit: MAX_DEPTH } if parent == bottom
        ));
        assert_eq!(arena.len(), MAX_DEPTH + 1);
        assert!(arena.get(bottom).unwrap().children().is_empty());
    }
}
