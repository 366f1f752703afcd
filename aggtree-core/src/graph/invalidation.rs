//! Invalidation Propagator
//!
//! When an input changes, every calculated ancestor of the input must drop its
//! cached value. The walk goes up the parent chain and stops at the first
//! ancestor that is already dirty: everything above a dirty node was cleared
//! by an earlier walk (or was never computed), so work is bounded by the
//! length of the affected path rather than the size of the tree.

use tracing::trace;

use super::arena::NodeArena;
use super::node::{NodeId, NodeKind};

/// Clears cached values along parent chains.
pub struct InvalidationPropagator<'a, T> {
    arena: &'a NodeArena<T>,
}

impl<'a, T> InvalidationPropagator<'a, T> {
    pub fn new(arena: &'a NodeArena<T>) -> Self {
        Self { arena }
    }

    /// Clear `id` and its ancestors, stopping at the first node without a
    /// cached value. Free parameters are never cached, so starting on one is
    /// a no-op.
    ///
    /// Returns the number of caches cleared.
    pub fn mark_dirty(&self, id: NodeId) -> usize {
        let mut cleared = 0;
        let mut current = Some(id);

        while let Some(node_id) = current {
            let node = &self.arena[node_id];
            let NodeKind::Calculated(calc) = node.kind() else {
                break;
            };
            if !calc.clear() {
                break;
            }
            trace!(node = node.name(), "cleared cached value");
            cleared += 1;
            current = node.parent();
        }

        cleared
    }

    /// Invalidate on behalf of changed inputs: each input is stateless, so the
    /// walk starts at its parent.
    pub fn invalidate_inputs(&self, inputs: &[NodeId]) -> usize {
        inputs
            .iter()
            .filter_map(|&input| self.arena[input].parent())
            .map(|parent| self.mark_dirty(parent))
            .sum()
    }
}
