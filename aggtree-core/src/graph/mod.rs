//! Aggregation Tree
//!
//! This module implements the tree that holds values at its leaves and
//! derives values at its internal nodes.
//!
//! # Overview
//!
//! - Free parameters are leaves. They hold a direct value or a handle to a
//!   shared variable.
//! - Calculated nodes apply a combining function to the values of their
//!   children, in declaration order, and memoize the result.
//!
//! When an input changes, the [`InvalidationPropagator`] clears the cached
//! values on the path from that input to the root. Nothing else is touched.
//!
//! # Design Decisions
//!
//! 1. Nodes live in an arena and refer to each other by [`NodeId`], so parent
//!    back-links need no shared ownership.
//!
//! 2. The leaf/calculated split is an enum payload ([`NodeKind`]) rather than
//!    a trait hierarchy.
//!
//! 3. Caches sit behind a lock so that sibling subtrees can be evaluated on
//!    different threads while the arena itself is shared immutably.
//!
//! 4. Trees are at most [`MAX_DEPTH`] levels deep. Inserting a deeper child
//!    fails with [`AggTreeError::TooDeep`](crate::AggTreeError::TooDeep).

mod arena;
mod invalidation;
mod node;

pub use arena::{NodeArena, MAX_DEPTH};
pub use invalidation::InvalidationPropagator;
pub use node::{ArenaId, Calculation, CombineFn, Node, NodeId, NodeKind, NodeState, Parameter};
