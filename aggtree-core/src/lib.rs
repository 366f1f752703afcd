//! Aggtree Core
//!
//! This crate provides incremental aggregation trees: trees whose leaves hold
//! values and whose internal nodes combine their children's values with a
//! user-supplied function.
//! It implements:
//!
//! - Free parameters holding direct values or shared variables
//! - Memoized evaluation of calculated nodes
//! - Exact invalidation along the path from a changed input to the root
//! - Sequential or bounded-parallel evaluation of sibling subtrees
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: node data model, arena and invalidation
//! - `space`: shared variables, variable spaces and standalone trees
//! - `eval`: evaluation strategies, configuration and the evaluator
//!
//! # Example
//!
//! ```rust
//! use aggtree_core::VariableSpace;
//!
//! let mut space = VariableSpace::new();
//! let seed = space.add_seed_node("x+y", |values: &[f64]| -> f64 { values.iter().sum() })?;
//! let x = space.add_variable("x", 20.0)?;
//! let y = space.add_variable("y", 25.0)?;
//! space.add_parameter(seed, "x", x)?;
//! space.add_parameter(seed, "y", y)?;
//!
//! assert_eq!(space.value(seed)?, 45.0);
//!
//! // Only the path from `x` to the seed is recomputed.
//! space.update_variable("x", 15.0)?;
//! assert_eq!(space.value(seed)?, 40.0);
//! # Ok::<(), aggtree_core::AggTreeError>(())
//! ```

pub mod error;
pub mod eval;
pub mod graph;
pub mod space;

pub use error::{AggTreeError, KeyKind, Result};
pub use eval::{EvalConfig, StrategyKind};
pub use graph::{CombineFn, NodeId, NodeState, Parameter, MAX_DEPTH};
pub use space::{SharedVariable, Tree, VariableHandle, VariableSpace};
