//! Variable Spaces
//!
//! A [`VariableSpace`] is the owner of everything a computation needs: the
//! shared variables, the seed trees that read them, and the evaluation
//! strategy. A [`Tree`] is the same machinery for a single root without a
//! variable namespace.
//!
//! # Concepts
//!
//! ## Shared variables
//!
//! A variable is a named value cell. Free parameters created with a
//! [`VariableHandle`] read the variable's current value every time they are
//! evaluated, and are recorded as its subscribers.
//!
//! ## Seeds
//!
//! A seed is a root calculated node owned by the space and retrievable by
//! name. Variable names are global to the space, so two seeds may read the
//! same variable.

mod tree;
mod variable;
mod variable_space;

pub use tree::Tree;
pub use variable::{SharedVariable, VariableHandle};
pub(crate) use variable::VariableStore;
pub use variable_space::VariableSpace;
