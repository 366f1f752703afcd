//! Evaluation
//!
//! Values are pulled on demand. Reading a calculated node returns its cached
//! value when it has one; otherwise its children are evaluated by the
//! configured [`EvaluationStrategy`] and the result is memoized.
//!
//! Two strategies ship with the crate:
//!
//! - [`Sequential`]: children in order on the calling thread.
//! - [`BoundedParallel`]: one task per child on a fixed-size worker pool,
//!   recursively, with results assembled in declaration order.
//!
//! The strategy affects latency only. For combining functions without side
//! effects the observed values are identical.

mod config;
mod evaluator;
mod strategy;

pub use config::{EvalConfig, StrategyKind};
pub(crate) use evaluator::Evaluator;
pub use strategy::{BoundedParallel, EvaluationStrategy, Sequential};
