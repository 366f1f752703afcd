//! Evaluation configuration.
//!
//! Selects the strategy used by a space or tree. The config is a plain serde
//! struct, so callers can embed it in their own configuration files.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::strategy::{BoundedParallel, EvaluationStrategy, Sequential};
use crate::error::{AggTreeError, Result};

/// Which strategy evaluates the children of calculated nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    pub strategy: StrategyKind,
    /// Worker count for the parallel strategy. `None` means one worker per
    /// available CPU.
    pub pool_size: Option<usize>,
}

impl EvalConfig {
    pub fn sequential() -> Self {
        Self::default()
    }

    pub fn parallel(pool_size: Option<usize>) -> Self {
        Self {
            strategy: StrategyKind::Parallel,
            pool_size,
        }
    }

    /// Parse and validate a JSON config such as
    /// `{"strategy": "parallel", "pool_size": 4}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool_size == Some(0) {
            return Err(AggTreeError::InvalidConfig {
                reason: "pool_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Build the strategy object described by this config.
    pub fn build_strategy<T>(&self) -> Result<Arc<dyn EvaluationStrategy<T>>>
    where
        T: Send + 'static,
    {
        self.validate()?;
        match self.strategy {
            StrategyKind::Sequential => {
                if let Some(pool_size) = self.pool_size {
                    warn!(pool_size, "pool_size is ignored by the sequential strategy");
                }
                Ok(Arc::new(Sequential))
            }
            StrategyKind::Parallel => Ok(Arc::new(BoundedParallel::new(self.pool_size)?)),
        }
    }
}
