//! Error types.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors are raised
//! at the violating call and leave the tree, the variable table and the seed
//! table exactly as they were before the call.

use std::fmt;

use thiserror::Error;

use crate::graph::NodeId;

pub type Result<T> = std::result::Result<T, AggTreeError>;

/// Which name-keyed table a lookup or insertion targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Variable,
    Seed,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable => f.write_str("variable"),
            Self::Seed => f.write_str("seed"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AggTreeError {
    /// A node was described with zero or both of {combining function, value},
    /// or a direct-value operation targeted a variable-bound parameter.
    #[error("invalid configuration for node `{node}`: {reason}")]
    Configuration { node: String, reason: &'static str },

    #[error("{kind} `{name}` already exists")]
    DuplicateKey { kind: KeyKind, name: String },

    #[error("{kind} `{name}` does not exist")]
    NotFound { kind: KeyKind, name: String },

    /// The handle does not belong to this tree, or names a node of the wrong
    /// kind for the operation.
    #[error("invalid node {id}: {reason}")]
    InvalidNode { id: NodeId, reason: &'static str },

    /// A child would sit deeper than [`MAX_DEPTH`](crate::graph::MAX_DEPTH)
    /// edges below its root.
    #[error("node {parent} is at the maximum depth of {limit}")]
    TooDeep { parent: NodeId, limit: usize },

    #[error("invalid evaluation config: {reason}")]
    InvalidConfig { reason: String },

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl AggTreeError {
    pub(crate) fn duplicate(kind: KeyKind, name: impl Into<String>) -> Self {
        Self::DuplicateKey {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn not_found(kind: KeyKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn invalid_node(id: NodeId, reason: &'static str) -> Self {
        Self::InvalidNode { id, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_key() {
        let err = AggTreeError::duplicate(KeyKind::Variable, "x");
        assert_eq!(err.to_string(), "variable `x` already exists");

        let err = AggTreeError::not_found(KeyKind::Seed, "x+y");
        assert_eq!(err.to_string(), "seed `x+y` does not exist");
    }

    #[test]
    fn config_parse_errors_convert() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AggTreeError = parse.into();
        assert!(matches!(err, AggTreeError::ConfigParse(_)));
    }
}
