//! Shared Variables
//!
//! A shared variable is a named value cell that any number of free
//! parameters can read. The store keeps the variables in registration order
//! and, separately, the list of nodes subscribed to each one.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{AggTreeError, KeyKind, Result};
use crate::graph::{ArenaId, NodeId};

/// Cheap handle to a shared variable, usable as a free parameter's value.
///
/// A handle is only valid in the space that created it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableHandle {
    space: ArenaId,
    index: usize,
    name: Arc<str>,
}

impl VariableHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

/// A named value owned by a [`VariableSpace`](super::VariableSpace).
#[derive(Debug)]
pub struct SharedVariable<T> {
    name: Arc<str>,
    value: T,
}

impl<T> SharedVariable<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Display> fmt::Display for SharedVariable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Variables of one space plus the variable → subscriber back-link table.
pub(crate) struct VariableStore<T> {
    space: ArenaId,
    variables: IndexMap<Arc<str>, SharedVariable<T>>,
    /// Subscribers per variable, indexed like `variables`.
    subscribers: Vec<Vec<NodeId>>,
}

impl<T> VariableStore<T> {
    pub(crate) fn new(space: ArenaId) -> Self {
        Self {
            space,
            variables: IndexMap::new(),
            subscribers: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, name: &str, value: T) -> Result<VariableHandle> {
        if self.variables.contains_key(name) {
            return Err(AggTreeError::duplicate(KeyKind::Variable, name));
        }
        let name: Arc<str> = Arc::from(name);
        let (index, _) = self.variables.insert_full(
            Arc::clone(&name),
            SharedVariable {
                name: Arc::clone(&name),
                value,
            },
        );
        self.subscribers.push(Vec::new());
        Ok(VariableHandle {
            space: self.space,
            index,
            name,
        })
    }

    pub(crate) fn handle(&self, name: &str) -> Result<VariableHandle> {
        let (index, key, _) = self
            .variables
            .get_full(name)
            .ok_or_else(|| AggTreeError::not_found(KeyKind::Variable, name))?;
        Ok(VariableHandle {
            space: self.space,
            index,
            name: Arc::clone(key),
        })
    }

    pub(crate) fn get(&self, name: &str) -> Result<&SharedVariable<T>> {
        self.variables
            .get(name)
            .ok_or_else(|| AggTreeError::not_found(KeyKind::Variable, name))
    }

    /// Replace a variable's value and return the nodes reading it.
    pub(crate) fn set(&mut self, name: &str, value: T) -> Result<&[NodeId]> {
        let (index, _, variable) = self
            .variables
            .get_full_mut(name)
            .ok_or_else(|| AggTreeError::not_found(KeyKind::Variable, name))?;
        variable.value = value;
        Ok(&self.subscribers[index])
    }

    /// Check that a handle was issued by this store.
    pub(crate) fn resolve(&self, handle: &VariableHandle) -> Result<()> {
        if handle.space == self.space && handle.index < self.variables.len() {
            Ok(())
        } else {
            Err(AggTreeError::not_found(KeyKind::Variable, handle.name()))
        }
    }

    pub(crate) fn subscribe(&mut self, handle: &VariableHandle, node: NodeId) {
        self.subscribers[handle.index()].push(node);
    }

    pub(crate) fn subscribers(&self, name: &str) -> Result<&[NodeId]> {
        self.variables
            .get_index_of(name)
            .map(|index| self.subscribers[index].as_slice())
            .ok_or_else(|| AggTreeError::not_found(KeyKind::Variable, name))
    }

    /// Current value behind a handle already checked by [`resolve`](Self::resolve).
    pub(crate) fn value_of(&self, handle: &VariableHandle) -> &T {
        &self.variables[handle.index()].value
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &SharedVariable<T>> {
        self.variables.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.variables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_duplicates_without_mutation() {
        let mut store = VariableStore::new(ArenaId::new());
        store.insert("x", 1.0).unwrap();

        let err = store.insert("x", 2.0).unwrap_err();
        assert!(matches!(err, AggTreeError::DuplicateKey { kind: KeyKind::Variable, .. }));
        assert_eq!(store.len(), 1);
        assert_eq!(*store.get("x").unwrap().value(), 1.0);
    }

    #[test]
    fn set_unknown_name_fails() {
        let mut store = VariableStore::<f64>::new(ArenaId::new());
        assert!(matches!(
            store.set("missing", 1.0),
            Err(AggTreeError::NotFound { .. })
        ));
    }

    #[test]
    fn handles_resolve_only_in_their_store() {
        let mut first = VariableStore::new(ArenaId::new());
        let mut second = VariableStore::new(ArenaId::new());
        let handle = first.insert("x", 1).unwrap();
        second.insert("x", 2).unwrap();

        assert!(first.resolve(&handle).is_ok());
        assert!(second.resolve(&handle).is_err());
        assert_eq!(first.handle("x").unwrap(), handle);
    }

    #[test]
    fn subscribers_follow_their_variable() {
        let space = ArenaId::new();
        let mut store = VariableStore::new(space);
        let x = store.insert("x", 1).unwrap();
        store.insert("y", 2).unwrap();

        let node = NodeId::new(space, 3);
        store.subscribe(&x, node);

        assert_eq!(store.subscribers("x").unwrap(), &[node]);
        assert!(store.subscribers("y").unwrap().is_empty());
        assert_eq!(store.set("x", 5).unwrap(), &[node]);
        assert_eq!(*store.value_of(&x), 5);
    }

    #[test]
    fn display_shows_name_and_value() {
        let mut store = VariableStore::new(ArenaId::new());
        store.insert("rate", 0.5).unwrap();
        assert_eq!(store.get("rate").unwrap().to_string(), "rate: 0.5");
    }
}
