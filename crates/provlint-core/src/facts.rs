//! The fact store: the only channel that crosses unit boundaries.
//!
//! A fact attaches a self-contained value to a declared symbol under a
//! kind tag. Facts exported while analyzing a library unit become
//! visible to analyses of any unit that imports it, directly or through
//! any number of hops. Visibility filtering happens in the pass context;
//! this store only guarantees keyed storage and write exclusion.

use crate::unit::SymbolKey;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Tag identifying one category of fact (e.g. `"api-func"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FactKind(pub &'static str);

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A value storable as a fact.
///
/// Fact values must be owned, self-contained data: they outlive the run
/// that produced them and never borrow into a unit's syntax trees.
pub trait FactValue: Any + Send + Sync + fmt::Debug {
    /// Upcast for downcasting to the concrete value type.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync + fmt::Debug> FactValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn FactValue {
    /// Downcasts the stored value to its concrete type.
    ///
    /// Use this instead of `as_any` on an `Arc<dyn FactValue>`: the
    /// blanket impl covers the `Arc` itself, so an `as_any` call that
    /// resolves at the `Arc` receiver downcasts against the wrong type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Shared table keyed by (declaring symbol, fact kind).
///
/// At most one live value exists per key; a later export overwrites.
/// The interior lock serializes concurrent exports for the same symbol.
#[derive(Debug, Default)]
pub struct FactStore {
    inner: RwLock<HashMap<(SymbolKey, FactKind), Arc<dyn FactValue>>>,
}

impl FactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fact, overwriting any existing value for the key.
    pub fn insert(&self, symbol: SymbolKey, kind: FactKind, value: Arc<dyn FactValue>) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert((symbol, kind), value);
    }

    /// Returns the fact for a key, if present.
    #[must_use]
    pub fn get(&self, symbol: SymbolKey, kind: FactKind) -> Option<Arc<dyn FactValue>> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&(symbol, kind)).cloned()
    }

    /// Returns a snapshot of every fact of one kind, unordered.
    #[must_use]
    pub fn of_kind(&self, kind: FactKind) -> Vec<(SymbolKey, Arc<dyn FactValue>)> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.iter()
            .filter(|((_, k), _)| *k == kind)
            .map(|((s, _), v)| (*s, Arc::clone(v)))
            .collect()
    }

    /// Returns the number of stored facts.
    #[must_use]
    pub fn len(&self) -> usize {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.len()
    }

    /// Returns true if no facts have been exported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
