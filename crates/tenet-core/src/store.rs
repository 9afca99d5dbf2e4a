//! # Fact Store
//!
//! In-memory relations keyed by predicate symbol.
//!
//! A relation keeps its tuples in insertion order (the order solutions are
//! reported in) plus a `BTreeSet` index for deduplication. Nothing is ever
//! removed: the store only grows between reloads.

use crate::{PredicateSym, Tuple};
use std::collections::{BTreeMap, BTreeSet};

/// One predicate's tuples, deduplicated, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Relation {
    rows: Vec<Tuple>,
    index: BTreeSet<Tuple>,
}

impl Relation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tuple. Returns false if it was already present.
    pub fn insert(&mut self, tuple: Tuple) -> bool {
        if self.index.contains(&tuple) {
            return false;
        }
        self.index.insert(tuple.clone());
        self.rows.push(tuple);
        true
    }

    #[must_use]
    pub fn contains(&self, tuple: &Tuple) -> bool {
        self.index.contains(tuple)
    }

    /// Tuples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.rows.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// All relations of a program, keyed by `name/arity`.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    relations: BTreeMap<PredicateSym, Relation>,
}

impl FactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tuple into `sym`'s relation, creating it if needed.
    pub fn insert(&mut self, sym: &PredicateSym, tuple: Tuple) -> bool {
        self.relations
            .entry(sym.clone())
            .or_default()
            .insert(tuple)
    }

    /// Make sure `sym` has a (possibly empty) relation.
    pub fn declare(&mut self, sym: &PredicateSym) {
        self.relations.entry(sym.clone()).or_default();
    }

    #[must_use]
    pub fn relation(&self, sym: &PredicateSym) -> Option<&Relation> {
        self.relations.get(sym)
    }

    #[must_use]
    pub fn contains(&self, sym: &PredicateSym, tuple: &Tuple) -> bool {
        self.relations
            .get(sym)
            .is_some_and(|r| r.contains(tuple))
    }

    /// Predicates in deterministic order.
    pub fn predicates(&self) -> impl Iterator<Item = &PredicateSym> {
        self.relations.keys()
    }

    /// Total tuples across all relations.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.relations.values().map(Relation::len).sum()
    }
}
