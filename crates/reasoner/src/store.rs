//! Derived-fact store adapter
//!
//! Derived triples are kept strictly apart from explicit triples: the
//! explicit side is only reachable through the index layer's lookup
//! contract, the derived side lives behind [`DerivedFactStore`].
//! `clear_all` removes every derived fact and never touches explicit ones,
//! which is all a re-materialization workflow needs.

use crate::{FactSet, ReasonerResult};
use dashmap::DashMap;
use parking_lot::RwLock;
use rdf_core::{Triple, TriplePattern};
use std::sync::Arc;

use crate::matcher::match_pattern;

/// Pattern lookup over the explicit index - the single contract the
/// reasoner consumes from the index layer
pub trait TripleLookup: Send + Sync {
    /// All triples matching the pattern
    fn lookup(&self, pattern: &TriplePattern) -> ReasonerResult<Vec<Triple>>;
}

/// In-memory explicit index
///
/// A hash set of triples with linear pattern scans; uniform iteration cost
/// is all the evaluator assumes. Serves as the index layer for tests and
/// for callers without a persistent backend.
#[derive(Default)]
pub struct MemoryIndex {
    triples: RwLock<FactSet>,
}

impl MemoryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from triples
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        Self {
            triples: RwLock::new(triples.into_iter().collect()),
        }
    }

    /// Insert a triple; returns false if already present
    pub fn insert(&self, triple: Triple) -> bool {
        self.triples.write().insert(triple)
    }

    /// Remove a triple; missing entries are fine
    pub fn remove(&self, triple: &Triple) -> bool {
        self.triples.write().remove(triple)
    }

    /// Number of explicit triples
    pub fn len(&self) -> usize {
        self.triples.read().len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.triples.read().is_empty()
    }

    /// Snapshot of the full content
    pub fn snapshot(&self) -> FactSet {
        self.triples.read().clone()
    }
}

impl TripleLookup for MemoryIndex {
    fn lookup(&self, pattern: &TriplePattern) -> ReasonerResult<Vec<Triple>> {
        let triples = self.triples.read();
        Ok(triples
            .iter()
            .filter(|t| match_pattern(pattern, t).is_some())
            .cloned()
            .collect())
    }
}

/// Fetch every triple visible through a lookup contract
pub fn fetch_all(lookup: &dyn TripleLookup) -> ReasonerResult<FactSet> {
    let everything = TriplePattern::new(
        rdf_core::Term::var("s"),
        rdf_core::Term::var("p"),
        rdf_core::Term::var("o"),
    );
    Ok(lookup.lookup(&everything)?.into_iter().collect())
}

/// Store of derived triples, separate from the explicit partition
pub trait DerivedFactStore: Send + Sync {
    /// Insert a batch of derived triples; duplicates are harmless
    fn insert_derived(&self, batch: &[Triple]) -> ReasonerResult<()>;

    /// Delete a batch of derived triples; missing entries are fine
    fn delete_derived(&self, batch: &[Triple]) -> ReasonerResult<usize>;

    /// Membership query on the derived partition
    fn derived_exists(&self, triple: &Triple) -> bool;

    /// Count of derived-only facts
    fn count(&self) -> usize;

    /// Remove every derived fact; explicit facts are untouched
    fn clear_all(&self) -> usize;

    /// Matches in the derived partition
    fn lookup_derived(&self, pattern: &TriplePattern) -> Vec<Triple>;

    /// Matches in the explicit partition, through the index layer
    fn lookup_explicit(&self, pattern: &TriplePattern) -> ReasonerResult<Vec<Triple>>;

    /// Union of both partitions; duplicates are allowed
    fn lookup_all(&self, pattern: &TriplePattern) -> ReasonerResult<Vec<Triple>> {
        let mut matches = self.lookup_explicit(pattern)?;
        matches.extend(self.lookup_derived(pattern));
        Ok(matches)
    }
}

/// Lock-free in-memory derived store over an explicit lookup
pub struct InMemoryDerivedStore {
    derived: DashMap<Triple, ()>,
    explicit: Arc<dyn TripleLookup>,
}

impl InMemoryDerivedStore {
    /// Create a derived store delegating explicit lookups to `explicit`
    pub fn new(explicit: Arc<dyn TripleLookup>) -> Self {
        Self {
            derived: DashMap::new(),
            explicit,
        }
    }

    /// Snapshot of the derived partition
    pub fn snapshot(&self) -> FactSet {
        self.derived.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl DerivedFactStore for InMemoryDerivedStore {
    fn insert_derived(&self, batch: &[Triple]) -> ReasonerResult<()> {
        for triple in batch {
            self.derived.insert(triple.clone(), ());
        }
        Ok(())
    }

    fn delete_derived(&self, batch: &[Triple]) -> ReasonerResult<usize> {
        let mut removed = 0;
        for triple in batch {
            if self.derived.remove(triple).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn derived_exists(&self, triple: &Triple) -> bool {
        self.derived.contains_key(triple)
    }

    fn count(&self) -> usize {
        self.derived.len()
    }

    fn clear_all(&self) -> usize {
        let removed = self.derived.len();
        self.derived.clear();
        removed
    }

    fn lookup_derived(&self, pattern: &TriplePattern) -> Vec<Triple> {
        self.derived
            .iter()
            .filter(|entry| match_pattern(pattern, entry.key()).is_some())
            .map(|entry| entry.key().clone())
            .collect()
    }

    fn lookup_explicit(&self, pattern: &TriplePattern) -> ReasonerResult<Vec<Triple>> {
        self.explicit.lookup(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_core::Term;

    fn iri(s: &str) -> Term {
        Term::iri(format!("http://ex/{s}"))
    }

    fn t(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(iri(s), iri(p), iri(o))
    }

    fn store_with_explicit(explicit: Vec<Triple>) -> InMemoryDerivedStore {
        InMemoryDerivedStore::new(Arc::new(MemoryIndex::from_triples(explicit)))
    }

    #[test]
    fn test_insert_is_idempotent() {
        let store = store_with_explicit(vec![]);
        let batch = vec![t("a", "p", "b"), t("a", "p", "b")];
        store.insert_derived(&batch).unwrap();
        store.insert_derived(&batch).unwrap();
        assert_eq!(store.count(), 1);
        assert!(store.derived_exists(&t("a", "p", "b")));
    }

    #[test]
    fn test_delete_tolerates_missing() {
        let store = store_with_explicit(vec![]);
        store.insert_derived(&[t("a", "p", "b")]).unwrap();
        let removed = store
            .delete_derived(&[t("a", "p", "b"), t("x", "p", "y")])
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_clear_all_preserves_explicit() {
        let explicit = vec![t("e1", "p", "o"), t("e2", "p", "o")];
        let store = store_with_explicit(explicit.clone());
        store.insert_derived(&[t("d1", "p", "o"), t("d2", "p", "o")]).unwrap();

        let everything =
            TriplePattern::new(Term::var("s"), Term::var("p"), Term::var("o"));
        let explicit_before = {
            let mut v = store.lookup_explicit(&everything).unwrap();
            v.sort_unstable();
            v
        };

        assert_eq!(store.clear_all(), 2);
        assert_eq!(store.count(), 0);

        let explicit_after = {
            let mut v = store.lookup_explicit(&everything).unwrap();
            v.sort_unstable();
            v
        };
        assert_eq!(explicit_before, explicit_after);
        assert_eq!(explicit_after.len(), 2);
    }

    #[test]
    fn test_lookup_all_unions_partitions() {
        let store = store_with_explicit(vec![t("e", "p", "o")]);
        store.insert_derived(&[t("d", "p", "o")]).unwrap();

        let pattern = TriplePattern::new(Term::var("s"), iri("p"), iri("o"));
        let all = store.lookup_all(&pattern).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_lookup_derived_pattern() {
        let store = store_with_explicit(vec![]);
        store
            .insert_derived(&[t("a", "p", "b"), t("a", "q", "c"), t("b", "p", "c")])
            .unwrap();

        let pattern = TriplePattern::new(iri("a"), Term::var("p"), Term::var("o"));
        assert_eq!(store.lookup_derived(&pattern).len(), 2);
    }

    #[test]
    fn test_fetch_all() {
        let index = MemoryIndex::from_triples(vec![t("a", "p", "b"), t("b", "p", "c")]);
        let facts = fetch_all(&index).unwrap();
        assert_eq!(facts.len(), 2);
    }
}
