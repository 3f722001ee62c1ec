//! Class-hierarchy closure cache
//!
//! The transitive closure of `rdfs:subClassOf` is computed once into two
//! maps (class to ancestors, class to descendants) and cached under a
//! caller-supplied name. Cycles are tolerated: strongly connected classes
//! are mutually super and sub. Reflexive self-pairs appear only when a
//! class asserts `subClassOf` itself.

use crate::{FactSet, ReasonerError, ReasonerResult};
use ahash::AHashSet;
use parking_lot::RwLock;
use rdf_core::{Term, Vocabulary};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::sync::Arc;

/// Precomputed subclass closure
#[derive(Clone, Debug, Default)]
pub struct ClassHierarchy {
    ancestors: FxHashMap<Term, AHashSet<Term>>,
    descendants: FxHashMap<Term, AHashSet<Term>>,
}

impl ClassHierarchy {
    /// Build the closure from the `rdfs:subClassOf` triples in `facts`
    pub fn from_facts(facts: &FactSet) -> Self {
        let mut up: FxHashMap<Term, Vec<Term>> = FxHashMap::default();
        let mut down: FxHashMap<Term, Vec<Term>> = FxHashMap::default();

        for triple in facts {
            if triple.predicate.as_iri() != Some(Vocabulary::RDFS_SUBCLASSOF) {
                continue;
            }
            up.entry(triple.subject.clone())
                .or_default()
                .push(triple.object.clone());
            down.entry(triple.object.clone())
                .or_default()
                .push(triple.subject.clone());
        }

        let mut hierarchy = ClassHierarchy::default();
        for class in up.keys() {
            hierarchy
                .ancestors
                .insert(class.clone(), reachable(class, &up));
        }
        for class in down.keys() {
            hierarchy
                .descendants
                .insert(class.clone(), reachable(class, &down));
        }
        hierarchy
    }

    /// All (transitive) superclasses of `class`
    pub fn superclasses(&self, class: &Term) -> AHashSet<Term> {
        self.ancestors.get(class).cloned().unwrap_or_default()
    }

    /// All (transitive) subclasses of `class`
    pub fn subclasses(&self, class: &Term) -> AHashSet<Term> {
        self.descendants.get(class).cloned().unwrap_or_default()
    }

    /// Whether `sup` is a superclass of `sub`
    pub fn is_superclass(&self, sup: &Term, sub: &Term) -> bool {
        self.ancestors
            .get(sub)
            .map_or(false, |ups| ups.contains(sup))
    }

    /// Whether `sub` is a subclass of `sup`
    pub fn is_subclass(&self, sub: &Term, sup: &Term) -> bool {
        self.is_superclass(sup, sub)
    }

    /// Number of classes with at least one superclass
    pub fn len(&self) -> usize {
        self.ancestors.len()
    }

    /// Whether the hierarchy is empty
    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty()
    }
}

/// Nodes reachable from `start` by following `edges`; `start` itself is
/// included only via an explicit self-edge
fn reachable(start: &Term, edges: &FxHashMap<Term, Vec<Term>>) -> AHashSet<Term> {
    let mut visited: AHashSet<Term> = AHashSet::new();
    let mut queue: VecDeque<&Term> = VecDeque::new();

    let self_loop = edges
        .get(start)
        .map_or(false, |direct| direct.contains(start));

    if let Some(direct) = edges.get(start) {
        for next in direct {
            queue.push_back(next);
        }
    }

    while let Some(node) = queue.pop_front() {
        if !visited.insert(node.clone()) {
            continue;
        }
        if let Some(next_nodes) = edges.get(node) {
            for next in next_nodes {
                if !visited.contains(next) {
                    queue.push_back(next);
                }
            }
        }
    }

    if !self_loop {
        visited.remove(start);
    }
    visited
}

/// Named cache of computed hierarchies
#[derive(Default)]
pub struct TBoxCache {
    entries: RwLock<FxHashMap<String, Arc<ClassHierarchy>>>,
}

impl TBoxCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the hierarchy for `facts` and store it under `name`
    pub fn compute(&self, name: impl Into<String>, facts: &FactSet) -> Arc<ClassHierarchy> {
        let hierarchy = Arc::new(ClassHierarchy::from_facts(facts));
        self.entries
            .write()
            .insert(name.into(), Arc::clone(&hierarchy));
        hierarchy
    }

    /// Fetch a cached hierarchy
    pub fn get(&self, name: &str) -> ReasonerResult<Arc<ClassHierarchy>> {
        self.entries
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ReasonerError::NotFound(name.to_string()))
    }

    /// Drop a cached hierarchy; missing names are fine
    pub fn invalidate(&self, name: &str) {
        self.entries.write().remove(name);
    }
}
