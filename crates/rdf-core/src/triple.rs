//! RDF triples and triple patterns

use crate::Term;
use rustc_hash::FxHashSet;
use std::fmt;

/// Ground RDF triple: subject-predicate-object
///
/// All three positions are ground terms; a fact never contains a variable.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    /// Subject (IRI or blank node)
    pub subject: Term,

    /// Predicate (IRI)
    pub predicate: Term,

    /// Object (any ground term)
    pub object: Term,
}

impl Triple {
    /// Create a new ground triple
    ///
    /// # Panics
    ///
    /// Panics if any position is a variable.
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        assert!(subject.is_ground(), "Subject must be ground");
        assert!(predicate.is_ground(), "Predicate must be ground");
        assert!(object.is_ground(), "Object must be ground");

        Triple {
            subject,
            predicate,
            object,
        }
    }

    /// Create a new triple without validation (for hot paths)
    ///
    /// Caller must ensure all positions are ground.
    pub fn new_unchecked(subject: Term, predicate: Term, object: Term) -> Self {
        Triple {
            subject,
            predicate,
            object,
        }
    }

    /// Positions as an array, subject first
    pub fn positions(&self) -> [&Term; 3] {
        [&self.subject, &self.predicate, &self.object]
    }
}

impl fmt::Debug for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.subject, self.predicate, self.object)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// Triple pattern: any position may be a variable
///
/// Matching a pattern against a fact binds its variables; re-encounters of
/// the same variable within one pattern must agree.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    /// Subject position
    pub subject: Term,

    /// Predicate position
    pub predicate: Term,

    /// Object position
    pub object: Term,
}

impl TriplePattern {
    /// Create a new pattern
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        TriplePattern {
            subject,
            predicate,
            object,
        }
    }

    /// Positions as an array, subject first
    pub fn positions(&self) -> [&Term; 3] {
        [&self.subject, &self.predicate, &self.object]
    }

    /// Check if the pattern has no variables
    pub fn is_ground(&self) -> bool {
        self.subject.is_ground() && self.predicate.is_ground() && self.object.is_ground()
    }

    /// Names of the variables appearing in the pattern
    pub fn variables(&self) -> FxHashSet<&str> {
        self.positions()
            .into_iter()
            .filter_map(Term::as_variable)
            .collect()
    }

    /// Convert a ground pattern into a triple
    pub fn to_triple(&self) -> Option<Triple> {
        if self.is_ground() {
            Some(Triple::new_unchecked(
                self.subject.clone(),
                self.predicate.clone(),
                self.object.clone(),
            ))
        } else {
            None
        }
    }
}

impl From<Triple> for TriplePattern {
    fn from(triple: Triple) -> Self {
        TriplePattern {
            subject: triple.subject,
            predicate: triple.predicate,
            object: triple.object,
        }
    }
}

impl fmt::Debug for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Term {
        Term::iri(s)
    }

    #[test]
    fn test_triple_creation() {
        let t = Triple::new(iri("http://s"), iri("http://p"), iri("http://o"));
        assert_eq!(t.subject, iri("http://s"));
    }

    #[test]
    #[should_panic(expected = "must be ground")]
    fn test_triple_rejects_variables() {
        Triple::new(Term::var("x"), iri("http://p"), iri("http://o"));
    }

    #[test]
    fn test_pattern_variables() {
        let p = TriplePattern::new(Term::var("x"), iri("http://p"), Term::var("y"));
        let vars = p.variables();
        assert_eq!(vars.len(), 2);
        assert!(vars.contains("x"));
        assert!(!p.is_ground());
    }

    #[test]
    fn test_repeated_variable_counted_once() {
        let p = TriplePattern::new(Term::var("x"), iri("http://p"), Term::var("x"));
        assert_eq!(p.variables().len(), 1);
    }

    #[test]
    fn test_ground_pattern_to_triple() {
        let p = TriplePattern::new(iri("http://s"), iri("http://p"), iri("http://o"));
        let t = p.to_triple().unwrap();
        assert_eq!(t.predicate, iri("http://p"));

        let open = TriplePattern::new(Term::var("x"), iri("http://p"), iri("http://o"));
        assert!(open.to_triple().is_none());
    }
}
