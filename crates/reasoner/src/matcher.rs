//! Pattern matching and variable binding
//!
//! The only bulk operation the evaluator uses is [`filter_matching`]; it
//! treats the fact set as a hash set with uniform iteration cost.

use crate::rule::Bindings;
use rdf_core::{Term, Triple, TriplePattern};

/// Match one pattern position against one fact position
///
/// Variables bind (or must agree with an existing binding); ground terms
/// must be equal.
fn match_position(pattern: &Term, value: &Term, bindings: &mut Bindings) -> bool {
    match pattern {
        Term::Variable(name) => match bindings.get(name) {
            Some(bound) => bound == value,
            None => {
                bindings.insert(name.clone(), value.clone());
                true
            }
        },
        ground => ground == value,
    }
}

/// Match a pattern against a fact, producing fresh bindings
pub fn match_pattern(pattern: &TriplePattern, triple: &Triple) -> Option<Bindings> {
    match_with(pattern, triple, &Bindings::default())
}

/// Match a pattern against a fact, extending existing bindings
///
/// Re-encounters of an already-bound variable must agree; on mismatch the
/// input bindings are returned untouched as `None`.
pub fn match_with(
    pattern: &TriplePattern,
    triple: &Triple,
    bindings: &Bindings,
) -> Option<Bindings> {
    let mut extended = bindings.clone();

    if match_position(&pattern.subject, &triple.subject, &mut extended)
        && match_position(&pattern.predicate, &triple.predicate, &mut extended)
        && match_position(&pattern.object, &triple.object, &mut extended)
    {
        Some(extended)
    } else {
        None
    }
}

/// All facts matching the pattern
pub fn filter_matching<'a, I>(facts: I, pattern: &TriplePattern) -> Vec<&'a Triple>
where
    I: IntoIterator<Item = &'a Triple>,
{
    facts
        .into_iter()
        .filter(|t| match_pattern(pattern, t).is_some())
        .collect()
}
