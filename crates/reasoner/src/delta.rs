//! Semi-naive delta computation
//!
//! For a rule with *n* body patterns, each position takes a turn as the
//! delta slot: it joins only against Δ, positions before it against F∖Δ,
//! positions after it against F. Every new derivation needs at least one
//! body match in Δ and is produced exactly once.

use crate::matcher::match_with;
use crate::rule::{Bindings, BodyAtom, Rule};
use crate::FactSet;
use rdf_core::Triple;
use std::cmp::Ordering;

/// Which side of the decomposition a pattern joins against
enum JoinSource {
    OldOnly,
    DeltaOnly,
    All,
}

/// Compute all derivations of `rule` that require at least one match in Δ
///
/// `existing` is subtracted from the output. `max_derivations` is a soft
/// cutoff: enumeration stops once the cap is reached.
pub fn apply_rule_delta(
    rule: &Rule,
    facts: &FactSet,
    delta: &FactSet,
    existing: &FactSet,
    max_derivations: Option<usize>,
) -> FactSet {
    let mut out = FactSet::default();
    let pattern_count = rule.pattern_count();
    if pattern_count == 0 {
        return out;
    }

    let slots: Vec<usize> = match &rule.meta().delta_positions {
        Some(positions) => positions.clone(),
        None => (0..pattern_count).collect(),
    };

    'slots: for slot in slots {
        let mut substitutions: Vec<Bindings> = vec![Bindings::default()];
        let mut pattern_index = 0usize;

        for atom in rule.body() {
            match atom {
                BodyAtom::Pattern(pattern) => {
                    let source = match pattern_index.cmp(&slot) {
                        Ordering::Less => JoinSource::OldOnly,
                        Ordering::Equal => JoinSource::DeltaOnly,
                        Ordering::Greater => JoinSource::All,
                    };

                    let mut extended: Vec<Bindings> = Vec::new();
                    for subst in &substitutions {
                        let join = |fact: &Triple, acc: &mut Vec<Bindings>| {
                            if let Some(bindings) = match_with(pattern, fact, subst) {
                                acc.push(bindings);
                            }
                        };
                        match source {
                            JoinSource::OldOnly => {
                                for fact in facts.iter().filter(|f| !delta.contains(*f)) {
                                    join(fact, &mut extended);
                                }
                            }
                            JoinSource::DeltaOnly => {
                                for fact in delta {
                                    join(fact, &mut extended);
                                }
                            }
                            JoinSource::All => {
                                for fact in facts {
                                    join(fact, &mut extended);
                                }
                            }
                        }
                    }

                    substitutions = extended;
                    pattern_index += 1;
                }
                BodyAtom::Condition(condition) => {
                    // Unbound conditions are deferred; the final check below
                    // rejects any binding that never satisfies them.
                    substitutions.retain(|s| condition.evaluate(s).unwrap_or(true));
                }
            }

            if substitutions.is_empty() {
                continue 'slots;
            }
        }

        for subst in substitutions {
            if !rule.evaluate_conditions(&subst) {
                continue;
            }
            let head = Rule::substitute(rule.head(), &subst);
            let Some(derived) = head.to_triple() else {
                continue;
            };
            if existing.contains(&derived) {
                continue;
            }
            out.insert(derived);
            if let Some(cap) = max_derivations {
                if out.len() >= cap {
                    return out;
                }
            }
        }
    }

    out
}
