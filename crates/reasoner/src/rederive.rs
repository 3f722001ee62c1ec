//! Forward re-derivation
//!
//! After a deletion, each potentially invalid fact either has an alternative
//! support or it does not. The partition uses the greatest fixpoint over the
//! invalid set: a fact is kept as soon as it becomes single-step derivable
//! from the surviving facts plus everything already kept, iterating to
//! quiescence. Re-derivation never fails on semantic grounds; a fact with no
//! remaining support goes into `delete`, not into an error.

use crate::compile::CompiledRuleSet;
use crate::matcher::{match_pattern, match_with};
use crate::rule::{Bindings, BodyAtom, Rule};
use crate::telemetry::{self, events};
use crate::FactSet;
use rdf_core::Triple;

/// Partition of the potentially invalid set
#[derive(Clone, Debug)]
pub struct RederiveResult {
    /// Facts with alternative support; they stay derived
    pub keep: FactSet,
    /// Facts with no remaining support; they are removed
    pub delete: FactSet,
}

/// Whether some rule derives `fact` in a single step from `facts`
///
/// The fact itself never counts as its own support.
pub fn can_rederive(fact: &Triple, facts: &FactSet, rules: &CompiledRuleSet) -> bool {
    rules.rules().any(|rule| derives(rule, fact, facts))
}

fn derives(rule: &Rule, fact: &Triple, facts: &FactSet) -> bool {
    let Some(seed) = match_pattern(rule.head(), fact) else {
        return false;
    };

    let mut substitutions: Vec<Bindings> = vec![seed];
    for atom in rule.body() {
        match atom {
            BodyAtom::Pattern(pattern) => {
                let mut extended = Vec::new();
                for subst in &substitutions {
                    for support in facts.iter().filter(|t| *t != fact) {
                        if let Some(bindings) = match_with(pattern, support, subst) {
                            extended.push(bindings);
                        }
                    }
                }
                substitutions = extended;
            }
            BodyAtom::Condition(condition) => {
                substitutions.retain(|s| condition.evaluate(s).unwrap_or(true));
            }
        }
        if substitutions.is_empty() {
            return false;
        }
    }

    substitutions.iter().any(|s| rule.evaluate_conditions(s))
}

/// Split the potentially invalid set into keep / delete
///
/// `keep ∪ delete = potentially_invalid`. Runs the greatest-fixpoint
/// iteration: starting from `all_facts ∖ deleted ∖ potentially_invalid`,
/// any candidate that becomes derivable joins the support set, until
/// nothing more can be kept.
pub fn partition_rederivable(
    potentially_invalid: &FactSet,
    all_facts: &FactSet,
    deleted: &FactSet,
    rules: &CompiledRuleSet,
) -> RederiveResult {
    let mut support: FactSet = all_facts
        .iter()
        .filter(|t| !deleted.contains(*t) && !potentially_invalid.contains(*t))
        .cloned()
        .collect();

    let mut keep = FactSet::default();
    loop {
        let mut changed = false;
        for candidate in potentially_invalid {
            if keep.contains(candidate) {
                continue;
            }
            if can_rederive(candidate, &support, rules) {
                keep.insert(candidate.clone());
                support.insert(candidate.clone());
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let delete: FactSet = potentially_invalid.difference(&keep).cloned().collect();

    telemetry::emit(
        events::FORWARD_REDERIVE_COMPLETE,
        &[
            ("kept", keep.len().to_string()),
            ("deleted", delete.len().to_string()),
        ],
    );

    RederiveResult { keep, delete }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::config::ReasoningConfig;
    use crate::schema::extract_schema;
    use rdf_core::{Term, Vocabulary};

    fn iri(s: &str) -> Term {
        Term::iri(format!("http://ex/{s}"))
    }

    fn sub_class(sub: &str, sup: &str) -> Triple {
        Triple::new(iri(sub), Term::iri(Vocabulary::RDFS_SUBCLASSOF), iri(sup))
    }

    fn type_of(s: &str, class: &str) -> Triple {
        Triple::new(iri(s), Term::iri(Vocabulary::RDF_TYPE), iri(class))
    }

    fn compiled_for(facts: &FactSet) -> crate::compile::CompiledRuleSet {
        let schema = extract_schema(facts).unwrap();
        compile(&ReasoningConfig::full_materialization(), &schema, None).unwrap()
    }

    #[test]
    fn test_can_rederive_with_alternative_support() {
        let facts: FactSet = [
            sub_class("GradStudent", "Person"),
            type_of("alice", "GradStudent"),
        ]
        .into_iter()
        .collect();
        let compiled = compiled_for(&facts);

        assert!(can_rederive(&type_of("alice", "Person"), &facts, &compiled));
        assert!(!can_rederive(&type_of("bob", "Person"), &facts, &compiled));
    }

    #[test]
    fn test_fact_is_not_its_own_support() {
        // A symmetric pair supports each other; a lone sameAs-style fact
        // must not prove itself.
        let facts: FactSet = [
            Triple::new(
                iri("knows"),
                Term::iri(Vocabulary::RDF_TYPE),
                Term::iri(Vocabulary::OWL_SYMMETRIC_PROPERTY),
            ),
            Triple::new(iri("a"), iri("knows"), iri("b")),
        ]
        .into_iter()
        .collect();
        let compiled = compiled_for(&facts);

        // (b knows a) is derivable from (a knows b).
        let forward = Triple::new(iri("b"), iri("knows"), iri("a"));
        assert!(can_rederive(&forward, &facts, &compiled));

        // Without (a knows b), (b knows a) cannot prove itself.
        let without: FactSet = facts
            .iter()
            .filter(|t| t.subject != iri("a"))
            .cloned()
            .collect();
        assert!(!can_rederive(&forward, &without, &compiled));
    }

    #[test]
    fn test_partition_keeps_rederivable_facts() {
        let all: FactSet = [
            sub_class("Student", "Person"),
            sub_class("GradStudent", "Person"),
            type_of("alice", "Student"),
            type_of("alice", "GradStudent"),
            type_of("alice", "Person"),
        ]
        .into_iter()
        .collect();
        let compiled = compiled_for(&all);

        let deleted: FactSet = [type_of("alice", "Student")].into_iter().collect();
        let invalid: FactSet = [type_of("alice", "Person")].into_iter().collect();

        let result = partition_rederivable(&invalid, &all, &deleted, &compiled);
        assert!(result.keep.contains(&type_of("alice", "Person")));
        assert!(result.delete.is_empty());
    }

    #[test]
    fn test_partition_deletes_unsupported_facts() {
        let all: FactSet = [
            sub_class("Student", "Person"),
            type_of("alice", "Student"),
            type_of("alice", "Person"),
        ]
        .into_iter()
        .collect();
        let compiled = compiled_for(&all);

        let deleted: FactSet = [type_of("alice", "Student")].into_iter().collect();
        let invalid: FactSet = [type_of("alice", "Person")].into_iter().collect();

        let result = partition_rederivable(&invalid, &all, &deleted, &compiled);
        assert!(result.keep.is_empty());
        assert!(result.delete.contains(&type_of("alice", "Person")));
    }

    #[test]
    fn test_transitive_rederivation_cascades() {
        // alice:Person is rederivable via GradStudent; alice:Agent then
        // becomes rederivable from the kept alice:Person.
        let all: FactSet = [
            sub_class("Student", "Person"),
            sub_class("GradStudent", "Person"),
            sub_class("Person", "Agent"),
            type_of("alice", "Student"),
            type_of("alice", "GradStudent"),
            type_of("alice", "Person"),
            type_of("alice", "Agent"),
        ]
        .into_iter()
        .collect();
        let compiled = compiled_for(&all);

        let deleted: FactSet = [type_of("alice", "Student")].into_iter().collect();
        let invalid: FactSet = [type_of("alice", "Person"), type_of("alice", "Agent")]
            .into_iter()
            .collect();

        let result = partition_rederivable(&invalid, &all, &deleted, &compiled);
        assert!(result.keep.contains(&type_of("alice", "Person")));
        assert!(result.keep.contains(&type_of("alice", "Agent")));
        assert!(result.delete.is_empty());
    }

    #[test]
    fn test_cyclic_support_is_kept_under_greatest_fixpoint() {
        // a sameAs b asserted; b sameAs a derived via eq_sym. Deleting an
        // unrelated fact must not tear down the cycle: b sameAs a remains
        // derivable from the surviving assertion.
        let same = |a: &str, b: &str| {
            Triple::new(iri(a), Term::iri(Vocabulary::OWL_SAME_AS), iri(b))
        };
        let all: FactSet = [
            same("a", "b"),
            same("b", "a"),
            type_of("c", "Thing"),
        ]
        .into_iter()
        .collect();
        let compiled = compiled_for(&all);

        let deleted: FactSet = [type_of("c", "Thing")].into_iter().collect();
        let invalid: FactSet = [same("b", "a")].into_iter().collect();

        let result = partition_rederivable(&invalid, &all, &deleted, &compiled);
        assert!(result.keep.contains(&same("b", "a")));
    }
}
