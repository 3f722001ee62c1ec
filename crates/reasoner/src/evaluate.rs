//! Semi-naive fixpoint evaluator
//!
//! The fixpoint driver: seeds Δ with the initial facts (or a caller delta),
//! applies every compiled rule to Δ each iteration, and stops when an
//! iteration produces nothing new. Within an iteration the per-rule
//! computations are independent; parallel mode fans them across workers and
//! merges the resulting sets, producing the same closure as sequential mode.

use crate::compile::CompiledRuleSet;
use crate::config::ModeOpts;
use crate::delta::apply_rule_delta;
use crate::rule::Rule;
use crate::telemetry::{self, events};
use crate::{FactSet, ReasonerError, ReasonerResult};
use rayon::prelude::*;
use rdf_core::Triple;
use std::time::{Duration, Instant};

/// Sink for newly derived triples, called once per iteration
pub type StoreFn<'a> = dyn FnMut(&[Triple]) -> ReasonerResult<()> + 'a;

/// Evaluator options
#[derive(Clone, Debug)]
pub struct EvalOptions {
    /// Fan per-rule computations across worker threads
    pub parallel: bool,
    /// Fixpoint iteration cap; exceeding it is an error, not a partial result
    pub max_iterations: usize,
    /// Soft cap on derivations per rule application
    pub max_derivations: Option<usize>,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_iterations: 100,
            max_derivations: None,
        }
    }
}

impl From<&ModeOpts> for EvalOptions {
    fn from(opts: &ModeOpts) -> Self {
        Self {
            parallel: opts.parallel,
            max_iterations: opts.max_iterations,
            max_derivations: opts.max_derivations,
        }
    }
}

/// Statistics from one materialization run
#[derive(Clone, Debug, Default)]
pub struct MaterializeStats {
    /// Number of fixpoint iterations
    pub iterations: usize,
    /// New derivations per iteration
    pub per_iteration: Vec<usize>,
    /// Total derived triples
    pub total_derived: usize,
    /// Wall-clock duration
    pub duration: Duration,
}

/// The semi-naive fixpoint driver
pub struct SemiNaiveEvaluator<'a> {
    rules: &'a CompiledRuleSet,
    opts: EvalOptions,
}

impl<'a> SemiNaiveEvaluator<'a> {
    /// Create an evaluator over a compiled rule set
    pub fn new(rules: &'a CompiledRuleSet, opts: EvalOptions) -> Self {
        Self { rules, opts }
    }

    /// Compute the closure of `initial`, seeding Δ with the whole input
    pub fn materialize(
        &self,
        initial: &FactSet,
        store_fn: &mut StoreFn<'_>,
    ) -> ReasonerResult<(FactSet, MaterializeStats)> {
        self.materialize_from_delta(initial.clone(), initial.clone(), store_fn)
    }

    /// Compute the closure of `facts`, seeding Δ with `delta` only
    ///
    /// `delta` must be a subset of `facts`; this is the entry point for
    /// incremental addition.
    pub fn materialize_from_delta(
        &self,
        facts: FactSet,
        delta: FactSet,
        store_fn: &mut StoreFn<'_>,
    ) -> ReasonerResult<(FactSet, MaterializeStats)> {
        telemetry::span(
            events::MATERIALIZE_START,
            events::MATERIALIZE_STOP,
            &[
                ("facts", facts.len().to_string()),
                ("delta", delta.len().to_string()),
                ("rules", self.rules.rule_count().to_string()),
            ],
            || self.run(facts, delta, store_fn),
        )
    }

    fn run(
        &self,
        mut facts: FactSet,
        mut delta: FactSet,
        store_fn: &mut StoreFn<'_>,
    ) -> ReasonerResult<(FactSet, MaterializeStats)> {
        let started = Instant::now();
        let mut stats = MaterializeStats::default();
        let rules: Vec<&Rule> = self.rules.rules().collect();

        while !delta.is_empty() {
            if stats.iterations >= self.opts.max_iterations {
                return Err(ReasonerError::MaxIterationsExceeded(self.opts.max_iterations));
            }
            stats.iterations += 1;

            let new = if self.opts.parallel {
                self.iteration_parallel(&rules, &facts, &delta)
            } else {
                self.iteration_sequential(&rules, &facts, &delta)
            };

            telemetry::emit(
                events::MATERIALIZE_ITERATION,
                &[
                    ("iteration", stats.iterations.to_string()),
                    ("derived", new.len().to_string()),
                ],
            );

            if new.is_empty() {
                break;
            }

            // Stable order for the persistence batch.
            let mut batch: Vec<Triple> = new.iter().cloned().collect();
            batch.sort_unstable();
            store_fn(&batch)?;

            stats.per_iteration.push(new.len());
            stats.total_derived += new.len();
            facts.extend(new.iter().cloned());
            delta = new;
        }

        stats.duration = started.elapsed();
        Ok((facts, stats))
    }

    fn iteration_sequential(
        &self,
        rules: &[&Rule],
        facts: &FactSet,
        delta: &FactSet,
    ) -> FactSet {
        let mut new = FactSet::default();
        for rule in rules {
            new.extend(apply_rule_delta(
                rule,
                facts,
                delta,
                facts,
                self.opts.max_derivations,
            ));
        }
        new
    }

    fn iteration_parallel(&self, rules: &[&Rule], facts: &FactSet, delta: &FactSet) -> FactSet {
        rules
            .par_iter()
            .map(|rule| apply_rule_delta(rule, facts, delta, facts, self.opts.max_derivations))
            .reduce(FactSet::default, |mut merged, part| {
                merged.extend(part);
                merged
            })
    }
}

/// Compute the inference closure of `initial` under the compiled rules
///
/// Convenience wrapper over [`SemiNaiveEvaluator`]; this is the operation
/// the query layer calls for a materialization run.
pub fn materialize(
    rules: &CompiledRuleSet,
    initial: &FactSet,
    opts: &EvalOptions,
    store_fn: &mut StoreFn<'_>,
) -> ReasonerResult<(FactSet, MaterializeStats)> {
    SemiNaiveEvaluator::new(rules, opts.clone()).materialize(initial, store_fn)
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

    fn t(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(iri(s), iri(p), iri(o))
    }

    fn sub_class(sub: &str, sup: &str) -> Triple {
        Triple::new(iri(sub), Term::iri(Vocabulary::RDFS_SUBCLASSOF), iri(sup))
    }

    fn type_of(s: &str, class: &str) -> Triple {
        Triple::new(iri(s), Term::iri(Vocabulary::RDF_TYPE), iri(class))
    }

    fn closure_of(facts: FactSet, parallel: bool) -> (FactSet, MaterializeStats) {
        let schema = extract_schema(&facts).unwrap();
        let compiled = compile(&ReasoningConfig::full_materialization(), &schema, None).unwrap();
        let opts = EvalOptions {
            parallel,
            ..EvalOptions::default()
        };
        materialize(&compiled, &facts, &opts, &mut |_| Ok(())).unwrap()
    }

    #[test]
    fn test_subclass_closure() {
        let facts: FactSet = [
            sub_class("Student", "Person"),
            sub_class("Person", "Agent"),
            type_of("alice", "Student"),
        ]
        .into_iter()
        .collect();

        let (closure, stats) = closure_of(facts, false);
        assert!(closure.contains(&type_of("alice", "Person")));
        assert!(closure.contains(&type_of("alice", "Agent")));
        assert!(closure.contains(&sub_class("Student", "Agent")));
        assert_eq!(stats.total_derived, 3);
        assert!(stats.iterations >= 2);
    }

    #[test]
    fn test_transitive_property_closure() {
        let facts: FactSet = [
            Triple::new(
                iri("contains"),
                Term::iri(Vocabulary::RDF_TYPE),
                Term::iri(Vocabulary::OWL_TRANSITIVE_PROPERTY),
            ),
            t("a", "contains", "b"),
            t("b", "contains", "c"),
            t("c", "contains", "d"),
        ]
        .into_iter()
        .collect();

        let (closure, _) = closure_of(facts, false);
        assert!(closure.contains(&t("a", "contains", "c")));
        assert!(closure.contains(&t("a", "contains", "d")));
        assert!(closure.contains(&t("b", "contains", "d")));
    }

    #[test]
    fn test_parallel_equals_sequential() {
        let facts: FactSet = [
            sub_class("Student", "Person"),
            sub_class("Person", "Agent"),
            sub_class("Agent", "Thing"),
            type_of("alice", "Student"),
            type_of("bob", "Person"),
            Triple::new(iri("knows"), Term::iri(Vocabulary::RDF_TYPE), Term::iri(Vocabulary::OWL_SYMMETRIC_PROPERTY)),
            t("alice", "knows", "bob"),
        ]
        .into_iter()
        .collect();

        let (sequential, seq_stats) = closure_of(facts.clone(), false);
        let (parallel, par_stats) = closure_of(facts, true);

        assert_eq!(sequential, parallel);
        assert_eq!(seq_stats.total_derived, par_stats.total_derived);
    }

    #[test]
    fn test_store_fn_sees_every_derivation() {
        let facts: FactSet = [
            sub_class("Student", "Person"),
            sub_class("Person", "Agent"),
            type_of("alice", "Student"),
        ]
        .into_iter()
        .collect();

        let schema = extract_schema(&facts).unwrap();
        let compiled = compile(&ReasoningConfig::full_materialization(), &schema, None).unwrap();

        let mut stored: Vec<Triple> = Vec::new();
        let (closure, stats) = materialize(
            &compiled,
            &facts,
            &EvalOptions::default(),
            &mut |batch| {
                stored.extend_from_slice(batch);
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(stored.len(), stats.total_derived);
        for triple in &stored {
            assert!(closure.contains(triple));
            assert!(!facts.contains(triple));
        }
    }

    #[test]
    fn test_max_iterations_exceeded_is_an_error() {
        let facts: FactSet = [
            Triple::new(
                iri("contains"),
                Term::iri(Vocabulary::RDF_TYPE),
                Term::iri(Vocabulary::OWL_TRANSITIVE_PROPERTY),
            ),
            t("a", "contains", "b"),
            t("b", "contains", "c"),
            t("c", "contains", "d"),
            t("d", "contains", "e"),
        ]
        .into_iter()
        .collect();

        let schema = extract_schema(&facts).unwrap();
        let compiled = compile(&ReasoningConfig::full_materialization(), &schema, None).unwrap();
        let opts = EvalOptions {
            max_iterations: 1,
            ..EvalOptions::default()
        };

        let result = materialize(&compiled, &facts, &opts, &mut |_| Ok(()));
        assert!(matches!(
            result,
            Err(ReasonerError::MaxIterationsExceeded(1))
        ));
    }

    #[test]
    fn test_store_errors_propagate() {
        let facts: FactSet = [sub_class("Student", "Person"), type_of("alice", "Student")]
            .into_iter()
            .collect();
        let schema = extract_schema(&facts).unwrap();
        let compiled = compile(&ReasoningConfig::full_materialization(), &schema, None).unwrap();

        let result = materialize(&compiled, &facts, &EvalOptions::default(), &mut |_| {
            Err(ReasonerError::LookupFailed("disk full".to_string()))
        });
        assert!(matches!(result, Err(ReasonerError::LookupFailed(_))));
    }

    #[test]
    fn test_empty_input_fixpoint_is_immediate() {
        let facts = FactSet::default();
        let (closure, stats) = closure_of(facts, false);
        assert!(closure.is_empty());
        assert_eq!(stats.iterations, 0);
        assert_eq!(stats.total_derived, 0);
    }
}
