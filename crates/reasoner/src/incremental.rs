//! Incremental addition
//!
//! New explicit triples seed the semi-naive loop as the initial Δ; because
//! evaluation is monotonic and starts from the enlarged closure, the result
//! is the correct closure of the enlarged base without recomputing from
//! scratch.

use crate::compile::CompiledRuleSet;
use crate::evaluate::{EvalOptions, SemiNaiveEvaluator, StoreFn};
use crate::{FactSet, ReasonerResult};
use rdf_core::Triple;
use std::time::Duration;

/// Statistics from an incremental addition
#[derive(Clone, Debug, Default)]
pub struct IncrementalStats {
    /// New explicit triples not already in the closure
    pub explicit_added: usize,
    /// Triples derived from the addition
    pub derived_count: usize,
    /// Fixpoint iterations
    pub iterations: usize,
    /// Wall-clock duration
    pub duration: Duration,
}

/// Add explicit triples to an existing closure and extend it
///
/// Dedupes against the closure, unions the new facts in, then runs the
/// semi-naive evaluator with the new facts as the initial Δ. Derived
/// triples flow through `store_fn` exactly as in a full materialization.
pub fn add_incremental(
    new_triples: &[Triple],
    existing: &FactSet,
    rules: &CompiledRuleSet,
    opts: &EvalOptions,
    store_fn: &mut StoreFn<'_>,
) -> ReasonerResult<(FactSet, IncrementalStats)> {
    let delta: FactSet = new_triples
        .iter()
        .filter(|t| !existing.contains(*t))
        .cloned()
        .collect();
    let explicit_added = delta.len();

    let mut facts = existing.clone();
    facts.extend(delta.iter().cloned());

    let evaluator = SemiNaiveEvaluator::new(rules, opts.clone());
    let (closure, stats) = evaluator.materialize_from_delta(facts, delta, store_fn)?;

    Ok((
        closure,
        IncrementalStats {
            explicit_added,
            derived_count: stats.total_derived,
            iterations: stats.iterations,
            duration: stats.duration,
        },
    ))
}

/// What an addition would derive, without persisting anything
///
/// Runs the same algorithm against a scratch copy and returns only the
/// would-be-derived set: the new closure minus the existing facts and minus
/// the explicit adds themselves.
pub fn preview_addition(
    new_triples: &[Triple],
    existing: &FactSet,
    rules: &CompiledRuleSet,
    opts: &EvalOptions,
) -> ReasonerResult<FactSet> {
    let (closure, _) = add_incremental(new_triples, existing, rules, opts, &mut |_| Ok(()))?;

    Ok(closure
        .into_iter()
        .filter(|t| !existing.contains(t) && !new_triples.contains(t))
        .collect())
}
