//! Deletion with reasoning
//!
//! Orchestrates the two-phase repair after explicit facts are removed:
//! backward trace finds every derived fact whose support may be broken,
//! forward re-derivation decides which of them survive on alternative
//! support. The result is a closed fact set; partial repairs never escape.

use crate::compile::CompiledRuleSet;
use crate::rederive::partition_rederivable;
use crate::store::DerivedFactStore;
use crate::telemetry::{self, events};
use crate::trace::{backward_trace, TraceOptions};
use crate::{FactSet, ReasonerResult};
use rdf_core::Triple;
use std::time::{Duration, Instant};

/// Statistics from a deletion run
#[derive(Clone, Debug, Default)]
pub struct DeleteStats {
    /// Explicit facts removed
    pub deleted_explicit: usize,
    /// Derived facts that lost their support
    pub derived_deleted: usize,
    /// Derived facts kept on alternative support
    pub derived_kept: usize,
    /// Rounds of the backward trace
    pub trace_depth: usize,
    /// Derived facts inspected by the trace
    pub facts_examined: usize,
    /// Wall-clock duration
    pub duration: Duration,
}

/// Outcome of a deletion run
#[derive(Clone, Debug)]
pub struct DeleteOutcome {
    /// The repaired fact set, closed under the rules
    pub final_facts: FactSet,
    /// Derived facts that survived on alternative support
    pub derived_kept: FactSet,
    /// Derived facts removed together with the explicit deletions
    pub derived_deleted: FactSet,
    /// Run statistics
    pub stats: DeleteStats,
}

/// Delete explicit facts and repair the derived closure
pub fn delete_with_reasoning(
    deleted: &[Triple],
    all_facts: &FactSet,
    derived_facts: &FactSet,
    rules: &CompiledRuleSet,
    opts: &TraceOptions,
) -> ReasonerResult<DeleteOutcome> {
    telemetry::span(
        events::DELETE_START,
        events::DELETE_STOP,
        &[
            ("deleted", deleted.len().to_string()),
            ("derived", derived_facts.len().to_string()),
        ],
        || run(deleted, all_facts, derived_facts, rules, opts),
    )
}

fn run(
    deleted: &[Triple],
    all_facts: &FactSet,
    derived_facts: &FactSet,
    rules: &CompiledRuleSet,
    opts: &TraceOptions,
) -> ReasonerResult<DeleteOutcome> {
    let started = Instant::now();
    let deleted_set: FactSet = deleted.iter().cloned().collect();

    let trace = backward_trace(deleted, derived_facts, rules, opts);
    let partition =
        partition_rederivable(&trace.potentially_invalid, all_facts, &deleted_set, rules);

    let final_facts: FactSet = all_facts
        .iter()
        .filter(|t| !deleted_set.contains(*t) && !partition.delete.contains(*t))
        .cloned()
        .collect();

    let stats = DeleteStats {
        deleted_explicit: deleted_set.len(),
        derived_deleted: partition.delete.len(),
        derived_kept: partition.keep.len(),
        trace_depth: trace.trace_depth,
        facts_examined: trace.facts_examined,
        duration: started.elapsed(),
    };

    Ok(DeleteOutcome {
        final_facts,
        derived_kept: partition.keep,
        derived_deleted: partition.delete,
        stats,
    })
}

/// Apply a deletion outcome to the derived store
pub fn apply_deletion(
    store: &dyn DerivedFactStore,
    outcome: &DeleteOutcome,
) -> ReasonerResult<usize> {
    let batch: Vec<Triple> = outcome.derived_deleted.iter().cloned().collect();
    store.delete_derived(&batch)
}
