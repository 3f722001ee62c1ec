//! Backward trace of potentially invalidated derivations
//!
//! The engine stores no proof graph; support is reconstructed from rule
//! structure alone. Each deleted fact is unified against every body pattern
//! of every rule; the partially instantiated head selects the derived facts
//! whose support may have relied on the deletion. The newly found facts
//! become the next deletion front until quiescence or the depth cap.

use crate::compile::CompiledRuleSet;
use crate::matcher::{filter_matching, match_pattern};
use crate::rule::Rule;
use crate::telemetry::{self, events};
use crate::FactSet;
use rdf_core::Triple;

/// Backward-trace options
#[derive(Clone, Debug)]
pub struct TraceOptions {
    /// Cap on the traversal depth
    pub max_depth: usize,
    /// Also report the deleted explicit facts themselves (debugging)
    pub include_deleted: bool,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            include_deleted: false,
        }
    }
}

/// Result of a backward trace
#[derive(Clone, Debug)]
pub struct TraceResult {
    /// Derived facts whose support chain may be broken
    pub potentially_invalid: FactSet,
    /// Rounds the traversal ran
    pub trace_depth: usize,
    /// Derived facts inspected across all rounds
    pub facts_examined: usize,
}

/// Find every derived fact whose support may rely on a deleted fact
pub fn backward_trace(
    deleted: &[Triple],
    derived: &FactSet,
    rules: &CompiledRuleSet,
    opts: &TraceOptions,
) -> TraceResult {
    let mut potentially_invalid = FactSet::default();
    let mut facts_examined = 0usize;
    let mut trace_depth = 0usize;

    let mut front: FactSet = deleted.iter().cloned().collect();

    while !front.is_empty() && trace_depth < opts.max_depth {
        let mut next_front = FactSet::default();

        for rule in rules.rules() {
            for fact in &front {
                for candidate in dependents(rule, fact, derived) {
                    facts_examined += 1;
                    if potentially_invalid.insert(candidate.clone()) {
                        next_front.insert(candidate);
                    }
                }
            }
        }

        front = next_front;
        trace_depth += 1;
    }

    if opts.include_deleted {
        potentially_invalid.extend(deleted.iter().cloned());
    }

    telemetry::emit(
        events::BACKWARD_TRACE_COMPLETE,
        &[
            ("potentially_invalid", potentially_invalid.len().to_string()),
            ("trace_depth", trace_depth.to_string()),
            ("facts_examined", facts_examined.to_string()),
        ],
    );

    TraceResult {
        potentially_invalid,
        trace_depth,
        facts_examined,
    }
}

/// Derived facts the rule could have produced using `fact` as a body match
fn dependents(rule: &Rule, fact: &Triple, derived: &FactSet) -> Vec<Triple> {
    let mut out = Vec::new();

    for pattern in rule.body_patterns() {
        let Some(partial) = match_pattern(pattern, fact) else {
            continue;
        };
        let head = Rule::substitute(rule.head(), &partial);
        for matched in filter_matching(derived, &head) {
            out.push(matched.clone());
        }
    }

    out
}
