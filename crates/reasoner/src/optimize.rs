//! Rule optimization
//!
//! Two independent passes over a compiled rule set: greedy selectivity-based
//! body reordering, and dead-rule filtering against the current schema.
//! Batching by head predicate is produced as an evaluator hint only; it
//! never changes results.

use crate::rule::{BodyAtom, Condition, Rule};
use crate::schema::SchemaInfo;
use crate::telemetry::{self, events};
use rdf_core::{Term, TriplePattern};
use rustc_hash::{FxHashMap, FxHashSet};

/// Optional data statistics refining the selectivity model
#[derive(Clone, Debug, Default)]
pub struct DataStats {
    /// Number of triples per predicate IRI
    pub predicate_counts: FxHashMap<String, u64>,
    /// Total triple count
    pub total_triples: u64,
}

impl DataStats {
    /// Fraction of triples carrying the predicate, if known
    fn predicate_fraction(&self, predicate: &str) -> Option<f64> {
        if self.total_triples == 0 {
            return None;
        }
        let count = *self.predicate_counts.get(predicate)?;
        Some(count as f64 / self.total_triples as f64)
    }
}

fn is_bound(term: &Term, bound: &FxHashSet<&str>) -> bool {
    match term {
        Term::Variable(name) => bound.contains(name.as_str()),
        _ => true,
    }
}

/// Expected cost of matching a pattern given the already-bound variables
///
/// Base 1.0; a bound predicate multiplies by 0.1 (or by the measured
/// predicate fraction when statistics are available), a bound subject by
/// 0.1, a bound object by 0.2, and a literal constant anywhere by 0.01.
pub fn selectivity(
    pattern: &TriplePattern,
    bound: &FxHashSet<&str>,
    stats: Option<&DataStats>,
) -> f64 {
    let mut cost = 1.0;

    if is_bound(&pattern.predicate, bound) {
        let override_fraction = pattern
            .predicate
            .as_iri()
            .and_then(|iri| stats.and_then(|s| s.predicate_fraction(iri)));
        cost *= override_fraction.unwrap_or(0.1);
    }
    if is_bound(&pattern.subject, bound) {
        cost *= 0.1;
    }
    if is_bound(&pattern.object, bound) {
        cost *= 0.2;
    }
    if pattern.positions().into_iter().any(|t| t.is_literal()) {
        cost *= 0.01;
    }

    cost
}

/// Reorder a rule body by greedy selectivity
///
/// Repeatedly picks the cheapest remaining pattern under the variables bound
/// so far; conditions are re-placed immediately after the first prefix that
/// binds all their variables. Ties break on original position, so the pass
/// is deterministic.
pub fn reorder_rule(rule: &Rule, stats: Option<&DataStats>) -> Rule {
    let patterns: Vec<&TriplePattern> = rule.body_patterns().collect();
    let conditions: Vec<&Condition> = rule.body_conditions().collect();

    let mut remaining: Vec<(usize, &TriplePattern)> = patterns.iter().copied().enumerate().collect();
    let mut ordered: Vec<(usize, &TriplePattern)> = Vec::with_capacity(remaining.len());
    let mut bound: FxHashSet<&str> = FxHashSet::default();

    while !remaining.is_empty() {
        let Some(best) = remaining
            .iter()
            .enumerate()
            .min_by(|(_, (ai, a)), (_, (bi, b))| {
                selectivity(a, &bound, stats)
                    .partial_cmp(&selectivity(b, &bound, stats))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(ai.cmp(bi))
            })
            .map(|(slot, _)| slot)
        else {
            break;
        };

        let (index, pattern) = remaining.remove(best);
        bound.extend(pattern.variables());
        ordered.push((index, pattern));
    }

    // Interleave conditions as soon as their variables are available.
    let mut body: Vec<BodyAtom> = Vec::with_capacity(patterns.len() + conditions.len());
    let mut placed: Vec<bool> = vec![false; conditions.len()];
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    for (_, pattern) in &ordered {
        body.push(BodyAtom::Pattern((*pattern).clone()));
        seen.extend(pattern.variables());

        for (slot, condition) in conditions.iter().enumerate() {
            if !placed[slot] && condition.variables().iter().all(|v| seen.contains(v)) {
                body.push(BodyAtom::Condition((*condition).clone()));
                placed[slot] = true;
            }
        }
    }
    for (slot, condition) in conditions.iter().enumerate() {
        if !placed[slot] {
            body.push(BodyAtom::Condition((*condition).clone()));
        }
    }

    // Remap explicit delta positions onto the new pattern order.
    let mut meta = rule.meta().clone();
    if let Some(positions) = &meta.delta_positions {
        let new_of_old: FxHashMap<usize, usize> = ordered
            .iter()
            .enumerate()
            .map(|(new, (old, _))| (*old, new))
            .collect();
        meta.delta_positions = Some(
            positions
                .iter()
                .filter_map(|old| new_of_old.get(old).copied())
                .collect(),
        );
    }

    Rule::new(rule.name().to_string(), body, rule.head().clone(), meta)
}

/// Drop rules whose applicability predicate is false for this schema
pub fn filter_dead_rules(rules: Vec<Rule>, schema: &SchemaInfo) -> Vec<Rule> {
    rules
        .into_iter()
        .filter(|r| r.meta().applicability.applies(schema))
        .collect()
}

/// Evaluator hint: rules grouped by head predicate
#[derive(Clone, Debug)]
pub struct RuleBatch {
    /// Head-predicate key; `*` for variable-predicate heads
    pub key: String,
    /// Indices into the optimized rule slice
    pub rule_indices: Vec<usize>,
}

/// Group rules by head predicate
pub fn batch_rules(rules: &[Rule]) -> Vec<RuleBatch> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: FxHashMap<String, Vec<usize>> = FxHashMap::default();

    for (index, rule) in rules.iter().enumerate() {
        let key = match rule.head().predicate.as_iri() {
            Some(iri) => iri.to_string(),
            None => String::from("*"),
        };
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(index);
    }

    order
        .into_iter()
        .map(|key| {
            let rule_indices = groups.remove(&key).unwrap_or_default();
            RuleBatch { key, rule_indices }
        })
        .collect()
}

/// Full optimizer pass: dead-rule filtering then body reordering
pub fn optimize_rules(
    rules: Vec<Rule>,
    schema: &SchemaInfo,
    stats: Option<&DataStats>,
) -> Vec<Rule> {
    let input_count = rules.len();
    let result: Result<Vec<Rule>, std::convert::Infallible> = telemetry::span(
        events::OPTIMIZE_START,
        events::OPTIMIZE_STOP,
        &[("rules", input_count.to_string())],
        || {
            Ok(filter_dead_rules(rules, schema)
                .iter()
                .map(|r| reorder_rule(r, stats))
                .collect())
        },
    );
    let optimized = match result {
        Ok(rules) => rules,
        Err(never) => match never {},
    };

    telemetry::emit(
        events::OPTIMIZE_COMPLETE,
        &[
            ("kept", optimized.len().to_string()),
            ("dropped", (input_count - optimized.len()).to_string()),
        ],
    );

    optimized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::config::Profile;
    use crate::rule::RuleMeta;
    use crate::schema::Applicability;
    use rdf_core::Vocabulary;

    fn meta() -> RuleMeta {
        RuleMeta {
            profile: Profile::Owl2Rl,
            applicability: Applicability::Always,
            delta_positions: None,
            description: String::from("test"),
        }
    }

    #[test]
    fn test_selectivity_prefers_constant_predicate() {
        let bound = FxHashSet::default();
        let concrete = TriplePattern::new(
            Term::var("x"),
            Term::iri(Vocabulary::RDFS_SUBCLASSOF),
            Term::var("y"),
        );
        let open = TriplePattern::new(Term::var("x"), Term::var("p"), Term::var("y"));

        assert!(selectivity(&concrete, &bound, None) < selectivity(&open, &bound, None));
    }

    #[test]
    fn test_selectivity_literal_is_cheapest() {
        let bound = FxHashSet::default();
        let with_literal = TriplePattern::new(
            Term::var("x"),
            Term::iri("http://ex/name"),
            Term::literal("alice"),
        );
        let without = TriplePattern::new(
            Term::var("x"),
            Term::iri("http://ex/name"),
            Term::var("y"),
        );
        assert!(selectivity(&with_literal, &bound, None) < selectivity(&without, &bound, None));
    }

    #[test]
    fn test_stats_override_predicate_multiplier() {
        let bound = FxHashSet::default();
        let pattern = TriplePattern::new(
            Term::var("x"),
            Term::iri("http://ex/rare"),
            Term::var("y"),
        );

        let mut stats = DataStats {
            total_triples: 1_000,
            ..DataStats::default()
        };
        stats.predicate_counts.insert("http://ex/rare".to_string(), 1);

        let with_stats = selectivity(&pattern, &bound, Some(&stats));
        let without = selectivity(&pattern, &bound, None);
        assert!(with_stats < without);
    }

    #[test]
    fn test_reorder_puts_selective_pattern_first() {
        // Body in deliberately bad order: open pattern before schema pattern.
        let rule = Rule::new(
            "test",
            vec![
                BodyAtom::Pattern(TriplePattern::new(
                    Term::var("x"),
                    Term::var("p"),
                    Term::var("y"),
                )),
                BodyAtom::Pattern(TriplePattern::new(
                    Term::var("p"),
                    Term::iri(Vocabulary::RDFS_DOMAIN),
                    Term::var("c"),
                )),
            ],
            TriplePattern::new(Term::var("x"), Term::iri(Vocabulary::RDF_TYPE), Term::var("c")),
            meta(),
        );

        let reordered = reorder_rule(&rule, None);
        let first = reordered.body_patterns().next().unwrap();
        assert_eq!(first.predicate, Term::iri(Vocabulary::RDFS_DOMAIN));
    }

    #[test]
    fn test_conditions_follow_their_binding_pattern() {
        let rule = catalog::rule_by_name("prp_fp").unwrap();
        let reordered = reorder_rule(rule, None);

        // The inequality guard must appear after both y1 and y2 are bound.
        let mut bound: FxHashSet<String> = FxHashSet::default();
        for atom in reordered.body() {
            match atom {
                BodyAtom::Pattern(p) => {
                    bound.extend(p.variables().iter().map(|v| v.to_string()));
                }
                BodyAtom::Condition(c) => {
                    for var in c.variables() {
                        assert!(bound.contains(var), "condition placed before {var} bound");
                    }
                }
            }
        }
    }

    #[test]
    fn test_dead_rule_filtering() {
        let schema = SchemaInfo {
            has_subclass: true,
            ..SchemaInfo::default()
        };
        let rules: Vec<Rule> = catalog::rules_for_profile(Profile::Rdfs)
            .into_iter()
            .cloned()
            .collect();

        let alive = filter_dead_rules(rules, &schema);
        let names: Vec<&str> = alive.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["scm_sco", "cax_sco"]);
    }

    #[test]
    fn test_batching_groups_by_head_predicate() {
        let rules: Vec<Rule> = catalog::rules_for_profile(Profile::Rdfs)
            .into_iter()
            .cloned()
            .collect();
        let batches = batch_rules(&rules);

        let type_batch = batches
            .iter()
            .find(|b| b.key == Vocabulary::RDF_TYPE)
            .expect("rdf:type batch");
        // cax_sco, prp_dom, prp_rng all head rdf:type.
        assert_eq!(type_batch.rule_indices.len(), 3);

        let total: usize = batches.iter().map(|b| b.rule_indices.len()).sum();
        assert_eq!(total, rules.len());
    }
}
