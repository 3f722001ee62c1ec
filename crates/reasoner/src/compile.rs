//! Rule compilation
//!
//! Turns a configuration plus the extracted schema into a compiled bundle:
//! profile selection, applicability filtering, property specialization,
//! exclusions, optimization, and a content stamp tying the bundle to the
//! schema version it was compiled against. Compiled sets live in a
//! process-wide registry keyed by caller-supplied name so later calls can
//! detect staleness.

use crate::catalog;
use crate::config::{Profile, ReasoningConfig};
use crate::optimize::{self, DataStats, RuleBatch};
use crate::rule::{BodyAtom, Bindings, Rule, RuleMeta};
use crate::schema::{Applicability, SchemaInfo};
use crate::telemetry::{self, events};
use crate::{ReasonerError, ReasonerResult};
use parking_lot::RwLock;
use rdf_core::{local_name, Term};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::SystemTime;

/// Output of rule compilation
#[derive(Clone, Debug)]
pub struct CompiledRuleSet {
    profile: Profile,
    generic_rules: Vec<Rule>,
    specialized_rules: Vec<Rule>,
    batches: Vec<RuleBatch>,
    /// Version stamp of the schema this set was compiled against
    pub schema_version: u64,
    /// Wall-clock compilation time
    pub compiled_at: SystemTime,
}

impl CompiledRuleSet {
    /// All rules, generic first, then specialized
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.generic_rules.iter().chain(self.specialized_rules.iter())
    }

    /// Total rule count
    pub fn rule_count(&self) -> usize {
        self.generic_rules.len() + self.specialized_rules.len()
    }

    /// Rules kept in generic form
    pub fn generic(&self) -> &[Rule] {
        &self.generic_rules
    }

    /// Property-specialized rules
    pub fn specialized(&self) -> &[Rule] {
        &self.specialized_rules
    }

    /// Evaluator batching hint
    pub fn batches(&self) -> &[RuleBatch] {
        &self.batches
    }

    /// Profile this set was compiled for
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Whether the schema has moved on since compilation
    pub fn is_stale(&self, schema: &SchemaInfo) -> bool {
        self.schema_version != schema.version
    }
}

/// Names of the rules that get property-specialized
const SPECIALIZABLE: [&str; 6] = [
    "prp_trp", "prp_symp", "prp_fp", "prp_ifp", "prp_inv1", "prp_inv2",
];

/// Compile the rule set for a configuration against the current schema
pub fn compile(
    config: &ReasoningConfig,
    schema: &SchemaInfo,
    stats: Option<&DataStats>,
) -> ReasonerResult<CompiledRuleSet> {
    let compiled = telemetry::span_failable(
        events::COMPILE_START,
        events::COMPILE_STOP,
        events::COMPILE_EXCEPTION,
        &[
            ("profile", config.profile.as_str().to_string()),
            ("schema_version", schema.version.to_string()),
        ],
        || compile_inner(config, schema, stats),
    )?;

    telemetry::emit(
        events::COMPILE_COMPLETE,
        &[("rule_count", compiled.rule_count().to_string())],
    );

    Ok(compiled)
}

fn compile_inner(
    config: &ReasoningConfig,
    schema: &SchemaInfo,
    stats: Option<&DataStats>,
) -> ReasonerResult<CompiledRuleSet> {
    let opts = &config.mode_opts;

    // 1. Rules for the requested profile.
    let base: Vec<Rule> = match config.profile {
        Profile::Custom => {
            let names = opts
                .custom_rules
                .as_ref()
                .ok_or_else(|| ReasonerError::MissingOption("rules".to_string()))?;
            names
                .iter()
                .map(|name| catalog::rule_by_name(name).cloned())
                .collect::<ReasonerResult<Vec<Rule>>>()?
        }
        profile => catalog::rules_for_profile(profile)
            .into_iter()
            .cloned()
            .collect(),
    };

    // 2. Applicability filter, plus the eq_ref materialization knob:
    //    reflexive sameAs facts are quadratic in the active domain, so
    //    eq_ref only materializes when explicitly requested.
    let filtered: Vec<Rule> = base
        .into_iter()
        .filter(|r| r.meta().applicability.applies(schema))
        .filter(|r| r.name() != "eq_ref" || opts.materialize_eq_ref)
        .collect();

    // 3. Specialization; a specialized rule replaces its generic original.
    let mut generic_rules: Vec<Rule> = Vec::new();
    let mut specialized_rules: Vec<Rule> = Vec::new();
    for rule in filtered {
        if opts.specialize && SPECIALIZABLE.contains(&rule.name()) {
            let siblings = specialize(&rule, schema);
            if !siblings.is_empty() {
                specialized_rules.extend(siblings);
                continue;
            }
        }
        generic_rules.push(rule);
    }

    // 4. Config exclusions cover a rule and its specializations.
    let excluded = |rule: &Rule| {
        opts.excluded_rules.iter().any(|name| {
            rule.name() == name || rule.name().starts_with(&format!("{name}_"))
        })
    };
    generic_rules.retain(|r| !excluded(r));
    specialized_rules.retain(|r| !excluded(r));

    // 5. Optimization: dead-rule filtering and body reordering.
    let generic_rules = optimize::optimize_rules(generic_rules, schema, stats);
    let specialized_rules = optimize::optimize_rules(specialized_rules, schema, stats);

    let all: Vec<Rule> = generic_rules
        .iter()
        .chain(specialized_rules.iter())
        .cloned()
        .collect();
    let batches = optimize::batch_rules(&all);

    Ok(CompiledRuleSet {
        profile: config.profile,
        generic_rules,
        specialized_rules,
        batches,
        schema_version: schema.version,
        compiled_at: SystemTime::now(),
    })
}

/// Emit one specialized rule per property IRI in the matching schema list
///
/// The property slot is bound to the concrete IRI and the characteristic
/// antecedent (`rdf:type` / `owl:inverseOf`, always the first body pattern)
/// is dropped: it is known true by construction. Names are deterministic,
/// e.g. `prp_trp_contains`.
fn specialize(rule: &Rule, schema: &SchemaInfo) -> Vec<Rule> {
    match rule.name() {
        "prp_trp" => specialize_unary(rule, &schema.transitive_properties, "p"),
        "prp_symp" => specialize_unary(rule, &schema.symmetric_properties, "p"),
        "prp_fp" => specialize_unary(rule, &schema.functional_properties, "p"),
        "prp_ifp" => specialize_unary(rule, &schema.inverse_functional_properties, "p"),
        "prp_inv1" | "prp_inv2" => specialize_inverse(rule, &schema.inverse_pairs),
        _ => Vec::new(),
    }
}

fn specialize_unary(rule: &Rule, properties: &[String], slot: &str) -> Vec<Rule> {
    properties
        .iter()
        .map(|property| {
            let mut binding = Bindings::default();
            binding.insert(slot.to_string(), Term::iri(property.clone()));
            instantiate(rule, &binding, &format!("{}_{}", rule.name(), local_name(property)))
        })
        .collect()
}

fn specialize_inverse(rule: &Rule, pairs: &[(String, String)]) -> Vec<Rule> {
    pairs
        .iter()
        .map(|(p1, p2)| {
            let mut binding = Bindings::default();
            binding.insert("p1".to_string(), Term::iri(p1.clone()));
            binding.insert("p2".to_string(), Term::iri(p2.clone()));
            instantiate(
                rule,
                &binding,
                &format!("{}_{}_{}", rule.name(), local_name(p1), local_name(p2)),
            )
        })
        .collect()
}

fn instantiate(rule: &Rule, binding: &Bindings, name: &str) -> Rule {
    let body: Vec<BodyAtom> = rule
        .body()
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != 0)
        .map(|(_, atom)| match atom {
            BodyAtom::Pattern(p) => BodyAtom::Pattern(Rule::substitute(p, binding)),
            BodyAtom::Condition(c) => BodyAtom::Condition(c.clone()),
        })
        .collect();

    let meta = RuleMeta {
        profile: rule.meta().profile,
        applicability: Applicability::Always,
        delta_positions: None,
        description: format!("{} (specialized)", rule.meta().description),
    };

    Rule::new(name, body, Rule::substitute(rule.head(), binding), meta)
}

/// Process-wide registry of compiled rule sets, keyed by caller name
#[derive(Default)]
pub struct RuleSetRegistry {
    entries: RwLock<FxHashMap<String, Arc<CompiledRuleSet>>>,
}

impl RuleSetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a compiled set under a name, replacing any previous entry
    pub fn store(&self, name: impl Into<String>, set: CompiledRuleSet) -> Arc<CompiledRuleSet> {
        let set = Arc::new(set);
        self.entries.write().insert(name.into(), Arc::clone(&set));
        set
    }

    /// Fetch a compiled set by name
    pub fn get(&self, name: &str) -> ReasonerResult<Arc<CompiledRuleSet>> {
        self.entries
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ReasonerError::NotFound(name.to_string()))
    }

    /// Whether the named entry was compiled against an older schema
    pub fn is_stale(&self, name: &str, schema: &SchemaInfo) -> ReasonerResult<bool> {
        Ok(self.get(name)?.is_stale(schema))
    }

    /// Drop an entry; missing names are fine
    pub fn remove(&self, name: &str) {
        self.entries.write().remove(name);
    }

    /// Number of registered sets
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
