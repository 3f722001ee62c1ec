//! OWL 2 RL / RDFS forward-chaining reasoner
//!
//! A semi-naive Datalog-style evaluator specialized for a fixed rule set
//! (the RDFS and OWL 2 RL profiles), with incremental maintenance:
//! - Rule catalogue: 23 W3C OWL 2 RL production rules
//! - Schema-driven rule compilation with property specialization
//! - Selectivity-based body reordering
//! - Semi-naive fixpoint materialization, sequential and parallel
//! - Incremental addition seeded with a user delta
//! - Deletion repair: backward trace + forward re-derivation
//!
//! The engine is sound for OWL 2 RL (not complete for DL). It talks to the
//! rest of the store through two narrow contracts: a pattern lookup over the
//! explicit index and a sink for derived triples.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

/// Reasoning configuration (profile, mode, presets)
pub mod config;
/// Rule representation: patterns, conditions, safety, substitution
pub mod rule;
/// The fixed RDFS + OWL 2 RL rule catalogue
pub mod catalog;
/// TBox feature extraction into SchemaInfo
pub mod schema;
/// Rule compilation: filtering, specialization, registry
pub mod compile;
/// Selectivity-based rule optimization
pub mod optimize;
/// Pattern matching and variable binding
pub mod matcher;
/// Semi-naive delta computation per rule
pub mod delta;
/// The semi-naive fixpoint evaluator
pub mod evaluate;
/// Derived-fact store adapter and lookup contract
pub mod store;
/// Incremental addition of explicit triples
pub mod incremental;
/// Backward trace of potentially invalidated derivations
pub mod trace;
/// Forward re-derivation after deletion
pub mod rederive;
/// Deletion with reasoning (trace + re-derive + repair)
pub mod delete;
/// Class-hierarchy closure cache
pub mod tbox;
/// Reasoning lifecycle status
pub mod status;
/// Telemetry span helper and event names
pub mod telemetry;

use rdf_core::{RdfError, Triple};

pub use catalog::RuleCategory;
pub use compile::{compile, CompiledRuleSet, RuleSetRegistry};
pub use config::{Mode, ModeOpts, Profile, ReasoningConfig};
pub use delete::{apply_deletion, delete_with_reasoning, DeleteOutcome, DeleteStats};
pub use delta::apply_rule_delta;
pub use evaluate::{materialize, EvalOptions, MaterializeStats, SemiNaiveEvaluator, StoreFn};
pub use incremental::{add_incremental, preview_addition, IncrementalStats};
pub use matcher::{filter_matching, match_pattern, match_with};
pub use optimize::{batch_rules, optimize_rules, reorder_rule, DataStats, RuleBatch};
pub use rederive::{can_rederive, partition_rederivable, RederiveResult};
pub use rule::{Bindings, BodyAtom, Condition, Rule, RuleDefect, RuleMeta};
pub use schema::{extract_schema, extract_schema_from, Applicability, SchemaInfo};
pub use status::{ReasoningState, ReasoningStatus};
pub use store::{fetch_all, DerivedFactStore, InMemoryDerivedStore, MemoryIndex, TripleLookup};
pub use tbox::{ClassHierarchy, TBoxCache};
pub use trace::{backward_trace, TraceOptions, TraceResult};

/// Set of ground facts with uniform iteration cost
pub type FactSet = ahash::AHashSet<Triple>;

/// Reasoner error taxonomy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReasonerError {
    /// Unknown profile name
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// Unknown mode name
    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    /// Required configuration option absent
    #[error("Missing option: {0}")]
    MissingOption(String),

    /// Rule name not present in the catalogue
    #[error("Unknown rules: {0:?}")]
    UnknownRules(Vec<String>),

    /// IRI contains forbidden characters
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Head variable not bound by any body pattern
    #[error("Unsafe rule: {0}")]
    UnsafeRule(String),

    /// Malformed rule structure
    #[error("Invalid pattern structure: {0}")]
    InvalidPatternStructure(String),

    /// Condition that can never hold
    #[error("Unsatisfiable condition: {0}")]
    UnsatisfiableCondition(String),

    /// Fixpoint iteration cap hit; no partial closure is returned
    #[error("Max iterations exceeded: {0}")]
    MaxIterationsExceeded(usize),

    /// Backend error surfaced through the lookup contract
    #[error("Lookup failed: {0}")]
    LookupFailed(String),

    /// Cache or registry miss
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<RdfError> for ReasonerError {
    fn from(err: RdfError) -> Self {
        match err {
            RdfError::InvalidIri(iri) => ReasonerError::InvalidIri(iri),
            RdfError::InvalidLiteral(lit) => ReasonerError::InvalidPatternStructure(lit),
        }
    }
}

/// Result type for reasoning operations
pub type ReasonerResult<T> = Result<T, ReasonerError>;
