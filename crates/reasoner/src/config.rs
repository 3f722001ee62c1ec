//! Reasoning configuration
//!
//! Profile and mode carry the wire names used by the query layer. Presets
//! cover the common deployments; capability queries let callers decide
//! whether a materialization run or backward chaining is required.

use crate::catalog;
use crate::{ReasonerError, ReasonerResult};
use std::fmt;
use std::str::FromStr;

/// Reasoning profile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Profile {
    /// RDFS entailment rules only
    Rdfs,
    /// Full OWL 2 RL rule set (includes the RDFS rules)
    Owl2Rl,
    /// Caller-selected subset of the catalogue
    Custom,
    /// No reasoning
    None,
}

impl Profile {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Rdfs => "rdfs",
            Profile::Owl2Rl => "owl2rl",
            Profile::Custom => "custom",
            Profile::None => "none",
        }
    }
}

impl FromStr for Profile {
    type Err = ReasonerError;

    fn from_str(s: &str) -> ReasonerResult<Self> {
        match s {
            "rdfs" => Ok(Profile::Rdfs),
            "owl2rl" => Ok(Profile::Owl2Rl),
            "custom" => Ok(Profile::Custom),
            "none" => Ok(Profile::None),
            other => Err(ReasonerError::InvalidProfile(other.to_string())),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasoning mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Pre-compute and store the full closure
    Materialized,
    /// Answer at query time; nothing stored
    QueryTime,
    /// Materialize the cheap rules, defer the rest to query time
    Hybrid,
    /// No reasoning
    None,
}

impl Mode {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Materialized => "materialized",
            Mode::QueryTime => "query_time",
            Mode::Hybrid => "hybrid",
            Mode::None => "none",
        }
    }
}

impl FromStr for Mode {
    type Err = ReasonerError;

    fn from_str(s: &str) -> ReasonerResult<Self> {
        match s {
            "materialized" => Ok(Mode::Materialized),
            "query_time" => Ok(Mode::QueryTime),
            "hybrid" => Ok(Mode::Hybrid),
            "none" => Ok(Mode::None),
            other => Err(ReasonerError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode-specific options
#[derive(Clone, Debug)]
pub struct ModeOpts {
    /// Fixpoint iteration cap
    pub max_iterations: usize,
    /// Fan rule evaluation across worker threads within an iteration
    pub parallel: bool,
    /// Soft cap on derivations per rule application
    pub max_derivations: Option<usize>,
    /// Emit property-specialized rules at compile time
    pub specialize: bool,
    /// Materialize `eq_ref` reflexive sameAs facts (quadratic in the
    /// active domain); off by default, deferred to query time
    pub materialize_eq_ref: bool,
    /// Rule names for the `custom` profile
    pub custom_rules: Option<Vec<String>>,
    /// Rule names excluded from compilation
    pub excluded_rules: Vec<String>,
}

impl Default for ModeOpts {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            parallel: true,
            max_derivations: None,
            specialize: true,
            materialize_eq_ref: false,
            custom_rules: None,
            excluded_rules: Vec::new(),
        }
    }
}

/// Reasoning configuration: profile + mode + options
#[derive(Clone, Debug)]
pub struct ReasoningConfig {
    /// Rule profile
    pub profile: Profile,
    /// Evaluation mode
    pub mode: Mode,
    /// Mode options
    pub mode_opts: ModeOpts,
}

impl ReasoningConfig {
    /// Build a configuration from wire names, validating rule references
    pub fn new(profile: &str, mode: &str, mode_opts: ModeOpts) -> ReasonerResult<Self> {
        let config = Self {
            profile: profile.parse()?,
            mode: mode.parse()?,
            mode_opts,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ReasonerResult<()> {
        if self.profile == Profile::Custom && self.mode_opts.custom_rules.is_none() {
            return Err(ReasonerError::MissingOption("rules".to_string()));
        }

        let mut unknown: Vec<String> = Vec::new();
        let named = self
            .mode_opts
            .custom_rules
            .iter()
            .flatten()
            .chain(self.mode_opts.excluded_rules.iter());
        for name in named {
            if !catalog::contains_rule(name) {
                unknown.push(name.clone());
            }
        }
        if !unknown.is_empty() {
            return Err(ReasonerError::UnknownRules(unknown));
        }

        Ok(())
    }

    /// Preset: OWL 2 RL, fully materialized, parallel
    pub fn full_materialization() -> Self {
        Self {
            profile: Profile::Owl2Rl,
            mode: Mode::Materialized,
            mode_opts: ModeOpts::default(),
        }
    }

    /// Preset: RDFS rules only, materialized
    pub fn rdfs_only() -> Self {
        Self {
            profile: Profile::Rdfs,
            mode: Mode::Materialized,
            mode_opts: ModeOpts::default(),
        }
    }

    /// Preset: nothing stored, single-threaded, no specialization
    pub fn minimal_memory() -> Self {
        Self {
            profile: Profile::Owl2Rl,
            mode: Mode::QueryTime,
            mode_opts: ModeOpts {
                parallel: false,
                specialize: false,
                ..ModeOpts::default()
            },
        }
    }

    /// Preset: hybrid materialization
    pub fn balanced() -> Self {
        Self {
            profile: Profile::Owl2Rl,
            mode: Mode::Hybrid,
            mode_opts: ModeOpts::default(),
        }
    }

    /// Preset: reasoning disabled
    pub fn none() -> Self {
        Self {
            profile: Profile::None,
            mode: Mode::None,
            mode_opts: ModeOpts::default(),
        }
    }

    /// Whether this configuration needs a materialization run
    pub fn requires_materialization(&self) -> bool {
        matches!(self.mode, Mode::Materialized | Mode::Hybrid)
    }

    /// Whether incremental addition is supported
    pub fn supports_incremental(&self) -> bool {
        self.requires_materialization() && self.profile != Profile::None
    }

    /// Whether query-time backward chaining is required
    pub fn requires_backward_chaining(&self) -> bool {
        matches!(self.mode, Mode::QueryTime | Mode::Hybrid)
    }
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self::full_materialization()
    }
}
