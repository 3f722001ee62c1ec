//! Rule representation
//!
//! A rule is a body of triple patterns interleaved with conditions, a single
//! head pattern, and metadata (profile tag, applicability predicate, delta
//! positions). Rules are immutable after construction. Every head variable
//! must be bound by some body pattern (the safety invariant).

use crate::config::Profile;
use crate::schema::Applicability;
use rdf_core::{Term, TriplePattern};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::fmt;

/// Variable binding produced by matching patterns against facts
pub type Bindings = FxHashMap<String, Term>;

/// Predicate on bindings, evaluated once its variables are bound
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Holds when the two variables are bound to different terms
    NotEqual(String, String),
    /// Holds when the variable is bound to an IRI
    IsIri(String),
    /// Holds when the variable is bound to a blank node
    IsBlank(String),
}

impl Condition {
    /// Variables the condition refers to
    pub fn variables(&self) -> SmallVec<[&str; 2]> {
        match self {
            Condition::NotEqual(a, b) => SmallVec::from_slice(&[a.as_str(), b.as_str()]),
            Condition::IsIri(v) | Condition::IsBlank(v) => {
                SmallVec::from_slice(&[v.as_str()])
            }
        }
    }

    /// Evaluate against bindings; `None` when a variable is still unbound
    pub fn evaluate(&self, bindings: &Bindings) -> Option<bool> {
        match self {
            Condition::NotEqual(a, b) => {
                let left = bindings.get(a)?;
                let right = bindings.get(b)?;
                Some(left != right)
            }
            Condition::IsIri(v) => Some(bindings.get(v)?.is_iri()),
            Condition::IsBlank(v) => Some(bindings.get(v)?.is_blank()),
        }
    }

    /// A condition that can never hold, regardless of bindings
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, Condition::NotEqual(a, b) if a == b)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::NotEqual(a, b) => write!(f, "?{a} != ?{b}"),
            Condition::IsIri(v) => write!(f, "isIri(?{v})"),
            Condition::IsBlank(v) => write!(f, "isBlank(?{v})"),
        }
    }
}

/// One element of a rule body
#[derive(Clone, Debug)]
pub enum BodyAtom {
    /// Triple pattern joined against the fact set
    Pattern(TriplePattern),
    /// Condition filtering the bindings accumulated so far
    Condition(Condition),
}

/// Rule metadata
#[derive(Clone, Debug)]
pub struct RuleMeta {
    /// Profile the rule belongs to
    pub profile: Profile,
    /// When the rule's body could match non-trivially
    pub applicability: Applicability,
    /// Body-pattern positions eligible as the delta slot; `None` means all
    pub delta_positions: Option<Vec<usize>>,
    /// Human description
    pub description: String,
}

/// Defect found by [`Rule::validate`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleDefect {
    /// Head variable not bound by any body pattern
    UnsafeHeadVariable(String),
    /// Body contains no patterns, so the head can never bind
    EmptyBody,
    /// Condition refers to a variable no body pattern binds
    UnboundConditionVariable(String),
    /// Condition that can never hold
    UnsatisfiableCondition(String),
}

impl RuleDefect {
    fn into_error(self, rule_name: &str) -> crate::ReasonerError {
        use crate::ReasonerError;
        match self {
            RuleDefect::UnsafeHeadVariable(var) => {
                ReasonerError::UnsafeRule(format!("{rule_name}: head variable ?{var} unbound"))
            }
            RuleDefect::EmptyBody => {
                ReasonerError::InvalidPatternStructure(format!("{rule_name}: empty body"))
            }
            RuleDefect::UnboundConditionVariable(var) => ReasonerError::InvalidPatternStructure(
                format!("{rule_name}: condition variable ?{var} unbound"),
            ),
            RuleDefect::UnsatisfiableCondition(cond) => {
                ReasonerError::UnsatisfiableCondition(format!("{rule_name}: {cond}"))
            }
        }
    }
}

/// An inference rule: body patterns + conditions, one head pattern
#[derive(Clone, Debug)]
pub struct Rule {
    name: String,
    body: SmallVec<[BodyAtom; 4]>,
    head: TriplePattern,
    meta: RuleMeta,
}

impl Rule {
    /// Create a new rule
    pub fn new(
        name: impl Into<String>,
        body: Vec<BodyAtom>,
        head: TriplePattern,
        meta: RuleMeta,
    ) -> Self {
        Rule {
            name: name.into(),
            body: SmallVec::from_vec(body),
            head,
            meta,
        }
    }

    /// Create a rule, rejecting structural defects
    ///
    /// The catalogue constructs its rules infallibly; this is the entry
    /// point for caller-defined rules.
    pub fn try_new(
        name: impl Into<String>,
        body: Vec<BodyAtom>,
        head: TriplePattern,
        meta: RuleMeta,
    ) -> crate::ReasonerResult<Self> {
        let rule = Rule::new(name, body, head, meta);
        if let Some(defect) = rule.validate().into_iter().next() {
            return Err(defect.into_error(&rule.name));
        }
        Ok(rule)
    }

    /// Stable rule identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full body sequence, patterns and conditions interleaved
    pub fn body(&self) -> &[BodyAtom] {
        &self.body
    }

    /// Body patterns in order
    pub fn body_patterns(&self) -> impl Iterator<Item = &TriplePattern> {
        self.body.iter().filter_map(|atom| match atom {
            BodyAtom::Pattern(p) => Some(p),
            BodyAtom::Condition(_) => None,
        })
    }

    /// Body conditions in order
    pub fn body_conditions(&self) -> impl Iterator<Item = &Condition> {
        self.body.iter().filter_map(|atom| match atom {
            BodyAtom::Condition(c) => Some(c),
            BodyAtom::Pattern(_) => None,
        })
    }

    /// Number of body patterns
    pub fn pattern_count(&self) -> usize {
        self.body_patterns().count()
    }

    /// Head pattern
    pub fn head(&self) -> &TriplePattern {
        &self.head
    }

    /// Metadata
    pub fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    /// All variables appearing in body patterns
    pub fn variables(&self) -> FxHashSet<&str> {
        self.body_patterns().flat_map(|p| p.variables()).collect()
    }

    /// Safety invariant: every head variable appears in some body pattern
    pub fn is_safe(&self) -> bool {
        let bound = self.variables();
        self.head.variables().iter().all(|v| bound.contains(v))
    }

    /// Instantiate a pattern under bindings; unknown variables stay in place
    pub fn substitute(pattern: &TriplePattern, bindings: &Bindings) -> TriplePattern {
        let resolve = |term: &Term| match term {
            Term::Variable(name) => bindings.get(name).cloned().unwrap_or_else(|| term.clone()),
            other => other.clone(),
        };

        TriplePattern::new(
            resolve(&pattern.subject),
            resolve(&pattern.predicate),
            resolve(&pattern.object),
        )
    }

    /// Check all conditions under the bindings
    ///
    /// A condition whose variables are not all bound counts as failed.
    pub fn evaluate_conditions(&self, bindings: &Bindings) -> bool {
        self.body_conditions()
            .all(|c| c.evaluate(bindings) == Some(true))
    }

    /// Collect structural defects; an empty result means the rule is valid
    pub fn validate(&self) -> Vec<RuleDefect> {
        let mut defects = Vec::new();

        if self.pattern_count() == 0 {
            defects.push(RuleDefect::EmptyBody);
        }

        let bound = self.variables();
        for head_var in self.head.variables() {
            if !bound.contains(head_var) {
                defects.push(RuleDefect::UnsafeHeadVariable(head_var.to_string()));
            }
        }

        for condition in self.body_conditions() {
            if condition.is_unsatisfiable() {
                defects.push(RuleDefect::UnsatisfiableCondition(condition.to_string()));
                continue;
            }
            for var in condition.variables() {
                if !bound.contains(var) {
                    defects.push(RuleDefect::UnboundConditionVariable(var.to_string()));
                }
            }
        }

        defects
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.name)?;
        for (i, atom) in self.body.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match atom {
                BodyAtom::Pattern(p) => write!(f, "{p:?}")?,
                BodyAtom::Condition(c) => write!(f, "{c}")?,
            }
        }
        write!(f, " -> {:?}", self.head)
    }
}
