//! The fixed RDFS + OWL 2 RL rule catalogue
//!
//! 23 production rules drawn from the W3C OWL 2 RL profile, with their
//! canonical bodies and heads. The catalogue is built once and shared by
//! reference; rule names are part of the public surface.

use crate::config::Profile;
use crate::rule::{BodyAtom, Condition, Rule, RuleMeta};
use crate::schema::Applicability;
use crate::{ReasonerError, ReasonerResult};
use rdf_core::{Term, TriplePattern, Vocabulary};
use std::sync::OnceLock;

/// Rule categories of the catalogue
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleCategory {
    /// Class/property hierarchy and domain/range rules
    Rdfs,
    /// Transitive, symmetric, inverse, (inverse-)functional properties
    PropertyCharacteristics,
    /// `owl:sameAs` equality rules
    Equality,
    /// hasValue / someValuesFrom / allValuesFrom restrictions
    ClassRestrictions,
}

/// The 23 stable rule identifiers
pub const RULE_NAMES: [&str; 23] = [
    "scm_sco", "scm_spo", "cax_sco", "prp_spo1", "prp_dom", "prp_rng",
    "prp_trp", "prp_symp", "prp_inv1", "prp_inv2", "prp_fp", "prp_ifp",
    "eq_ref", "eq_sym", "eq_trans", "eq_rep_s", "eq_rep_p", "eq_rep_o",
    "cls_hv1", "cls_hv2", "cls_svf1", "cls_svf2", "cls_avf",
];

fn var(name: &str) -> Term {
    Term::var(name)
}

fn iri(s: &str) -> Term {
    Term::iri(s)
}

fn pat(s: Term, p: Term, o: Term) -> BodyAtom {
    BodyAtom::Pattern(TriplePattern::new(s, p, o))
}

fn head(s: Term, p: Term, o: Term) -> TriplePattern {
    TriplePattern::new(s, p, o)
}

fn ne(a: &str, b: &str) -> BodyAtom {
    BodyAtom::Condition(Condition::NotEqual(a.to_string(), b.to_string()))
}

fn meta(profile: Profile, applicability: Applicability, description: &str) -> RuleMeta {
    RuleMeta {
        profile,
        applicability,
        delta_positions: None,
        description: description.to_string(),
    }
}

fn build_catalog() -> Vec<Rule> {
    let sco = || iri(Vocabulary::RDFS_SUBCLASSOF);
    let spo = || iri(Vocabulary::RDFS_SUBPROPERTYOF);
    let typ = || iri(Vocabulary::RDF_TYPE);
    let same = || iri(Vocabulary::OWL_SAME_AS);

    vec![
        // RDFS
        Rule::new(
            "scm_sco",
            vec![
                pat(var("c1"), sco(), var("c2")),
                pat(var("c2"), sco(), var("c3")),
            ],
            head(var("c1"), sco(), var("c3")),
            meta(Profile::Rdfs, Applicability::SubClass, "subClassOf is transitive"),
        ),
        Rule::new(
            "scm_spo",
            vec![
                pat(var("p1"), spo(), var("p2")),
                pat(var("p2"), spo(), var("p3")),
            ],
            head(var("p1"), spo(), var("p3")),
            meta(Profile::Rdfs, Applicability::SubProperty, "subPropertyOf is transitive"),
        ),
        Rule::new(
            "cax_sco",
            vec![
                pat(var("c1"), sco(), var("c2")),
                pat(var("x"), typ(), var("c1")),
            ],
            head(var("x"), typ(), var("c2")),
            meta(Profile::Rdfs, Applicability::SubClass, "instances inherit superclasses"),
        ),
        Rule::new(
            "prp_spo1",
            vec![
                pat(var("p1"), spo(), var("p2")),
                pat(var("x"), var("p1"), var("y")),
            ],
            head(var("x"), var("p2"), var("y")),
            meta(Profile::Rdfs, Applicability::SubProperty, "subproperty implication"),
        ),
        Rule::new(
            "prp_dom",
            vec![
                pat(var("p"), iri(Vocabulary::RDFS_DOMAIN), var("c")),
                pat(var("x"), var("p"), var("y")),
            ],
            head(var("x"), typ(), var("c")),
            meta(Profile::Rdfs, Applicability::Domain, "domain typing"),
        ),
        Rule::new(
            "prp_rng",
            vec![
                pat(var("p"), iri(Vocabulary::RDFS_RANGE), var("c")),
                pat(var("x"), var("p"), var("y")),
            ],
            head(var("y"), typ(), var("c")),
            meta(Profile::Rdfs, Applicability::Range, "range typing"),
        ),
        // Property characteristics
        Rule::new(
            "prp_trp",
            vec![
                pat(var("p"), typ(), iri(Vocabulary::OWL_TRANSITIVE_PROPERTY)),
                pat(var("x"), var("p"), var("y")),
                pat(var("y"), var("p"), var("z")),
            ],
            head(var("x"), var("p"), var("z")),
            meta(
                Profile::Owl2Rl,
                Applicability::TransitiveProperties,
                "transitive property chaining",
            ),
        ),
        Rule::new(
            "prp_symp",
            vec![
                pat(var("p"), typ(), iri(Vocabulary::OWL_SYMMETRIC_PROPERTY)),
                pat(var("x"), var("p"), var("y")),
            ],
            head(var("y"), var("p"), var("x")),
            meta(
                Profile::Owl2Rl,
                Applicability::SymmetricProperties,
                "symmetric property inversion",
            ),
        ),
        Rule::new(
            "prp_inv1",
            vec![
                pat(var("p1"), iri(Vocabulary::OWL_INVERSE_OF), var("p2")),
                pat(var("x"), var("p1"), var("y")),
            ],
            head(var("y"), var("p2"), var("x")),
            meta(Profile::Owl2Rl, Applicability::InversePairs, "inverse property, forward"),
        ),
        Rule::new(
            "prp_inv2",
            vec![
                pat(var("p1"), iri(Vocabulary::OWL_INVERSE_OF), var("p2")),
                pat(var("x"), var("p2"), var("y")),
            ],
            head(var("y"), var("p1"), var("x")),
            meta(Profile::Owl2Rl, Applicability::InversePairs, "inverse property, backward"),
        ),
        Rule::new(
            "prp_fp",
            vec![
                pat(var("p"), typ(), iri(Vocabulary::OWL_FUNCTIONAL_PROPERTY)),
                pat(var("x"), var("p"), var("y1")),
                pat(var("x"), var("p"), var("y2")),
                ne("y1", "y2"),
            ],
            head(var("y1"), same(), var("y2")),
            meta(
                Profile::Owl2Rl,
                Applicability::FunctionalProperties,
                "functional property values coincide",
            ),
        ),
        Rule::new(
            "prp_ifp",
            vec![
                pat(var("p"), typ(), iri(Vocabulary::OWL_INVERSE_FUNCTIONAL_PROPERTY)),
                pat(var("x1"), var("p"), var("y")),
                pat(var("x2"), var("p"), var("y")),
                ne("x1", "x2"),
            ],
            head(var("x1"), same(), var("x2")),
            meta(
                Profile::Owl2Rl,
                Applicability::InverseFunctionalProperties,
                "inverse-functional subjects coincide",
            ),
        ),
        // Equality
        Rule::new(
            "eq_ref",
            vec![pat(var("s"), var("p"), var("o"))],
            head(var("s"), same(), var("s")),
            meta(Profile::Owl2Rl, Applicability::Always, "sameAs is reflexive"),
        ),
        Rule::new(
            "eq_sym",
            vec![pat(var("x"), same(), var("y"))],
            head(var("y"), same(), var("x")),
            meta(Profile::Owl2Rl, Applicability::SameAs, "sameAs is symmetric"),
        ),
        Rule::new(
            "eq_trans",
            vec![
                pat(var("x"), same(), var("y")),
                pat(var("y"), same(), var("z")),
            ],
            head(var("x"), same(), var("z")),
            meta(Profile::Owl2Rl, Applicability::SameAs, "sameAs is transitive"),
        ),
        Rule::new(
            "eq_rep_s",
            vec![
                pat(var("s"), same(), var("s2")),
                pat(var("s"), var("p"), var("o")),
            ],
            head(var("s2"), var("p"), var("o")),
            meta(Profile::Owl2Rl, Applicability::SameAs, "replace equal subjects"),
        ),
        Rule::new(
            "eq_rep_p",
            vec![
                pat(var("p"), same(), var("p2")),
                pat(var("s"), var("p"), var("o")),
            ],
            head(var("s"), var("p2"), var("o")),
            meta(Profile::Owl2Rl, Applicability::SameAs, "replace equal predicates"),
        ),
        Rule::new(
            "eq_rep_o",
            vec![
                pat(var("o"), same(), var("o2")),
                pat(var("s"), var("p"), var("o")),
            ],
            head(var("s"), var("p"), var("o2")),
            meta(Profile::Owl2Rl, Applicability::SameAs, "replace equal objects"),
        ),
        // Class restrictions
        Rule::new(
            "cls_hv1",
            vec![
                pat(var("x"), iri(Vocabulary::OWL_HAS_VALUE), var("v")),
                pat(var("x"), iri(Vocabulary::OWL_ON_PROPERTY), var("p")),
                pat(var("u"), typ(), var("x")),
            ],
            head(var("u"), var("p"), var("v")),
            meta(
                Profile::Owl2Rl,
                Applicability::Restrictions,
                "hasValue members carry the value",
            ),
        ),
        Rule::new(
            "cls_hv2",
            vec![
                pat(var("x"), iri(Vocabulary::OWL_HAS_VALUE), var("v")),
                pat(var("x"), iri(Vocabulary::OWL_ON_PROPERTY), var("p")),
                pat(var("u"), var("p"), var("v")),
            ],
            head(var("u"), typ(), var("x")),
            meta(
                Profile::Owl2Rl,
                Applicability::Restrictions,
                "value carriers join the hasValue class",
            ),
        ),
        Rule::new(
            "cls_svf1",
            vec![
                pat(var("x"), iri(Vocabulary::OWL_SOME_VALUES_FROM), var("y")),
                pat(var("x"), iri(Vocabulary::OWL_ON_PROPERTY), var("p")),
                pat(var("u"), var("p"), var("v")),
                pat(var("v"), typ(), var("y")),
            ],
            head(var("u"), typ(), var("x")),
            meta(
                Profile::Owl2Rl,
                Applicability::Restrictions,
                "someValuesFrom witnesses type the subject",
            ),
        ),
        Rule::new(
            "cls_svf2",
            vec![
                pat(var("x"), iri(Vocabulary::OWL_SOME_VALUES_FROM), iri(Vocabulary::OWL_THING)),
                pat(var("x"), iri(Vocabulary::OWL_ON_PROPERTY), var("p")),
                pat(var("u"), var("p"), var("v")),
            ],
            head(var("u"), typ(), var("x")),
            meta(
                Profile::Owl2Rl,
                Applicability::Restrictions,
                "someValuesFrom owl:Thing needs any value",
            ),
        ),
        Rule::new(
            "cls_avf",
            vec![
                pat(var("x"), iri(Vocabulary::OWL_ALL_VALUES_FROM), var("y")),
                pat(var("x"), iri(Vocabulary::OWL_ON_PROPERTY), var("p")),
                pat(var("u"), typ(), var("x")),
                pat(var("u"), var("p"), var("v")),
            ],
            head(var("v"), typ(), var("y")),
            meta(
                Profile::Owl2Rl,
                Applicability::Restrictions,
                "allValuesFrom types every value",
            ),
        ),
    ]
}

/// The full catalogue, built once
pub fn catalog() -> &'static [Rule] {
    static CATALOG: OnceLock<Vec<Rule>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

/// Whether a rule name exists in the catalogue
pub fn contains_rule(name: &str) -> bool {
    RULE_NAMES.contains(&name)
}

/// Look up a rule by its stable name
pub fn rule_by_name(name: &str) -> ReasonerResult<&'static Rule> {
    catalog()
        .iter()
        .find(|r| r.name() == name)
        .ok_or_else(|| ReasonerError::UnknownRules(vec![name.to_string()]))
}

/// Category of a catalogue rule
pub fn category_of(name: &str) -> ReasonerResult<RuleCategory> {
    let category = match name {
        "scm_sco" | "scm_spo" | "cax_sco" | "prp_spo1" | "prp_dom" | "prp_rng" => {
            RuleCategory::Rdfs
        }
        "prp_trp" | "prp_symp" | "prp_inv1" | "prp_inv2" | "prp_fp" | "prp_ifp" => {
            RuleCategory::PropertyCharacteristics
        }
        "eq_ref" | "eq_sym" | "eq_trans" | "eq_rep_s" | "eq_rep_p" | "eq_rep_o" => {
            RuleCategory::Equality
        }
        "cls_hv1" | "cls_hv2" | "cls_svf1" | "cls_svf2" | "cls_avf" => {
            RuleCategory::ClassRestrictions
        }
        other => return Err(ReasonerError::UnknownRules(vec![other.to_string()])),
    };
    Ok(category)
}

/// Rules in a category, in catalogue order
pub fn rules_in_category(category: RuleCategory) -> Vec<&'static Rule> {
    catalog()
        .iter()
        .filter(|r| category_of(r.name()) == Ok(category))
        .collect()
}

/// Rules belonging to a profile, in catalogue order
///
/// The OWL 2 RL profile includes the RDFS rules.
pub fn rules_for_profile(profile: Profile) -> Vec<&'static Rule> {
    match profile {
        Profile::Rdfs => catalog()
            .iter()
            .filter(|r| r.meta().profile == Profile::Rdfs)
            .collect(),
        Profile::Owl2Rl => catalog().iter().collect(),
        Profile::Custom | Profile::None => Vec::new(),
    }
}
