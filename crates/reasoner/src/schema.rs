//! Schema-info extraction
//!
//! One scan over the fact set derives the TBox features that drive rule
//! filtering and specialization. Property lists are bounded and every IRI
//! entering a list passes the injection-safe validator; a bad IRI aborts
//! extraction.

use crate::telemetry::{self, events};
use crate::{FactSet, ReasonerResult};
use rdf_core::{validate_iri, Triple, Vocabulary};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Cap on each schema property list
pub const MAX_SCHEMA_PROPERTIES: usize = 10_000;

/// TBox features derived from the data
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaInfo {
    /// Any `rdfs:subClassOf` triples present
    pub has_subclass: bool,
    /// Any `rdfs:subPropertyOf` triples present
    pub has_subproperty: bool,
    /// Any `rdfs:domain` triples present
    pub has_domain: bool,
    /// Any `rdfs:range` triples present
    pub has_range: bool,
    /// Any `owl:sameAs` triples present, or rules that derive them active
    pub has_sameas: bool,
    /// Any property-restriction vocabulary present
    pub has_restrictions: bool,
    /// Properties typed `owl:TransitiveProperty`
    pub transitive_properties: Vec<String>,
    /// Properties typed `owl:SymmetricProperty`
    pub symmetric_properties: Vec<String>,
    /// Properties typed `owl:FunctionalProperty`
    pub functional_properties: Vec<String>,
    /// Properties typed `owl:InverseFunctionalProperty`
    pub inverse_functional_properties: Vec<String>,
    /// `owl:inverseOf` pairs
    pub inverse_pairs: Vec<(String, String)>,
    /// Opaque content stamp; changes whenever the features change
    pub version: u64,
}

impl SchemaInfo {
    /// Recompute the content stamp from the feature fields
    fn stamp(&mut self) {
        let mut hasher = DefaultHasher::new();
        self.has_subclass.hash(&mut hasher);
        self.has_subproperty.hash(&mut hasher);
        self.has_domain.hash(&mut hasher);
        self.has_range.hash(&mut hasher);
        self.has_sameas.hash(&mut hasher);
        self.has_restrictions.hash(&mut hasher);
        self.transitive_properties.hash(&mut hasher);
        self.symmetric_properties.hash(&mut hasher);
        self.functional_properties.hash(&mut hasher);
        self.inverse_functional_properties.hash(&mut hasher);
        self.inverse_pairs.hash(&mut hasher);
        self.version = hasher.finish();
    }
}

/// When a rule's body could match non-trivially, as a predicate over
/// [`SchemaInfo`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applicability {
    /// Applicable regardless of schema
    Always,
    /// Needs `rdfs:subClassOf` axioms
    SubClass,
    /// Needs `rdfs:subPropertyOf` axioms
    SubProperty,
    /// Needs `rdfs:domain` axioms
    Domain,
    /// Needs `rdfs:range` axioms
    Range,
    /// Needs `owl:sameAs` facts (asserted or derivable)
    SameAs,
    /// Needs restriction vocabulary
    Restrictions,
    /// Needs at least one transitive property
    TransitiveProperties,
    /// Needs at least one symmetric property
    SymmetricProperties,
    /// Needs at least one functional property
    FunctionalProperties,
    /// Needs at least one inverse-functional property
    InverseFunctionalProperties,
    /// Needs at least one `owl:inverseOf` pair
    InversePairs,
}

impl Applicability {
    /// Evaluate against the schema features
    pub fn applies(&self, schema: &SchemaInfo) -> bool {
        match self {
            Applicability::Always => true,
            Applicability::SubClass => schema.has_subclass,
            Applicability::SubProperty => schema.has_subproperty,
            Applicability::Domain => schema.has_domain,
            Applicability::Range => schema.has_range,
            Applicability::SameAs => schema.has_sameas,
            Applicability::Restrictions => schema.has_restrictions,
            Applicability::TransitiveProperties => !schema.transitive_properties.is_empty(),
            Applicability::SymmetricProperties => !schema.symmetric_properties.is_empty(),
            Applicability::FunctionalProperties => !schema.functional_properties.is_empty(),
            Applicability::InverseFunctionalProperties => {
                !schema.inverse_functional_properties.is_empty()
            }
            Applicability::InversePairs => !schema.inverse_pairs.is_empty(),
        }
    }
}

/// Derive [`SchemaInfo`] from the current fact set in a single scan
pub fn extract_schema(facts: &FactSet) -> ReasonerResult<SchemaInfo> {
    let schema = telemetry::span(
        events::EXTRACT_SCHEMA_START,
        events::EXTRACT_SCHEMA_STOP,
        &[("facts", facts.len().to_string())],
        || scan(facts),
    )?;

    telemetry::emit(
        events::EXTRACT_SCHEMA_COMPLETE,
        &[("version", schema.version.to_string())],
    );

    Ok(schema)
}

fn scan(facts: &FactSet) -> ReasonerResult<SchemaInfo> {
    let mut schema = SchemaInfo::default();

    for triple in facts {
        let Some(predicate) = triple.predicate.as_iri() else {
            continue;
        };

        match predicate {
            Vocabulary::RDFS_SUBCLASSOF => schema.has_subclass = true,
            Vocabulary::RDFS_SUBPROPERTYOF => schema.has_subproperty = true,
            Vocabulary::RDFS_DOMAIN => schema.has_domain = true,
            Vocabulary::RDFS_RANGE => schema.has_range = true,
            Vocabulary::OWL_SAME_AS => schema.has_sameas = true,
            Vocabulary::OWL_INVERSE_OF => {
                if let (Some(p1), Some(p2)) = (triple.subject.as_iri(), triple.object.as_iri()) {
                    validate_iri(p1)?;
                    validate_iri(p2)?;
                    push_pair(&mut schema.inverse_pairs, (p1.to_string(), p2.to_string()));
                }
            }
            Vocabulary::OWL_ON_PROPERTY
            | Vocabulary::OWL_HAS_VALUE
            | Vocabulary::OWL_SOME_VALUES_FROM
            | Vocabulary::OWL_ALL_VALUES_FROM => schema.has_restrictions = true,
            Vocabulary::RDF_TYPE => {
                let Some(class) = triple.object.as_iri() else {
                    continue;
                };
                let list = match class {
                    Vocabulary::OWL_TRANSITIVE_PROPERTY => &mut schema.transitive_properties,
                    Vocabulary::OWL_SYMMETRIC_PROPERTY => &mut schema.symmetric_properties,
                    Vocabulary::OWL_FUNCTIONAL_PROPERTY => &mut schema.functional_properties,
                    Vocabulary::OWL_INVERSE_FUNCTIONAL_PROPERTY => {
                        &mut schema.inverse_functional_properties
                    }
                    Vocabulary::OWL_RESTRICTION => {
                        schema.has_restrictions = true;
                        continue;
                    }
                    _ => continue,
                };
                if let Some(property) = triple.subject.as_iri() {
                    validate_iri(property)?;
                    push_capped(list, property.to_string());
                }
            }
            _ => {}
        }
    }

    // Functional rules derive owl:sameAs, so the equality rules must be
    // active whenever they are.
    if !schema.functional_properties.is_empty()
        || !schema.inverse_functional_properties.is_empty()
    {
        schema.has_sameas = true;
    }

    // Sorted lists give a content stamp independent of scan order.
    schema.transitive_properties.sort_unstable();
    schema.transitive_properties.dedup();
    schema.symmetric_properties.sort_unstable();
    schema.symmetric_properties.dedup();
    schema.functional_properties.sort_unstable();
    schema.functional_properties.dedup();
    schema.inverse_functional_properties.sort_unstable();
    schema.inverse_functional_properties.dedup();
    schema.inverse_pairs.sort_unstable();
    schema.inverse_pairs.dedup();

    schema.stamp();
    Ok(schema)
}

fn push_capped(list: &mut Vec<String>, value: String) {
    if list.len() < MAX_SCHEMA_PROPERTIES {
        list.push(value);
    }
}

fn push_pair(list: &mut Vec<(String, String)>, value: (String, String)) {
    if list.len() < MAX_SCHEMA_PROPERTIES {
        list.push(value);
    }
}

/// Convenience scan over a slice of triples
pub fn extract_schema_from(triples: &[Triple]) -> ReasonerResult<SchemaInfo> {
    let facts: FactSet = triples.iter().cloned().collect();
    extract_schema(&facts)
}
