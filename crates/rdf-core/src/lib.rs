//! RDF term model for the reasoning engine
//!
//! This crate provides the core RDF data model shared by the store and the
//! reasoner:
//! - Owned term representation (IRI, blank node, literal, variable)
//! - Ground triples and triple patterns
//! - Standard W3C vocabularies (RDF, RDFS, OWL, XSD)
//! - Injection-safe IRI validation
//!
//! Facts are always ground; variables appear only in patterns. Equality is
//! structural on tag + fields throughout.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod iri;
mod term;
mod triple;
mod vocab;

pub use iri::{local_name, validate_iri};
pub use term::{Literal, Term};
pub use triple::{Triple, TriplePattern};
pub use vocab::Vocabulary;

/// Errors that can occur when working with RDF data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RdfError {
    /// IRI contains characters from the injection-prone class
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Malformed literal (empty language tag, invalid datatype IRI)
    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),
}

/// Result type for RDF operations
pub type Result<T> = std::result::Result<T, RdfError>;
