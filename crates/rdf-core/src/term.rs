//! RDF term types
//!
//! Owned representation of the RDF term space. The reasoner stores closures
//! as hash sets of ground triples, so terms own their strings rather than
//! borrowing from an interning arena.

use std::fmt;

/// RDF term - the core tagged value of the data model
///
/// Variables appear only in patterns, never in facts. Structural equality
/// on tag + fields; `Ord` gives a stable order for deterministic output.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// IRI reference
    /// Example: <http://example.org/resource>
    Iri(String),

    /// Blank node with local identifier
    /// Example: _:b0
    BlankNode(String),

    /// Literal value (plain, typed, or language-tagged)
    /// Example: "John"@en or "42"^^xsd:integer
    Literal(Literal),

    /// Variable (for patterns)
    /// Example: ?x
    Variable(String),
}

impl Term {
    /// Create an IRI term
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// Create a blank node term
    pub fn blank(id: impl Into<String>) -> Self {
        Term::BlankNode(id.into())
    }

    /// Create a simple string literal
    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(Literal::Simple(value.into()))
    }

    /// Create a typed literal
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal(Literal::Typed {
            value: value.into(),
            datatype: datatype.into(),
        })
    }

    /// Create a language-tagged literal
    pub fn lang_literal(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Term::Literal(Literal::Lang {
            value: value.into(),
            lang: lang.into(),
        })
    }

    /// Create a variable term
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    /// Check if this is an IRI
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    /// Check if this is a blank node
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    /// Check if this is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    /// Check if this is a variable
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Check if this term is ground (no variable)
    pub fn is_ground(&self) -> bool {
        !self.is_variable()
    }

    /// Get the IRI string, if this is an IRI
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Get the variable name, if this is a variable
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// Get the literal, if this is one
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "Iri({iri})"),
            Term::BlankNode(id) => write!(f, "BlankNode({id})"),
            Term::Literal(lit) => write!(f, "Literal({lit})"),
            Term::Variable(name) => write!(f, "Variable({name})"),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::BlankNode(id) => write!(f, "_:{id}"),
            Term::Literal(lit) => write!(f, "{lit}"),
            Term::Variable(name) => write!(f, "?{name}"),
        }
    }
}

/// RDF literal in one of its three shapes
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Literal {
    /// Plain literal without language or datatype
    Simple(String),

    /// Literal with a datatype IRI
    Typed {
        /// Lexical form
        value: String,
        /// Datatype IRI
        datatype: String,
    },

    /// Literal with a language tag
    Lang {
        /// Lexical form
        value: String,
        /// BCP 47 language tag (e.g. "en")
        lang: String,
    },
}

impl Literal {
    /// Lexical form of the literal
    pub fn value(&self) -> &str {
        match self {
            Literal::Simple(v) => v,
            Literal::Typed { value, .. } => value,
            Literal::Lang { value, .. } => value,
        }
    }

    /// Check if this is a plain literal
    pub fn is_plain(&self) -> bool {
        matches!(self, Literal::Simple(_))
    }

    /// Datatype IRI, if any
    pub fn datatype(&self) -> Option<&str> {
        match self {
            Literal::Typed { datatype, .. } => Some(datatype),
            _ => None,
        }
    }

    /// Language tag, if any
    pub fn language(&self) -> Option<&str> {
        match self {
            Literal::Lang { lang, .. } => Some(lang),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Simple(v) => write!(f, "\"{v}\""),
            Literal::Typed { value, datatype } => write!(f, "\"{value}\"^^<{datatype}>"),
            Literal::Lang { value, lang } => write!(f, "\"{value}\"@{lang}"),
        }
    }
}
